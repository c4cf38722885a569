#![forbid(unsafe_code)]

//! Reconciliation between upstream permits and the local vehicle registry.

use guestpark_contracts::permit::Reservation;
use guestpark_contracts::registry::{
    LocalVehicleRecord, RegisteredVehicle, VehicleRegistration, VehicleRegistry,
};
use guestpark_contracts::Validate;

use crate::error::ParkingError;

/// Copies the display label of the first registry vehicle whose plate equals
/// the reservation's plate. Exact, case-sensitive comparison.
///
/// Registered plates are stored uppercased while upstream plates are compared
/// as delivered; a lowercase upstream plate never matches.
pub fn enrich(reservation: &mut Reservation, registry: &VehicleRegistry) {
    let Some(plate) = reservation.plate.as_deref() else {
        return;
    };
    if let Some(found) = registry.values().find(|v| v.vehicle == plate) {
        reservation.display_name = Some(found.display_value.clone());
    }
}

pub fn enrich_all(reservations: &mut [Reservation], registry: &VehicleRegistry) {
    for reservation in reservations {
        enrich(reservation, registry);
    }
}

/// Computes the key and record for a new vehicle and inserts it into
/// `registry`. Persisting the registry is the caller's job.
pub fn register(
    registry: &mut VehicleRegistry,
    registration: &VehicleRegistration,
) -> Result<RegisteredVehicle, ParkingError> {
    registration.validate()?;

    let make_model = title_case_words(registration.make_model.trim());
    let owner = title_case_words(registration.owner.trim());
    let first_name = owner.split_whitespace().next().unwrap_or_default();
    let label = format!("{first_name}'s {make_model}");

    let key = next_free_key(registry, &registry_key_base(first_name, &make_model));
    let record = LocalVehicleRecord {
        vehicle: registration.plate.trim().to_uppercase(),
        notes: label.clone(),
        name: owner.clone(),
        display_value: label,
    };
    registry.insert(key.clone(), record.clone());
    Ok(RegisteredVehicle {
        key,
        vehicle: record,
    })
}

/// Splits on single spaces, uppercases each word's first character and
/// lowercases the rest, then rejoins with single spaces.
pub fn title_case_words(input: &str) -> String {
    input
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `john` + `Tesla Model 3` -> `john-tesla-model-3`
pub fn registry_key_base(first_name: &str, make_model: &str) -> String {
    let model_slug = make_model
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}-{}", first_name.to_lowercase(), model_slug)
}

/// `base`, else `base-1`, `base-2`, ... whichever is free first.
pub fn next_free_key(registry: &VehicleRegistry, base: &str) -> String {
    if !registry.contains_key(base) {
        return base.to_string();
    }
    (1u64..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !registry.contains_key(candidate))
        .unwrap_or_else(|| base.to_string())
}
