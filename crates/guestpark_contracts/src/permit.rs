#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::validate_non_empty;
use crate::{ContractViolation, ItemsEnvelope, Validate};

/// The single permit category this system manages.
pub const GUEST_PARKING_TITLE: &str = "Guest Parking";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitInstant {
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub min: PermitInstant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<PermitInstant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitRecord {
    pub id: String,
    pub title: String,
    /// Upstream vehicle id; key into `vehicles.items`.
    pub vehicle: String,
    /// Owner name as entered when the permit was issued.
    pub name: String,
    pub valid: ValidityWindow,
    pub grace: ValidityWindow,
}

impl PermitRecord {
    pub fn is_guest_parking(&self) -> bool {
        self.title == GUEST_PARKING_TITLE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamVehicle {
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitsResponse {
    pub permits: ItemsEnvelope<PermitRecord>,
    pub vehicles: ItemsEnvelope<UpstreamVehicle>,
}

/// Consumer view of an active guest permit.
///
/// Serialized with the keys the presentation layer already reads
/// (`display`, `name`, `displayName`, `valid`, `grace`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub vehicle: String,
    #[serde(rename = "display", default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(rename = "name")]
    pub owner_name: String,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(rename = "valid")]
    pub valid_window: ValidityWindow,
    #[serde(rename = "grace")]
    pub grace_window: ValidityWindow,
}

impl Reservation {
    /// Joins a permit with its upstream vehicle. The vehicle only contributes
    /// the plate; every other field comes from the permit. A missing vehicle
    /// leaves `plate` unset.
    pub fn from_permit(permit: PermitRecord, vehicle: Option<&UpstreamVehicle>) -> Self {
        Self {
            id: permit.id,
            vehicle: permit.vehicle,
            plate: vehicle.map(|v| v.display.clone()),
            owner_name: permit.name,
            display_name: None,
            valid_window: permit.valid,
            grace_window: permit.grace,
        }
    }
}

/// Caller input for a new temporary permit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Plate to reserve for.
    pub vehicle: String,
    #[serde(default)]
    pub notes: String,
    pub name: String,
}

impl ReservationRequest {
    pub fn v1(
        vehicle: impl Into<String>,
        notes: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ContractViolation> {
        let req = Self {
            vehicle: vehicle.into(),
            notes: notes.into(),
            name: name.into(),
        };
        req.validate()?;
        Ok(req)
    }
}

impl Validate for ReservationRequest {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_non_empty("reservation_request.vehicle", &self.vehicle)?;
        validate_non_empty("reservation_request.name", &self.name)?;
        Ok(())
    }
}
