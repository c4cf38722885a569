#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use guestpark_contracts::permit::{Reservation, ReservationRequest};
use guestpark_contracts::registry::VehicleRegistration;
use guestpark_engines::HttpTransport;
use guestpark_os::{CancelOutcome, OperationFailure, ParkingService};
use guestpark_storage::VehicleRegistryStore;
use serde_json::json;

/// Guest parking reservations from the command line.
#[derive(Parser, Debug)]
#[command(name = "guestpark", version, about, long_about = None)]
pub struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: ParkingCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ParkingCommand {
    /// List active guest reservations
    Reservations,
    /// Show weekly and monthly usage against limits
    Usage,
    /// Reserve guest parking for a plate
    Reserve {
        vehicle: String,
        name: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Cancel one reservation by permit id
    Cancel { id: String },
    /// Cancel every active guest reservation
    CancelAll,
    /// List locally registered vehicles
    Vehicles,
    /// Register a vehicle locally
    AddVehicle {
        plate: String,
        make_model: String,
        owner: String,
    },
}

pub fn execute_parking_command<T, S>(
    service: &ParkingService<T, S>,
    command: &ParkingCommand,
    json: bool,
) -> Result<String, String>
where
    T: HttpTransport,
    S: VehicleRegistryStore,
{
    match command {
        ParkingCommand::Reservations => {
            let reservations = service.list_active_reservations().map_err(describe)?;
            if json {
                return to_json(&json!({
                    "reservations": reservations,
                    "count": reservations.len(),
                }));
            }
            if reservations.is_empty() {
                return Ok("no active reservations".to_string());
            }
            Ok(reservations
                .iter()
                .map(reservation_line)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ParkingCommand::Usage => {
            let summary = service.compute_usage().map_err(describe)?;
            if json {
                return to_json(&summary);
            }
            Ok(format!(
                "weekly  {} of {}\nmonthly {} of {}",
                summary.weekly_usage,
                summary.weekly_limit,
                summary.monthly_usage,
                summary.monthly_limit
            ))
        }
        ParkingCommand::Reserve {
            vehicle,
            name,
            notes,
        } => {
            let request = ReservationRequest {
                vehicle: vehicle.trim().to_string(),
                notes: notes.clone(),
                name: name.trim().to_string(),
            };
            service.create_reservation(&request).map_err(describe)?;
            Ok("OK".to_string())
        }
        ParkingCommand::Cancel { id } => {
            service.cancel_reservation(id.trim()).map_err(describe)?;
            Ok("OK".to_string())
        }
        ParkingCommand::CancelAll => {
            let outcomes = service.cancel_all_reservations().map_err(describe)?;
            if json {
                let rows: Vec<_> = outcomes
                    .iter()
                    .map(|o| json!({ "id": o.id, "cancelled": o.is_cancelled() }))
                    .collect();
                return to_json(&json!({ "outcomes": rows, "count": rows.len() }));
            }
            if outcomes.is_empty() {
                return Ok("no active reservations".to_string());
            }
            Ok(outcomes
                .iter()
                .map(outcome_line)
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ParkingCommand::Vehicles => {
            let vehicles = service.list_vehicles().map_err(describe)?;
            if json {
                return to_json(&json!({ "vehicles": vehicles, "count": vehicles.len() }));
            }
            if vehicles.is_empty() {
                return Ok("no registered vehicles".to_string());
            }
            Ok(vehicles
                .iter()
                .map(|(key, v)| format!("{key}\t{}\t{}", v.vehicle, v.display_value))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        ParkingCommand::AddVehicle {
            plate,
            make_model,
            owner,
        } => {
            let registration = VehicleRegistration {
                plate: plate.clone(),
                make_model: make_model.clone(),
                owner: owner.clone(),
            };
            let registered = service.register_vehicle(&registration).map_err(describe)?;
            if json {
                return to_json(&registered);
            }
            Ok(registered.key)
        }
    }
}

fn reservation_line(r: &Reservation) -> String {
    let label = r.display_name.as_deref().unwrap_or(&r.owner_name);
    let until = r
        .valid_window
        .max
        .as_ref()
        .map(|m| m.local.as_str())
        .unwrap_or("open");
    format!(
        "{}\t{}\t{}\t{} -> {}",
        r.id,
        r.plate.as_deref().unwrap_or("-"),
        label,
        r.valid_window.min.local,
        until
    )
}

fn outcome_line(outcome: &CancelOutcome) -> String {
    let state = if outcome.is_cancelled() {
        "cancelled"
    } else {
        "failed"
    };
    format!("{}\t{state}", outcome.id)
}

fn describe(failure: OperationFailure) -> String {
    if failure.rejected_input {
        format!("{failure}: invalid input")
    } else {
        format!("{failure}; see logs for details")
    }
}

fn to_json<V: serde::Serialize + ?Sized>(value: &V) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to render json: {e}"))
}
