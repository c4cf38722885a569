#![forbid(unsafe_code)]

//! JSON-over-HTTP surface for the parking operations.
//!
//! Operations are blocking; every handler moves its call onto tokio's
//! blocking pool. Failures never expose their cause to the client.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use guestpark_contracts::permit::{Reservation, ReservationRequest};
use guestpark_contracts::registry::{VehicleRegistration, VehicleRegistry};
use guestpark_engines::HttpTransport;
use guestpark_os::{CancelOutcome, OperationFailure, ParkingService};
use guestpark_storage::VehicleRegistryStore;
use serde::{Deserialize, Serialize};
use tracing::error;

pub const HTTP_BIND_ENV: &str = "GUESTPARK_HTTP_BIND";
pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3000";

const INVALID_REQUEST: &str = "Invalid request";
const INTERNAL_ERROR: &str = "Internal server error";

pub type SharedService<T, S> = Arc<ParkingService<T, S>>;

pub fn bind_addr_from_env() -> Result<SocketAddr, std::net::AddrParseError> {
    env::var(HTTP_BIND_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
        .parse()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationsResponse {
    pub reservations: Vec<Reservation>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclesResponse {
    pub vehicles: VehicleRegistry,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOutcomeBody {
    pub id: String,
    pub cancelled: bool,
}

impl From<&CancelOutcome> for CancelOutcomeBody {
    fn from(outcome: &CancelOutcome) -> Self {
        Self {
            id: outcome.id.clone(),
            cancelled: outcome.is_cancelled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAllResponse {
    pub outcomes: Vec<CancelOutcomeBody>,
    pub count: usize,
    pub cancelled: usize,
}

/// Vehicle form as the web client posts it: `vehicle` is the plate, `notes`
/// the make and model, `name` the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddVehicleRequest {
    pub vehicle: String,
    #[serde(default)]
    pub notes: String,
    pub name: String,
}

impl From<AddVehicleRequest> for VehicleRegistration {
    fn from(request: AddVehicleRequest) -> Self {
        Self {
            plate: request.vehicle,
            make_model: request.notes,
            owner: request.name,
        }
    }
}

pub fn router<T, S>(service: SharedService<T, S>) -> Router
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/reservations", get(list_reservations::<T, S>))
        .route(
            "/api/reservation",
            post(create_reservation::<T, S>).delete(cancel_reservation::<T, S>),
        )
        .route("/api/reservations/cancel-all", post(cancel_all::<T, S>))
        .route("/api/usage", get(usage::<T, S>))
        .route(
            "/api/vehicles",
            get(list_vehicles::<T, S>).post(add_vehicle::<T, S>),
        )
        .with_state(service)
}

pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn list_reservations<T, S>(State(service): State<SharedService<T, S>>) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    let result = run_blocking("list_active_reservations", move || {
        service.list_active_reservations()
    })
    .await;
    match result {
        Ok(reservations) => Json(ReservationsResponse {
            count: reservations.len(),
            reservations,
        })
        .into_response(),
        Err(failure) => failure_response(failure),
    }
}

pub async fn create_reservation<T, S>(
    State(service): State<SharedService<T, S>>,
    Json(request): Json<ReservationRequest>,
) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    let result = run_blocking("create_reservation", move || {
        service.create_reservation(&request)
    })
    .await;
    match result {
        Ok(()) => message_response(StatusCode::CREATED, "Reservation created successfully"),
        Err(failure) => failure_response(failure),
    }
}

pub async fn cancel_reservation<T, S>(
    State(service): State<SharedService<T, S>>,
    Json(request): Json<CancelRequest>,
) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    let result = run_blocking("cancel_reservation", move || {
        service.cancel_reservation(&request.id)
    })
    .await;
    match result {
        Ok(()) => message_response(StatusCode::OK, "Reservation cancelled successfully"),
        Err(failure) => failure_response(failure),
    }
}

pub async fn cancel_all<T, S>(State(service): State<SharedService<T, S>>) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    let result = run_blocking("cancel_all_reservations", move || {
        service.cancel_all_reservations()
    })
    .await;
    match result {
        Ok(outcomes) => {
            let outcomes: Vec<CancelOutcomeBody> =
                outcomes.iter().map(CancelOutcomeBody::from).collect();
            Json(CancelAllResponse {
                count: outcomes.len(),
                cancelled: outcomes.iter().filter(|o| o.cancelled).count(),
                outcomes,
            })
            .into_response()
        }
        Err(failure) => failure_response(failure),
    }
}

pub async fn usage<T, S>(State(service): State<SharedService<T, S>>) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    match run_blocking("compute_usage", move || service.compute_usage()).await {
        Ok(summary) => Json(summary).into_response(),
        Err(failure) => failure_response(failure),
    }
}

pub async fn list_vehicles<T, S>(State(service): State<SharedService<T, S>>) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    match run_blocking("list_vehicles", move || service.list_vehicles()).await {
        Ok(vehicles) => Json(VehiclesResponse {
            count: vehicles.len(),
            vehicles,
        })
        .into_response(),
        Err(failure) => failure_response(failure),
    }
}

pub async fn add_vehicle<T, S>(
    State(service): State<SharedService<T, S>>,
    Json(request): Json<AddVehicleRequest>,
) -> Response
where
    T: HttpTransport + 'static,
    S: VehicleRegistryStore + 'static,
{
    let registration = VehicleRegistration::from(request);
    let result = run_blocking("register_vehicle", move || {
        service.register_vehicle(&registration)
    })
    .await;
    match result {
        Ok(registered) => (StatusCode::CREATED, Json(registered)).into_response(),
        Err(failure) => failure_response(failure),
    }
}

async fn run_blocking<R, F>(operation: &'static str, work: F) -> Result<R, OperationFailure>
where
    R: Send + 'static,
    F: FnOnce() -> Result<R, OperationFailure> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(err) => {
            error!(operation, error = %err, "blocking task did not complete");
            Err(OperationFailure {
                operation,
                rejected_input: false,
            })
        }
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageBody {
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub fn failure_response(failure: OperationFailure) -> Response {
    let (status, error) = if failure.rejected_input {
        (StatusCode::BAD_REQUEST, INVALID_REQUEST)
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    };
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}
