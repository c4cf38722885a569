#![forbid(unsafe_code)]

use guestpark_contracts::permit::{PermitsResponse, Reservation, UpstreamVehicle};
use guestpark_contracts::registry::VehicleRegistry;
use guestpark_contracts::session::BearerSession;
use guestpark_contracts::{ItemsEnvelope, ParkingConfig};
use tracing::debug;

use crate::error::ParkingError;
use crate::http::HttpTransport;
use crate::registry::enrich_all;
use crate::schema::{optional, required, Shape};
use crate::viewpoint::OperationScope;
use crate::PermitApi;

fn instant_shape() -> Shape {
    Shape::object([required("local", Shape::String)])
}

fn window_shape() -> Shape {
    Shape::object([
        required("min", instant_shape()),
        optional("max", instant_shape()),
    ])
}

pub fn permits_response_shape() -> Shape {
    Shape::object([
        required(
            "permits",
            Shape::items(Shape::object([
                required("id", Shape::String),
                required("title", Shape::String),
                required("vehicle", Shape::String),
                required("name", Shape::String),
                required("valid", window_shape()),
                required("grace", window_shape()),
            ])),
        ),
        required(
            "vehicles",
            Shape::items(Shape::object([required("display", Shape::String)])),
        ),
    ])
}

/// Guest-parking permits in upstream order, joined with their vehicle plate.
/// Permits of any other title are dropped.
pub fn join_guest_permits(response: PermitsResponse) -> Vec<Reservation> {
    let PermitsResponse { permits, vehicles } = response;
    permits
        .items
        .into_iter()
        .map(|(_, permit)| permit)
        .filter(|permit| permit.is_guest_parking())
        .map(|permit| {
            let vehicle = lookup_vehicle(&vehicles, &permit.vehicle);
            Reservation::from_permit(permit, vehicle)
        })
        .collect()
}

fn lookup_vehicle<'a>(
    vehicles: &'a ItemsEnvelope<UpstreamVehicle>,
    id: &str,
) -> Option<&'a UpstreamVehicle> {
    vehicles.items.get(id)
}

impl<T: HttpTransport> PermitApi<T> {
    pub fn fetch_permits(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        session: &BearerSession,
    ) -> Result<PermitsResponse, ParkingError> {
        let url = self.endpoints().tenant_permits(config, scope, session);
        let response = self
            .client()
            .get(&url, Some(&permits_response_shape()))?;
        Ok(response)
    }

    /// Token, permits, filter, join, enrich. The registry is read-only here.
    pub fn list_active_reservations(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        registry: &VehicleRegistry,
    ) -> Result<Vec<Reservation>, ParkingError> {
        let session = self.acquire_token(config, scope)?;
        let response = self.fetch_permits(config, scope, &session)?;
        let total = response.permits.items.len();
        let mut reservations = join_guest_permits(response);
        enrich_all(&mut reservations, registry);
        debug!(
            permits = total,
            guest = reservations.len(),
            "active reservations listed"
        );
        Ok(reservations)
    }
}
