#![forbid(unsafe_code)]

use guestpark_contracts::common::validate_non_empty;
use guestpark_contracts::permit::ReservationRequest;
use guestpark_contracts::{ParkingConfig, Validate};
use serde_json::Value;
use tracing::debug;

use crate::error::ParkingError;
use crate::http::HttpTransport;
use crate::schema::Shape;
use crate::viewpoint::OperationScope;
use crate::PermitApi;

impl<T: HttpTransport> PermitApi<T> {
    /// Issues a temporary guest permit. The reply only has to be a JSON
    /// object; its contents are not used.
    pub fn create_temporary_permit(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        request: &ReservationRequest,
    ) -> Result<(), ParkingError> {
        request.validate()?;
        let url = self.endpoints().temporary_permit(config, scope, request);
        let _ack: Value = self.client().post(&url, Some(&Shape::object([])))?;
        debug!("temporary permit created");
        Ok(())
    }

    /// Ends a permit now. Only the status is checked.
    pub fn expire_permit(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        permit_id: &str,
    ) -> Result<(), ParkingError> {
        validate_non_empty("permit.id", permit_id)?;
        let url = self.endpoints().permit_expiry(config, scope, permit_id);
        self.client().put(&url)?;
        debug!(permit_id, "permit expired");
        Ok(())
    }
}
