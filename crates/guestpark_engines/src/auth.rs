#![forbid(unsafe_code)]

use guestpark_contracts::session::BearerSession;
use guestpark_contracts::ParkingConfig;
use tracing::debug;

use crate::error::ParkingError;
use crate::http::HttpTransport;
use crate::schema::{required, Shape};
use crate::viewpoint::OperationScope;
use crate::PermitApi;

pub fn token_response_shape() -> Shape {
    Shape::object([
        required("subject", Shape::String),
        required("token", Shape::String),
    ])
}

impl<T: HttpTransport> PermitApi<T> {
    /// Exchanges the tenant's shared secret for a bearer session. Any failure
    /// of the exchange, including a malformed reply, is reported as `Auth`.
    pub fn acquire_token(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
    ) -> Result<BearerSession, ParkingError> {
        let url = self.endpoints().auth_tokens(config, scope);
        let session: BearerSession = self
            .client()
            .post(&url, Some(&token_response_shape()))
            .map_err(ParkingError::Auth)?;
        debug!(subject = %session.subject, "bearer session acquired");
        Ok(session)
    }
}
