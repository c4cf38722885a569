#![forbid(unsafe_code)]

pub mod auth;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod permits;
pub mod registry;
pub mod reservation;
pub mod schema;
pub mod usage;
pub mod viewpoint;

pub use endpoints::UpstreamEndpoints;
pub use error::ParkingError;
pub use http::{
    HttpMethod, HttpReply, HttpTransport, RequestClient, TransportError, UpstreamError,
    UpstreamSettings, UreqTransport,
};
pub use schema::{SchemaMismatch, Shape};
pub use viewpoint::OperationScope;

/// Upstream permit service bound to one transport.
///
/// Every method is a single stage of an operation; callers chain them
/// (token first, then the substantive call) and nothing is cached between
/// calls.
#[derive(Debug)]
pub struct PermitApi<T> {
    client: RequestClient<T>,
    endpoints: UpstreamEndpoints,
}

impl<T: HttpTransport> PermitApi<T> {
    pub fn new(transport: T, endpoints: UpstreamEndpoints) -> Self {
        Self {
            client: RequestClient::new(transport),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &UpstreamEndpoints {
        &self.endpoints
    }

    pub fn transport(&self) -> &T {
        self.client.transport()
    }

    pub(crate) fn client(&self) -> &RequestClient<T> {
        &self.client
    }
}

#[cfg(test)]
pub(crate) mod test_support;
