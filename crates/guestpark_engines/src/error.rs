#![forbid(unsafe_code)]

use guestpark_contracts::ContractViolation;
use thiserror::Error;

use crate::http::UpstreamError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkingError {
    #[error("token acquisition failed: {0}")]
    Auth(#[source] UpstreamError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// Caller input refused.
    #[error("validation failed: {0}")]
    Validation(#[from] ContractViolation),
    /// Upstream reply is well-formed but lacks data the operation needs.
    #[error("upstream reply incomplete: {0}")]
    IncompleteUpstream(#[source] ContractViolation),
    #[error("invalid upstream settings: {0}")]
    Settings(String),
}

impl ParkingError {
    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Upstream(inner) => inner.kind(),
            Self::Validation(_) => "validation",
            Self::IncompleteUpstream(_) => "incomplete_upstream",
            Self::Settings(_) => "settings",
        }
    }
}
