#![forbid(unsafe_code)]

pub mod common;
pub mod config;
pub mod ordered;
pub mod permit;
pub mod registry;
pub mod session;
pub mod usage;

pub use common::{ContractViolation, Validate};
pub use config::ParkingConfig;
pub use ordered::{ItemsEnvelope, OrderedMap};
