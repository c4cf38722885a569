#![forbid(unsafe_code)]

pub mod clock;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use service::{
    CancelOutcome, ConfigFile, ConfigProvider, OperationFailure, ParkingService, ServiceError,
    ServiceSettings,
};
