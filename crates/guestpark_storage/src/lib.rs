#![forbid(unsafe_code)]

pub mod config;
pub mod vehicles;

use std::path::PathBuf;

use guestpark_contracts::ContractViolation;
use thiserror::Error;

pub use config::load_parking_config;
pub use vehicles::{InMemoryVehicleStore, JsonFileVehicleStore, VehicleRegistryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid stored document: {0}")]
    Contract(#[from] ContractViolation),
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
