#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use guestpark_contracts::{ParkingConfig, Validate};

use crate::StoreError;

pub const CONFIG_PATH_ENV: &str = "GUESTPARK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "db/config.json";

/// Reads and validates the parking configuration document.
pub fn load_parking_config(path: &Path) -> Result<ParkingConfig, StoreError> {
    let raw = fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
    let config: ParkingConfig =
        serde_json::from_str(&raw).map_err(|err| StoreError::json(path, err))?;
    config.validate()?;
    Ok(config)
}

/// `GUESTPARK_CONFIG_PATH`, else `db/config.json`.
pub fn config_path_from_env() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}
