#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use guestpark_contracts::registry::VehicleRegistry;
use tracing::debug;

use crate::StoreError;

pub const VEHICLES_PATH_ENV: &str = "GUESTPARK_VEHICLES_PATH";
pub const DEFAULT_VEHICLES_PATH: &str = "db/vehicles.json";

/// Whole-document persistence for the local vehicle registry.
///
/// There is no locking across a read and the following write. Two callers
/// that read the same snapshot and both write lose one update: the last
/// writer wins. Callers registering concurrently may also pick the same key.
pub trait VehicleRegistryStore: Send + Sync {
    fn read(&self) -> Result<VehicleRegistry, StoreError>;
    fn write(&self, registry: &VehicleRegistry) -> Result<(), StoreError>;
}

impl<S: VehicleRegistryStore + ?Sized> VehicleRegistryStore for std::sync::Arc<S> {
    fn read(&self) -> Result<VehicleRegistry, StoreError> {
        (**self).read()
    }

    fn write(&self, registry: &VehicleRegistry) -> Result<(), StoreError> {
        (**self).write(registry)
    }
}

/// Registry kept as one pretty-printed JSON object keyed by vehicle slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileVehicleStore {
    path: PathBuf,
}

impl JsonFileVehicleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `GUESTPARK_VEHICLES_PATH`, else `db/vehicles.json`.
    pub fn from_env() -> Self {
        let path = env::var(VEHICLES_PATH_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VEHICLES_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VehicleRegistryStore for JsonFileVehicleStore {
    fn read(&self) -> Result<VehicleRegistry, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(VehicleRegistry::new()),
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(VehicleRegistry::new());
        }
        serde_json::from_str(&raw).map_err(|err| StoreError::json(&self.path, err))
    }

    fn write(&self, registry: &VehicleRegistry) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
        let serialized =
            serde_json::to_vec_pretty(registry).map_err(|err| StoreError::json(&self.path, err))?;
        atomic_write(&self.path, &serialized)?;
        debug!(path = %self.path.display(), vehicles = registry.len(), "vehicle registry written");
        Ok(())
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("tmp");
    fs::write(&tmp, data).map_err(|err| StoreError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| StoreError::io(path, err))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct InMemoryVehicleStore {
    registry: Mutex<VehicleRegistry>,
}

impl InMemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: VehicleRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
        }
    }
}

impl VehicleRegistryStore for InMemoryVehicleStore {
    fn read(&self) -> Result<VehicleRegistry, StoreError> {
        self.registry
            .lock()
            .map(|r| r.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn write(&self, registry: &VehicleRegistry) -> Result<(), StoreError> {
        let mut guard = self.registry.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = registry.clone();
        Ok(())
    }
}
