#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::validate_non_empty;
use crate::{ContractViolation, OrderedMap, Validate};

/// A vehicle the household knows by name, independent of upstream records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVehicleRecord {
    /// Plate, stored uppercased.
    pub vehicle: String,
    pub notes: String,
    pub name: String,
    pub display_value: String,
}

/// Slug-keyed local vehicles in file order.
pub type VehicleRegistry = OrderedMap<LocalVehicleRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRegistration {
    pub plate: String,
    pub make_model: String,
    pub owner: String,
}

impl VehicleRegistration {
    pub fn v1(
        plate: impl Into<String>,
        make_model: impl Into<String>,
        owner: impl Into<String>,
    ) -> Result<Self, ContractViolation> {
        let registration = Self {
            plate: plate.into(),
            make_model: make_model.into(),
            owner: owner.into(),
        };
        registration.validate()?;
        Ok(registration)
    }
}

impl Validate for VehicleRegistration {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_non_empty("vehicle_registration.plate", &self.plate)?;
        validate_non_empty("vehicle_registration.make_model", &self.make_model)?;
        validate_non_empty("vehicle_registration.owner", &self.owner)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredVehicle {
    pub key: String,
    pub vehicle: LocalVehicleRecord,
}
