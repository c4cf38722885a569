#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::validate_non_empty;
use crate::{ContractViolation, Validate};

/// Tenant-scoped settings for talking to the permit service.
///
/// `token` is the tenant's shared secret: it is sent as the `password` of the
/// token exchange and as the `token` of temporary-permit creation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingConfig {
    pub tenant: String,
    pub location: String,
    pub token: String,
    pub policy: String,
    pub space: String,
    pub duration: String,
    pub email: String,
    pub tel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewpoint: Option<String>,
}

impl fmt::Debug for ParkingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParkingConfig")
            .field("tenant", &self.tenant)
            .field("location", &self.location)
            .field("token", &"<redacted>")
            .field("policy", &self.policy)
            .field("space", &self.space)
            .field("duration", &self.duration)
            .field("email", &self.email)
            .field("tel", &self.tel)
            .field("viewpoint", &self.viewpoint)
            .finish()
    }
}

impl Validate for ParkingConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_non_empty("parking_config.tenant", &self.tenant)?;
        validate_non_empty("parking_config.location", &self.location)?;
        validate_non_empty("parking_config.token", &self.token)?;
        validate_non_empty("parking_config.policy", &self.policy)?;
        validate_non_empty("parking_config.space", &self.space)?;
        validate_non_empty("parking_config.duration", &self.duration)?;
        validate_non_empty("parking_config.email", &self.email)?;
        validate_non_empty("parking_config.tel", &self.tel)?;
        if let Some(viewpoint) = &self.viewpoint {
            validate_non_empty("parking_config.viewpoint", viewpoint)?;
        }
        Ok(())
    }
}
