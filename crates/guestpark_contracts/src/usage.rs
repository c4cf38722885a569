#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ItemsEnvelope, OrderedMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsagePeriod {
    #[serde(rename = "P1W")]
    Weekly,
    #[serde(rename = "P1M")]
    Monthly,
}

impl UsagePeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "P1W",
            Self::Monthly => "P1M",
        }
    }

    pub const fn all() -> &'static [Self] {
        &[Self::Weekly, Self::Monthly]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLimit {
    pub id: String,
    pub display: String,
    pub per: UsagePeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageItem {
    pub used: OrderedMap<UsageCounter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageResponse {
    pub limits: ItemsEnvelope<UsageLimit>,
    pub usage: ItemsEnvelope<UsageItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub weekly_limit: String,
    pub monthly_limit: String,
    pub weekly_usage: String,
    pub monthly_usage: String,
}
