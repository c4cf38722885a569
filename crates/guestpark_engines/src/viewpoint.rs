#![forbid(unsafe_code)]

use chrono::{DateTime, Months, SecondsFormat, Utc};
use guestpark_contracts::ParkingConfig;

/// Per-operation time context: the instant the operation started and the
/// viewpoint every upstream call of that operation is pinned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationScope {
    pub viewpoint: String,
    pub now: DateTime<Utc>,
}

impl OperationScope {
    /// A configured viewpoint wins and is passed through untouched; a blank
    /// one counts as unset and the viewpoint is derived from `now`.
    pub fn resolve(config: &ParkingConfig, now: DateTime<Utc>) -> Self {
        let viewpoint = config
            .viewpoint
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true));
        Self { viewpoint, now }
    }

    pub fn validity_cutoff(&self) -> DateTime<Utc> {
        one_month_after(self.now)
    }

    /// `<viewpoint>/<cutoff>` as the permits query expects it.
    pub fn validity_range(&self) -> String {
        format!(
            "{}/{}",
            self.viewpoint,
            self.validity_cutoff()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Same day next month, clamped to the month's last day (Jan 31 -> Feb 28/29).
/// Always strictly later than `now`.
pub fn one_month_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
