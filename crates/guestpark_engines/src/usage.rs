#![forbid(unsafe_code)]

use guestpark_contracts::session::BearerSession;
use guestpark_contracts::usage::{UsageLimit, UsagePeriod, UsageResponse, UsageSummary};
use guestpark_contracts::{ContractViolation, ParkingConfig};
use tracing::debug;

use crate::error::ParkingError;
use crate::http::HttpTransport;
use crate::schema::{required, Shape};
use crate::viewpoint::OperationScope;
use crate::PermitApi;

pub fn usage_response_shape() -> Shape {
    Shape::object([
        required(
            "limits",
            Shape::items(Shape::object([
                required("id", Shape::String),
                required("display", Shape::String),
                required(
                    "per",
                    Shape::OneOf(UsagePeriod::all().iter().map(|p| p.as_str()).collect()),
                ),
            ])),
        ),
        required(
            "usage",
            Shape::items(Shape::object([required(
                "used",
                Shape::record(Shape::object([required("display", Shape::String)])),
            )])),
        ),
    ])
}

/// Leading token of a display label: `"42 of 50"` -> `"42"`.
pub fn until_first_space(display: &str) -> &str {
    display.split(' ').next().unwrap_or(display)
}

/// Reduces limits and counters to the four leading-token labels. A reply
/// lacking a period's limit or counter is `IncompleteUpstream`.
pub fn summarize_usage(response: &UsageResponse) -> Result<UsageSummary, ParkingError> {
    reduce_usage(response).map_err(ParkingError::IncompleteUpstream)
}

fn reduce_usage(response: &UsageResponse) -> Result<UsageSummary, ContractViolation> {
    let weekly = limit_for(response, UsagePeriod::Weekly).ok_or(ContractViolation::Missing {
        field: "usage.weekly_limit",
        reason: "no P1W limit reported",
    })?;
    let monthly = limit_for(response, UsagePeriod::Monthly).ok_or(ContractViolation::Missing {
        field: "usage.monthly_limit",
        reason: "no P1M limit reported",
    })?;
    Ok(UsageSummary {
        weekly_limit: until_first_space(&weekly.display).to_string(),
        monthly_limit: until_first_space(&monthly.display).to_string(),
        weekly_usage: first_counter(response, weekly, "usage.weekly_usage")?.to_string(),
        monthly_usage: first_counter(response, monthly, "usage.monthly_usage")?.to_string(),
    })
}

// Several limits may share a period; the last one in upstream order wins.
fn limit_for(response: &UsageResponse, period: UsagePeriod) -> Option<&UsageLimit> {
    response
        .limits
        .items
        .values()
        .filter(|limit| limit.per == period)
        .last()
}

fn first_counter<'a>(
    response: &'a UsageResponse,
    limit: &UsageLimit,
    field: &'static str,
) -> Result<&'a str, ContractViolation> {
    let item = response
        .usage
        .items
        .get(&limit.id)
        .ok_or(ContractViolation::Missing {
            field,
            reason: "limit has no usage entry",
        })?;
    let (_, counter) = item.used.first().ok_or(ContractViolation::Missing {
        field,
        reason: "usage entry has no counters",
    })?;
    Ok(until_first_space(&counter.display))
}

impl<T: HttpTransport> PermitApi<T> {
    pub fn fetch_usage(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        session: &BearerSession,
    ) -> Result<UsageResponse, ParkingError> {
        let url = self.endpoints().temporary_usage(config, scope, session);
        let response = self.client().get(&url, Some(&usage_response_shape()))?;
        Ok(response)
    }

    pub fn compute_usage(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
    ) -> Result<UsageSummary, ParkingError> {
        let session = self.acquire_token(config, scope)?;
        let response = self.fetch_usage(config, scope, &session)?;
        let summary = summarize_usage(&response)?;
        debug!(
            weekly = %summary.weekly_usage,
            monthly = %summary.monthly_usage,
            "usage summarized"
        );
        Ok(summary)
    }
}
