#![forbid(unsafe_code)]

//! URL construction for the permit service.
//!
//! The service takes credentials and arguments as query parameters rather
//! than headers or bodies. Parameter names and order are part of the contract.

use guestpark_contracts::permit::ReservationRequest;
use guestpark_contracts::session::BearerSession;
use guestpark_contracts::ParkingConfig;
use url::Url;

use crate::error::ParkingError;
use crate::viewpoint::OperationScope;

/// Counter sampling window sent with usage queries.
pub const USAGE_SAMPLE_WINDOW: &str = "PT24H";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamEndpoints {
    base: Url,
}

impl UpstreamEndpoints {
    pub fn new(base_url: &str) -> Result<Self, ParkingError> {
        let base = Url::parse(base_url)
            .map_err(|err| ParkingError::Settings(format!("api base url: {err}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ParkingError::Settings(
                "api base url must be an http(s) url".to_string(),
            ));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `POST /accounts/auth/tokens`
    pub fn auth_tokens(&self, config: &ParkingConfig, scope: &OperationScope) -> Url {
        let mut url = self.path(&["accounts", "auth", "tokens"]);
        url.query_pairs_mut()
            .append_pair("viewpoint", &scope.viewpoint)
            .append_pair("location", &config.location)
            .append_pair("tenant", &config.tenant)
            .append_pair("password", &config.token);
        url
    }

    /// `GET /locations/{location}/tenants/{subject}/permits`
    pub fn tenant_permits(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        session: &BearerSession,
    ) -> Url {
        let mut url = self.path(&[
            "locations",
            &config.location,
            "tenants",
            &session.subject,
            "permits",
        ]);
        url.query_pairs_mut()
            .append_pair("viewpoint", &scope.viewpoint)
            .append_pair("valid", &scope.validity_range())
            .append_pair("Authorization", &session.authorization_param());
        url
    }

    /// `GET /locations/{location}/tenants/{subject}/permits/temporary/usage`
    pub fn temporary_usage(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        session: &BearerSession,
    ) -> Url {
        let mut url = self.path(&[
            "locations",
            &config.location,
            "tenants",
            &session.subject,
            "permits",
            "temporary",
            "usage",
        ]);
        url.query_pairs_mut()
            .append_pair("viewpoint", &scope.viewpoint)
            .append_pair("sample", USAGE_SAMPLE_WINDOW)
            .append_pair("Authorization", &session.authorization_param());
        url
    }

    /// `POST /permits/temporary`
    pub fn temporary_permit(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        request: &ReservationRequest,
    ) -> Url {
        let mut url = self.path(&["permits", "temporary"]);
        url.query_pairs_mut()
            .append_pair("viewpoint", &scope.viewpoint)
            .append_pair("location", &config.location)
            .append_pair("policy", &config.policy)
            .append_pair("tenant", &config.tenant)
            .append_pair("token", &config.token)
            .append_pair("vehicle", &request.vehicle)
            .append_pair("space", &config.space)
            .append_pair("duration", &config.duration)
            .append_pair("notes", &request.notes)
            .append_pair("name", &request.name)
            .append_pair("email", &config.email)
            .append_pair("tel", &config.tel);
        url
    }

    /// `PUT /permits/{id}/expires`
    pub fn permit_expiry(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        permit_id: &str,
    ) -> Url {
        let mut url = self.path(&["permits", permit_id, "expires"]);
        url.query_pairs_mut()
            .append_pair("viewpoint", &scope.viewpoint)
            .append_pair("permit", permit_id)
            .append_pair("to", &config.email);
        url
    }

    fn path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
