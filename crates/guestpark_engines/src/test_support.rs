#![forbid(unsafe_code)]

use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use guestpark_contracts::ParkingConfig;
use url::Url;

use crate::http::{HttpMethod, HttpReply, HttpTransport, TransportError};
use crate::{OperationScope, PermitApi, UpstreamEndpoints};

pub fn config() -> ParkingConfig {
    ParkingConfig {
        tenant: "unit204".to_string(),
        location: "loc1".to_string(),
        token: "s3cret".to_string(),
        policy: "pol1".to_string(),
        space: "G-12".to_string(),
        duration: "PT24H".to_string(),
        email: "guest@example.com".to_string(),
        tel: "5550100".to_string(),
        viewpoint: None,
    }
}

pub fn scope() -> OperationScope {
    OperationScope::resolve(
        &config(),
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    )
}

pub fn api(transport: MockTransport) -> PermitApi<MockTransport> {
    PermitApi::new(
        transport,
        UpstreamEndpoints::new("https://api.parkingboss.com/v1").unwrap(),
    )
}

#[derive(Debug)]
struct Route {
    method: HttpMethod,
    path: String,
    outcome: Result<HttpReply, TransportError>,
}

/// Path-routed canned replies; records every request it sees.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<(HttpMethod, Url)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            outcome: Ok(HttpReply {
                status,
                body: body.to_string(),
            }),
        });
        self
    }

    pub fn fail(mut self, method: HttpMethod, path: &str, kind: &'static str) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            outcome: Err(TransportError::new(kind)),
        });
        self
    }

    pub fn calls(&self) -> Vec<(HttpMethod, Url)> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn query_of(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, TransportError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push((method, url.clone()));
        self.routes
            .iter()
            .find(|r| r.method == method && r.path == url.path())
            .map(|r| r.outcome.clone())
            .unwrap_or(Ok(HttpReply {
                status: 404,
                body: String::new(),
            }))
    }
}
