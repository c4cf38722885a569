#![forbid(unsafe_code)]

//! Caller-facing parking operations.
//!
//! Each operation reads the configuration, pins one viewpoint, runs its chain
//! of upstream calls and reports failure as a bare [`OperationFailure`]. The
//! detailed cause only goes to the log.

use std::path::PathBuf;
use std::thread;

use guestpark_contracts::permit::{Reservation, ReservationRequest};
use guestpark_contracts::registry::{RegisteredVehicle, VehicleRegistration, VehicleRegistry};
use guestpark_contracts::usage::UsageSummary;
use guestpark_contracts::{ParkingConfig, Validate};
use guestpark_engines::registry::register;
use guestpark_engines::{
    HttpTransport, OperationScope, ParkingError, PermitApi, UpstreamEndpoints, UpstreamSettings,
    UreqTransport,
};
use guestpark_storage::config::config_path_from_env;
use guestpark_storage::vehicles::DEFAULT_VEHICLES_PATH;
use guestpark_storage::{load_parking_config, JsonFileVehicleStore, StoreError, VehicleRegistryStore};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::clock::{Clock, SystemClock};

const LIST_ACTIVE_RESERVATIONS: &str = "list_active_reservations";
const COMPUTE_USAGE: &str = "compute_usage";
const CREATE_RESERVATION: &str = "create_reservation";
const CANCEL_RESERVATION: &str = "cancel_reservation";
const CANCEL_RESERVATIONS: &str = "cancel_reservations";
const CANCEL_ALL_RESERVATIONS: &str = "cancel_all_reservations";
const REGISTER_VEHICLE: &str = "register_vehicle";
const LIST_VEHICLES: &str = "list_vehicles";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Parking(#[from] ParkingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("internal failure: {0}")]
    Internal(&'static str),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parking(inner) => inner.kind(),
            Self::Store(_) => "store",
            Self::Internal(_) => "internal",
        }
    }

    /// True when the caller's own input was refused.
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, Self::Parking(ParkingError::Validation(_)))
    }
}

/// What callers learn about a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} failed")]
pub struct OperationFailure {
    pub operation: &'static str,
    pub rejected_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    pub id: String,
    pub result: Result<(), OperationFailure>,
}

impl CancelOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.result.is_ok()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn current(&self) -> Result<ParkingConfig, ServiceError>;
}

impl ConfigProvider for ParkingConfig {
    fn current(&self) -> Result<ParkingConfig, ServiceError> {
        // A bad operator config is a settings fault, never rejected input.
        self.validate()
            .map_err(|violation| ParkingError::Settings(violation.to_string()))?;
        Ok(self.clone())
    }
}

/// Configuration document re-read on every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigProvider for ConfigFile {
    fn current(&self) -> Result<ParkingConfig, ServiceError> {
        Ok(load_parking_config(&self.path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub config_path: PathBuf,
    pub vehicles_path: PathBuf,
    pub upstream: UpstreamSettings,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(guestpark_storage::config::DEFAULT_CONFIG_PATH),
            vehicles_path: PathBuf::from(DEFAULT_VEHICLES_PATH),
            upstream: UpstreamSettings::default(),
        }
    }
}

impl ServiceSettings {
    pub fn from_env() -> Self {
        Self {
            config_path: config_path_from_env(),
            vehicles_path: JsonFileVehicleStore::from_env().path().to_path_buf(),
            upstream: UpstreamSettings::from_env(),
        }
    }
}

pub struct ParkingService<T, S> {
    api: PermitApi<T>,
    store: S,
    config: Box<dyn ConfigProvider>,
    clock: Box<dyn Clock>,
}

impl ParkingService<UreqTransport, JsonFileVehicleStore> {
    /// Live wiring: ureq transport, JSON files on disk, wall clock.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let transport = UreqTransport::new(&settings.upstream).map_err(ParkingError::Settings)?;
        let endpoints = UpstreamEndpoints::new(&settings.upstream.base_url)?;
        Ok(Self::new(
            PermitApi::new(transport, endpoints),
            JsonFileVehicleStore::new(&settings.vehicles_path),
            ConfigFile::new(&settings.config_path),
        ))
    }
}

impl<T: HttpTransport, S: VehicleRegistryStore> ParkingService<T, S> {
    pub fn new(api: PermitApi<T>, store: S, config: impl ConfigProvider + 'static) -> Self {
        Self {
            api,
            store,
            config: Box::new(config),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn api(&self) -> &PermitApi<T> {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn list_active_reservations(&self) -> Result<Vec<Reservation>, OperationFailure> {
        finish(LIST_ACTIVE_RESERVATIONS, self.try_list_active_reservations())
    }

    pub fn compute_usage(&self) -> Result<UsageSummary, OperationFailure> {
        finish(COMPUTE_USAGE, self.try_compute_usage())
    }

    pub fn create_reservation(&self, request: &ReservationRequest) -> Result<(), OperationFailure> {
        finish(CREATE_RESERVATION, self.try_create_reservation(request))
    }

    pub fn cancel_reservation(&self, permit_id: &str) -> Result<(), OperationFailure> {
        finish(CANCEL_RESERVATION, self.try_cancel_reservation(permit_id))
    }

    /// Cancels every id concurrently. Outcomes are independent and come back
    /// in input order; nothing is rolled back.
    pub fn cancel_reservations(&self, ids: &[String]) -> Result<Vec<CancelOutcome>, OperationFailure> {
        let (config, scope) = finish(CANCEL_RESERVATIONS, self.operation_scope())?;
        Ok(self.cancel_each(&config, &scope, ids))
    }

    /// Lists the active guest reservations, then cancels all of them.
    pub fn cancel_all_reservations(&self) -> Result<Vec<CancelOutcome>, OperationFailure> {
        let (config, scope, ids) = finish(CANCEL_ALL_RESERVATIONS, self.try_active_ids())?;
        let outcomes = self.cancel_each(&config, &scope, &ids);
        let cancelled = outcomes.iter().filter(|o| o.is_cancelled()).count();
        info!(
            requested = ids.len(),
            cancelled, "bulk cancellation finished"
        );
        Ok(outcomes)
    }

    pub fn register_vehicle(
        &self,
        registration: &VehicleRegistration,
    ) -> Result<RegisteredVehicle, OperationFailure> {
        finish(REGISTER_VEHICLE, self.try_register_vehicle(registration))
    }

    pub fn list_vehicles(&self) -> Result<VehicleRegistry, OperationFailure> {
        finish(LIST_VEHICLES, self.store.read().map_err(ServiceError::from))
    }

    fn operation_scope(&self) -> Result<(ParkingConfig, OperationScope), ServiceError> {
        let config = self.config.current()?;
        let scope = OperationScope::resolve(&config, self.clock.now());
        Ok((config, scope))
    }

    fn try_list_active_reservations(&self) -> Result<Vec<Reservation>, ServiceError> {
        let (config, scope) = self.operation_scope()?;
        let registry = self.store.read()?;
        let reservations = self
            .api
            .list_active_reservations(&config, &scope, &registry)?;
        info!(count = reservations.len(), "active reservations listed");
        Ok(reservations)
    }

    fn try_compute_usage(&self) -> Result<UsageSummary, ServiceError> {
        let (config, scope) = self.operation_scope()?;
        Ok(self.api.compute_usage(&config, &scope)?)
    }

    fn try_create_reservation(&self, request: &ReservationRequest) -> Result<(), ServiceError> {
        request.validate().map_err(ParkingError::from)?;
        let (config, scope) = self.operation_scope()?;
        self.api.create_temporary_permit(&config, &scope, request)?;
        info!(vehicle = %request.vehicle, "reservation created");
        Ok(())
    }

    fn try_cancel_reservation(&self, permit_id: &str) -> Result<(), ServiceError> {
        let (config, scope) = self.operation_scope()?;
        self.api.expire_permit(&config, &scope, permit_id)?;
        info!(permit_id, "reservation cancelled");
        Ok(())
    }

    fn try_active_ids(&self) -> Result<(ParkingConfig, OperationScope, Vec<String>), ServiceError> {
        let (config, scope) = self.operation_scope()?;
        let registry = self.store.read()?;
        let ids = self
            .api
            .list_active_reservations(&config, &scope, &registry)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        Ok((config, scope, ids))
    }

    fn try_register_vehicle(
        &self,
        registration: &VehicleRegistration,
    ) -> Result<RegisteredVehicle, ServiceError> {
        registration.validate().map_err(ParkingError::from)?;
        let mut registry = self.store.read()?;
        let registered = register(&mut registry, registration)?;
        self.store.write(&registry)?;
        info!(key = %registered.key, "vehicle registered");
        Ok(registered)
    }

    fn cancel_each(
        &self,
        config: &ParkingConfig,
        scope: &OperationScope,
        ids: &[String],
    ) -> Vec<CancelOutcome> {
        thread::scope(|s| {
            let handles: Vec<_> = ids
                .iter()
                .map(|id| {
                    s.spawn(move || {
                        self.api
                            .expire_permit(config, scope, id)
                            .map_err(ServiceError::from)
                    })
                })
                .collect();
            handles
                .into_iter()
                .zip(ids)
                .map(|(handle, id)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        warn!(permit_id = %id, "cancel worker panicked");
                        Err(ServiceError::Internal("cancel worker panicked"))
                    });
                    CancelOutcome {
                        id: id.clone(),
                        result: finish(CANCEL_RESERVATION, result),
                    }
                })
                .collect()
        })
    }
}

fn finish<R>(operation: &'static str, result: Result<R, ServiceError>) -> Result<R, OperationFailure> {
    result.map_err(|err| {
        error!(operation, kind = err.kind(), error = %err, "operation failed");
        OperationFailure {
            operation,
            rejected_input: err.is_rejected_input(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use guestpark_engines::{HttpMethod, HttpReply, TransportError};
    use guestpark_storage::InMemoryVehicleStore;
    use std::sync::Mutex;
    use url::Url;

    const TOKENS: &str = "/v1/accounts/auth/tokens";
    const PERMITS: &str = "/v1/locations/loc1/tenants/sub_1/permits";
    const USAGE: &str = "/v1/locations/loc1/tenants/sub_1/permits/temporary/usage";
    const TOKEN_REPLY: &str = r#"{"subject":"sub_1","token":"tok_1"}"#;

    /// Answers by method and path; anything unrouted gets a 404.
    #[derive(Debug, Default)]
    struct RoutedTransport {
        routes: Vec<(HttpMethod, String, u16, String)>,
        calls: Mutex<Vec<(HttpMethod, Url)>>,
    }

    impl RoutedTransport {
        fn route(mut self, method: HttpMethod, path: &str, status: u16, body: &str) -> Self {
            self.routes
                .push((method, path.to_string(), status, body.to_string()));
            self
        }

        fn calls_with(&self, method: HttpMethod) -> Vec<Url> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| *m == method)
                .map(|(_, u)| u.clone())
                .collect()
        }
    }

    impl HttpTransport for RoutedTransport {
        fn send(&self, method: HttpMethod, url: &Url) -> Result<HttpReply, TransportError> {
            self.calls.lock().unwrap().push((method, url.clone()));
            let (status, body) = self
                .routes
                .iter()
                .find(|(m, p, _, _)| *m == method && p == url.path())
                .map(|(_, _, s, b)| (*s, b.clone()))
                .unwrap_or((404, String::new()));
            Ok(HttpReply { status, body })
        }
    }

    fn config() -> ParkingConfig {
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

    fn permits_body() -> String {
        let window = r#"{"min":{"local":"2026-10-19T08:00"},"max":{"local":"2026-10-20T08:00"}}"#;
        format!(
            r#"{{"permits":{{"items":{{
                "p1":{{"id":"p1","title":"Guest Parking","vehicle":"v1","name":"John Doe","valid":{window},"grace":{window}}},
                "p2":{{"id":"p2","title":"Resident","vehicle":"v1","name":"Res","valid":{window},"grace":{window}}}
            }}}},"vehicles":{{"items":{{"v1":{{"display":"8FBY787"}}}}}}}}"#
        )
    }

    fn service(
        transport: RoutedTransport,
    ) -> ParkingService<RoutedTransport, InMemoryVehicleStore> {
        let endpoints = UpstreamEndpoints::new("https://api.parkingboss.com/v1").unwrap();
        ParkingService::new(
            PermitApi::new(transport, endpoints),
            InMemoryVehicleStore::new(),
            config(),
        )
        .with_clock(FixedClock(
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
        ))
    }

    fn listing_transport() -> RoutedTransport {
        RoutedTransport::default()
            .route(HttpMethod::Post, TOKENS, 200, TOKEN_REPLY)
            .route(HttpMethod::Get, PERMITS, 200, &permits_body())
    }

    #[test]
    fn at_service_01_list_then_cancel_issues_exactly_one_put() {
        let svc = service(
            listing_transport().route(HttpMethod::Put, "/v1/permits/p1/expires", 200, ""),
        );
        let listed = svc.list_active_reservations().unwrap();
        assert_eq!(listed.len(), 1);
        svc.cancel_reservation(&listed[0].id).unwrap();

        let puts = svc.api().transport().calls_with(HttpMethod::Put);
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path(), "/v1/permits/p1/expires");
        assert!(puts[0].query().unwrap_or_default().contains("permit=p1"));
    }

    #[test]
    fn at_service_02_registered_vehicle_enriches_listing() {
        let svc = service(listing_transport());
        let registered = svc
            .register_vehicle(&VehicleRegistration::v1("8fby787", "tesla model 3", "john doe").unwrap())
            .unwrap();
        assert_eq!(registered.key, "john-tesla-model-3");

        let listed = svc.list_active_reservations().unwrap();
        assert_eq!(
            listed[0].display_name.as_deref(),
            Some("John's Tesla Model 3")
        );
        let vehicles = svc.list_vehicles().unwrap();
        assert_eq!(vehicles.len(), 1);
    }

    #[test]
    fn at_service_03_bulk_cancel_reports_each_id_independently() {
        let svc = service(
            RoutedTransport::default()
                .route(HttpMethod::Put, "/v1/permits/a/expires", 200, "")
                .route(HttpMethod::Put, "/v1/permits/c/expires", 204, ""),
        );
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let outcomes = svc.cancel_reservations(&ids).unwrap();
        let summary: Vec<(&str, bool)> = outcomes
            .iter()
            .map(|o| (o.id.as_str(), o.is_cancelled()))
            .collect();
        assert_eq!(summary, vec![("a", true), ("b", false), ("c", true)]);
        assert_eq!(
            outcomes[1].result,
            Err(OperationFailure {
                operation: CANCEL_RESERVATION,
                rejected_input: false,
            })
        );
        assert_eq!(svc.api().transport().calls_with(HttpMethod::Put).len(), 3);
    }

    #[test]
    fn at_service_04_cancel_all_cancels_only_guest_permits() {
        let svc = service(
            listing_transport().route(HttpMethod::Put, "/v1/permits/p1/expires", 200, ""),
        );
        let outcomes = svc.cancel_all_reservations().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_cancelled());
        assert_eq!(outcomes[0].id, "p1");
    }

    #[test]
    fn at_service_05_failures_are_reduced_to_operation_and_input_flag() {
        let svc = service(RoutedTransport::default().route(HttpMethod::Post, TOKENS, 500, ""));
        assert_eq!(
            svc.compute_usage(),
            Err(OperationFailure {
                operation: COMPUTE_USAGE,
                rejected_input: false,
            })
        );

        let blank = ReservationRequest {
            vehicle: String::new(),
            notes: String::new(),
            name: "John".to_string(),
        };
        assert_eq!(
            svc.create_reservation(&blank),
            Err(OperationFailure {
                operation: CREATE_RESERVATION,
                rejected_input: true,
            })
        );
        let rejected = svc
            .register_vehicle(&VehicleRegistration {
                plate: "x".to_string(),
                make_model: " ".to_string(),
                owner: "y".to_string(),
            })
            .unwrap_err();
        assert!(rejected.rejected_input);
        assert_eq!(rejected.to_string(), "register_vehicle failed");
    }

    #[test]
    fn at_service_06_config_file_is_read_per_operation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let endpoints = UpstreamEndpoints::new("https://api.parkingboss.com/v1").unwrap();
        let svc = ParkingService::new(
            PermitApi::new(listing_transport(), endpoints),
            InMemoryVehicleStore::new(),
            ConfigFile::new(&path),
        );

        assert!(svc.list_active_reservations().is_err());
        assert!(svc.api().transport().calls_with(HttpMethod::Post).is_empty());

        std::fs::write(&path, serde_json::to_string(&config()).unwrap()).unwrap();
        assert_eq!(svc.list_active_reservations().unwrap().len(), 1);
    }

    #[test]
    fn at_service_07_incomplete_usage_reply_is_not_rejected_input() {
        let only_weekly = r#"{"limits":{"items":{"w":{"id":"w","display":"5 per week","per":"P1W"}}},
            "usage":{"items":{"w":{"used":{"c1":{"display":"1 of 5"}}}}}}"#;
        let svc = service(
            RoutedTransport::default()
                .route(HttpMethod::Post, TOKENS, 200, TOKEN_REPLY)
                .route(HttpMethod::Get, USAGE, 200, only_weekly),
        );
        assert_eq!(
            svc.compute_usage(),
            Err(OperationFailure {
                operation: COMPUTE_USAGE,
                rejected_input: false,
            })
        );
        let incomplete = ServiceError::from(ParkingError::IncompleteUpstream(
            guestpark_contracts::ContractViolation::Missing {
                field: "usage.monthly_limit",
                reason: "no P1M limit reported",
            },
        ));
        assert_eq!(incomplete.kind(), "incomplete_upstream");
        assert!(!incomplete.is_rejected_input());
    }

    #[test]
    fn at_service_08_invalid_config_and_worker_panic_are_not_rejected_input() {
        let endpoints = UpstreamEndpoints::new("https://api.parkingboss.com/v1").unwrap();
        let blank_tenant = ParkingConfig {
            tenant: " ".to_string(),
            ..config()
        };
        let svc = ParkingService::new(
            PermitApi::new(listing_transport(), endpoints),
            InMemoryVehicleStore::new(),
            blank_tenant,
        );
        assert_eq!(
            svc.compute_usage(),
            Err(OperationFailure {
                operation: COMPUTE_USAGE,
                rejected_input: false,
            })
        );
        assert!(svc.api().transport().calls_with(HttpMethod::Post).is_empty());

        let panicked = ServiceError::Internal("cancel worker panicked");
        assert_eq!(panicked.kind(), "internal");
        assert!(!panicked.is_rejected_input());
    }
}
