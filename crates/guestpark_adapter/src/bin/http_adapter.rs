#![forbid(unsafe_code)]

use std::sync::Arc;

use guestpark_adapter::{bind_addr_from_env, router};
use guestpark_os::{ParkingService, ServiceSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr = bind_addr_from_env()?;
    let settings = ServiceSettings::from_env();
    let service = Arc::new(ParkingService::from_settings(&settings)?);
    let app = router(service);

    info!(
        %addr,
        config = %settings.config_path.display(),
        vehicles = %settings.vehicles_path.display(),
        api = %settings.upstream.base_url,
        "guestpark_http listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
