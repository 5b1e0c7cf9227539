use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use vax_core::{
    CoreConfig, Services, SystemClock,
    config::{data_dir_from_env_value, flag_from_env_value, session_ttl_from_env_value},
    constants::DEFAULT_REST_ADDR,
    open_store,
};

/// Main entry point for the vaccination tracker
///
/// Resolves configuration from the environment once, opens the store and serves the REST API
/// until interrupted.
///
/// # Environment Variables
/// - `VAX_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `VAX_DATA_DIR`: Directory of the YAML store; records are kept in memory when unset
/// - `VAX_SESSION_TTL_MINUTES`: Session lifetime in minutes (default: 30)
/// - `VAX_SEED_CATALOG`: When true, loads the national schedule into an empty catalog
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, store opening or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vax_run=info".parse()?)
                .add_directive("vax_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("VAX_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("VAX_DATA_DIR").ok()),
        session_ttl_from_env_value(std::env::var("VAX_SESSION_TTL_MINUTES").ok())?,
        flag_from_env_value(std::env::var("VAX_SEED_CATALOG").ok())?,
    )?;

    let store = open_store(&cfg)?;
    let services = Services::new(&cfg, store, Arc::new(SystemClock));
    if cfg.seed_catalog() {
        let added = services.catalog.seed_national_schedule()?;
        tracing::info!("catalog seeding added {} vaccines", added);
    }

    let app = api_rest::router(AppState::new(&cfg, services));

    tracing::info!("++ Starting vaccination tracker REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Shut down");
    Ok(())
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
