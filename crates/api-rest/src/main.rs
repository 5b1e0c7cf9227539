//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development against the API alone. The workspace's main `vax-run` binary serves the
//! same router.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vax_core::{
    config::{data_dir_from_env_value, flag_from_env_value, session_ttl_from_env_value},
    constants::DEFAULT_REST_ADDR,
    open_store, CoreConfig, Services, SystemClock,
};

/// Main entry point for the REST API server
///
/// # Environment Variables
/// - `VAX_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `VAX_DATA_DIR`: YAML store directory; in-memory when unset
/// - `VAX_SESSION_TTL_MINUTES`: Session lifetime (default: 30)
/// - `VAX_SEED_CATALOG`: Seed the national schedule into an empty catalog
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - an environment variable is malformed or the store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("vax_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("VAX_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("VAX_DATA_DIR").ok()),
        session_ttl_from_env_value(std::env::var("VAX_SESSION_TTL_MINUTES").ok())?,
        flag_from_env_value(std::env::var("VAX_SEED_CATALOG").ok())?,
    )?;

    let store = open_store(&cfg)?;
    let services = Services::new(&cfg, store, Arc::new(SystemClock));
    if cfg.seed_catalog() {
        services.catalog.seed_national_schedule()?;
    }

    let app = api_rest::router(api_rest::AppState::new(&cfg, services));

    tracing::info!("-- Starting vaccination tracker REST API on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
