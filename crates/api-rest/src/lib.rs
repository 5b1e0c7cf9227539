//! # API REST
//!
//! REST API implementation for the vaccination tracker.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, session cookies)
//!
//! Uses `api-shared` for request/response types and `vax-core` for all business rules.

#![warn(rust_2018_idioms)]

mod error;
mod extract;
mod handlers;


pub use error::ApiError;
pub use extract::{CurrentDoctor, JsonBody};

use api_shared as shared;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vax_core::{CoreConfig, Services};

/// Application state for the REST API server
///
/// Shared by every request handler. Cloning is cheap: the services hold `Arc`s to the store,
/// the clock and the session table.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    session_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(cfg: &CoreConfig, services: Services) -> Self {
        Self {
            services,
            session_ttl: cfg.session_ttl(),
        }
    }

    /// Lifetime of the session cookie, in seconds.
    pub(crate) fn cookie_max_age(&self) -> i64 {
        self.session_ttl.num_seconds()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::me,
        handlers::list_vaccines,
        handlers::create_vaccine,
        handlers::delete_vaccine,
        handlers::list_patients,
        handlers::create_patient,
        handlers::get_patient,
        handlers::update_patient,
        handlers::delete_patient,
        handlers::available_vaccines,
        handlers::record_immunization,
        handlers::list_immunizations,
        handlers::retract_immunization,
        handlers::patient_schedule,
    ),
    components(schemas(
        shared::HealthRes,
        shared::ErrorRes,
        shared::CredentialsReq,
        shared::TokenRes,
        shared::DoctorRes,
        shared::VaccineReq,
        shared::VaccineRes,
        shared::PatientReq,
        shared::PatientRes,
        shared::ImmunizationReq,
        shared::ImmunizationRes,
        shared::ScheduleRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full application router, including Swagger UI and the OpenAPI document.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::register))
        .route("/auth/token", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/doctors/me", get(handlers::me))
        .route(
            "/vaccines",
            get(handlers::list_vaccines).post(handlers::create_vaccine),
        )
        .route("/vaccines/:id", delete(handlers::delete_vaccine))
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/patients/:id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route(
            "/patients/:id/available-vaccines",
            get(handlers::available_vaccines),
        )
        .route("/immunizations", post(handlers::record_immunization))
        .route(
            "/immunizations/patient/:id",
            get(handlers::list_immunizations),
        )
        .route("/immunizations/:id", delete(handlers::retract_immunization))
        .route("/schedule/:patient_id", get(handlers::patient_schedule))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
