//! clinica - medical practice records server
//!
//! REST API for accounts, doctors, patients, appointments and consultations.

pub mod audit;
pub mod config;
pub mod handlers;

use axum::{
    Router,
    http::Method,
    routing::{get, put},
};
use clinica_core::{API_BASE, PasswordHasher};
use clinica_store::{AuditLog, RedbStore, SqliteStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use handlers::{accounts, appointments, consultations, doctors, patients};

/// Application state
pub struct AppState {
    /// Accounts, doctors, patients and appointments
    pub records: SqliteStore,
    /// Consultations
    pub documents: RedbStore,
    pub audit: Arc<Mutex<AuditLog>>,
    pub hasher: PasswordHasher,
    pub config: config::ServerConfig,
}

impl AppState {
    pub fn new(
        records: SqliteStore,
        documents: RedbStore,
        audit: AuditLog,
        config: config::ServerConfig,
    ) -> Self {
        Self {
            records,
            documents,
            audit: Arc::new(Mutex::new(audit)),
            hasher: PasswordHasher::new(config.security.password_iterations),
            config,
        }
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Accounts
        .route("/accounts", get(accounts::search).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::read).delete(accounts::delete),
        )
        .route("/accounts/{id}/{field}", put(accounts::update))
        // Doctors
        .route("/doctors", get(doctors::search).post(doctors::create))
        .route("/doctors/{id}", get(doctors::read).delete(doctors::delete))
        .route("/doctors/{id}/{field}", put(doctors::update))
        // Patients
        .route("/patients", get(patients::search).post(patients::create))
        .route(
            "/patients/{cnp}",
            get(patients::read).delete(patients::delete),
        )
        .route("/patients/{cnp}/{field}", put(patients::update))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list).post(appointments::create),
        )
        .route(
            "/appointments/{id}",
            get(appointments::read).delete(appointments::delete),
        )
        .route("/appointments/{id}/{field}", put(appointments::update))
        // Consultations (addressed by natural key)
        .route(
            "/consultations",
            get(consultations::list)
                .post(consultations::create)
                .put(consultations::update),
        )
        .route(
            "/consultations/{patient_id}/{doctor_id}/{date}/{diagnostic}",
            get(consultations::read).delete(consultations::delete),
        )
}

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let body_limit = state.config.server.body_limit;

    Router::new()
        // Health check
        .route("/health", get(handlers::metadata::health_check))
        .nest(API_BASE, api_routes())
        // Middleware
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
