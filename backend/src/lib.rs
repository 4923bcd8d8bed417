//! # Chama Tracker Backend
//!
//! Contains all non-UI logic for tracking monthly group contributions:
//! who owes what for which month, whether they paid on time, and what
//! late fine applies.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (validation, fine derivation, services)
//!     ↓
//! Storage Layer (SQLite, uniqueness and cascade constraints)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::domain::{MemberService, MonthService, PaymentService};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub member_service: MemberService,
    pub month_service: MonthService,
    pub payment_service: PaymentService,
}

/// Initialize the backend with all required services
pub async fn initialize_backend() -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::init().await?;

    info!("Setting up domain services");
    let app_state = AppState {
        member_service: MemberService::new(db.clone()),
        month_service: MonthService::new(db.clone()),
        payment_service: PaymentService::new(db),
    };

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow a frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/members", get(io::rest::list_members).post(io::rest::create_member))
        .route("/members/active", get(io::rest::list_active_members))
        .route(
            "/members/:id",
            put(io::rest::update_member).delete(io::rest::delete_member),
        )
        .route("/months", get(io::rest::list_months).post(io::rest::create_month))
        .route("/months/open", get(io::rest::list_open_months))
        .route("/months/:id", delete(io::rest::delete_month))
        .route("/months/:id/locked", put(io::rest::set_month_locked))
        .route("/payments", get(io::rest::list_payments).post(io::rest::create_payment))
        .route(
            "/payments/:id",
            put(io::rest::update_payment).delete(io::rest::delete_payment),
        );

    Router::new().nest("/api", api_routes).layer(cors).with_state(app_state)
}
