//! Emergency Triage Cloud Backend
//!
//! HTTP front for the triage core: classifies stored or inline reports,
//! records reviewer corrections, and runs the learning loop against
//! PostgreSQL-backed corrections and adaptive rules.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    TRIAGE CLOUD                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  API      │  │  triage-core  │  │  Learning           │ │
//! │  │  Gateway  │─▶│  classify +   │  │  (on demand)        │ │
//! │  │  (Axum)   │  │  rule applier │  │  analyze → upsert   │ │
//! │  └─────┬─────┘  └───────────────┘  └──────────┬──────────┘ │
//! │        └──────────────┬────────────────────────┘            │
//! │                       ▼                                     │
//! │                ┌─────────────┐                             │
//! │                │ PostgreSQL  │                             │
//! │                └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use triage_core::ScoringTable;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    /// Scoring table selected at startup; immutable for the process lifetime
    pub table: Arc<ScoringTable>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let classification_routes = Router::new()
        .route("/api/v1/classify", post(handlers::classify::classify));

    let correction_routes = Router::new()
        .route("/api/v1/reports/:id/corrections", post(handlers::corrections::create))
        .route("/api/v1/corrections", get(handlers::corrections::list))
        .route("/api/v1/corrections/analysis", get(handlers::corrections::analysis));

    let rule_routes = Router::new()
        .route("/api/v1/rules", get(handlers::rules::list))
        .route("/api/v1/rules/learn", post(handlers::rules::learn))
        .route("/api/v1/rules/:id", put(handlers::rules::update));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(classification_routes)
        .merge(correction_routes)
        .merge(rule_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
