//! HTTP API Layer
//!
//! This crate hosts claim wizard sessions behind a REST API using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for wizard sessions and health checks
//! - **Sessions**: In-process store of active wizards
//! - **Middleware**: Tracing and request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(config, Arc::new(InMemoryClaimStore::new()));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimRecordPort, RoutingResolver};

use crate::config::ApiConfig;
use crate::handlers::{health, wizard};
use crate::middleware::request_log_middleware;
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub resolver: RoutingResolver,
    pub sessions: SessionStore,
    pub claims: Arc<dyn ClaimRecordPort>,
}

impl AppState {
    pub fn new(config: ApiConfig, claims: Arc<dyn ClaimRecordPort>) -> Self {
        Self {
            resolver: RoutingResolver::new(config.routing()),
            config,
            sessions: SessionStore::new(),
            claims,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `config` - API configuration
/// * `claims` - Store receiving completed claims
pub fn create_router(config: ApiConfig, claims: Arc<dyn ClaimRecordPort>) -> Router {
    router_with_state(AppState::new(config, claims))
}

/// Creates the router over an existing state, letting callers keep a handle on it
pub fn router_with_state(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let wizard_routes = Router::new()
        .route("/", post(wizard::create_wizard))
        .route("/:id", get(wizard::get_wizard))
        .route("/:id/answers", axum::routing::patch(wizard::update_answers))
        .route("/:id/advance", post(wizard::advance))
        .route("/:id/retreat", post(wizard::retreat))
        .route(
            "/:id/branch",
            post(wizard::open_branch).delete(wizard::close_branch),
        )
        .route("/:id/route", get(wizard::preview_route));

    let api_routes = Router::new()
        .nest("/wizards", wizard_routes)
        .layer(axum_middleware::from_fn(request_log_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
