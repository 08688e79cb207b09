//! # Leadflow HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Per-stage lead counts
//! - `POST /leads` - Create a lead
//! - `GET /leads?stage=` - List leads
//! - `GET /leads/{id}` - Fetch a lead
//! - `PATCH /leads/{id}/stage` - Change a lead's stage
//! - `POST /leads/{id}/analyze` - Score a lead
//! - `POST /leads/{id}/activity` - Record a contact activity
//! - `GET /leads/{id}/sale` - Sale opened for a transferred lead
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `LEADFLOW_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `LEADFLOW_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `LEADFLOW_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use handlers::status_for;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    CreateLeadRequest, HealthResponse, LeadJson, LeadListResponse, LeadResponse, ListQuery,
    SaleJson, SaleResponse, StageUpdateRequest, StatusResponse,
};

use crate::config::DEFAULT_RATE_LIMIT;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use leadflow_core::{LeadError, LeadService};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KB). Lead payloads are tiny.
const MAX_BODY_BYTES: usize = 64 * 1024;

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::OPTIONS];

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RwLock<LeadService>>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
}

impl AppState {
    /// Create app state around a service with the default rate limit.
    #[must_use]
    pub fn new(service: LeadService) -> Self {
        Self {
            service: Arc::new(RwLock::new(service)),
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }

    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit = requests_per_second;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from `LEADFLOW_CORS_ORIGINS`.
///
/// - `*`: all origins
/// - unset: localhost only
/// - otherwise: comma-separated list of origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("LEADFLOW_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (LEADFLOW_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in LEADFLOW_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(ALLOWED_METHODS)
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No LEADFLOW_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if `LEADFLOW_API_KEY` is set)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limiter = if state.rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", state.rate_limit);
        Some(create_rate_limiter(state.rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set LEADFLOW_API_KEY to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route(
            "/leads",
            post(handlers::create_lead_handler).get(handlers::list_leads_handler),
        )
        .route("/leads/{id}", get(handlers::get_lead_handler))
        .route("/leads/{id}/stage", patch(handlers::update_stage_handler))
        .route("/leads/{id}/analyze", post(handlers::analyze_handler))
        .route("/leads/{id}/activity", post(handlers::activity_handler))
        .route("/leads/{id}/sale", get(handlers::sale_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind `addr` and serve until shutdown.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), LeadError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| LeadError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Leadflow HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LeadError::IoError(format!("Server error: {}", e)))
}

/// Resolve on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
