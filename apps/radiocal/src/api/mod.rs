//! # Radiocal HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /curves` - List available calibration curves
//! - `POST /calibrate` - Calibrate determinations
//! - `POST /combine` - Pool determinations, optionally calibrating the result
//!
//! ## Configuration (Environment Variables)
//!
//! - `RADIOCAL_CORS_ORIGINS`: Comma-separated list of allowed origins (default: any origin)

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `radiocal::api::*`)
pub use handlers::{calibrate_handler, combine_handler, curves_handler, health_handler};
pub use types::{
    CalibrateRequest, CalibrateResponse, CombineRequest, CombineResponse, CurvesResponse,
    DeterminationJson, HealthResponse, MAX_DETERMINATIONS, to_determinations,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use radiocal_core::{CalError, CalibrationCurve, Calibrator, CurveStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB).
const MAX_BODY_BYTES: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the curve store and calibration settings.
///
/// Loaded curves are cached in the store and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CurveStore>,
    pub calibrator: Calibrator,
    pub default_curve: Arc<str>,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(
        store: CurveStore,
        calibrator: Calibrator,
        default_curve: impl Into<String>,
    ) -> Self {
        let default_curve: String = default_curve.into();
        Self {
            store: Arc::new(store),
            calibrator,
            default_curve: Arc::from(default_curve),
        }
    }

    /// The requested curve name, or the default one.
    #[must_use]
    pub fn curve_name(&self, requested: Option<&str>) -> String {
        requested.unwrap_or(&self.default_curve).to_string()
    }

    /// Load a curve through the shared cache, logging hit or miss.
    pub fn load_curve(&self, name: &str) -> Result<Arc<CalibrationCurve>, CalError> {
        let cache_hit = self.store.cached(name).is_some();
        let curve = self.store.load(name)?;

        tracing::debug!(
            curve = name,
            title = curve.title(),
            points = curve.len(),
            cache_hit,
            "Loaded calibration curve"
        );
        Ok(curve)
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Origins listed in a `RADIOCAL_CORS_ORIGINS` value.
///
/// Empty for an unset value or `*`. Unparseable entries are skipped.
fn parse_origins(origins: Option<&str>) -> Vec<HeaderValue> {
    let Some(list) = origins.filter(|list| list.trim() != "*") else {
        return Vec::new();
    };
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the CORS layer from a `RADIOCAL_CORS_ORIGINS` value.
///
/// Any origin may call the API unless a list of origins narrows it down.
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    let allowed = parse_origins(origins);

    if allowed.is_empty() {
        tracing::info!("CORS: Allowing all origins");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
    }

    tracing::info!("CORS: Allowing {} configured origin(s)", allowed.len());
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
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
pub fn create_router(state: AppState) -> Router {
    let origins = std::env::var("RADIOCAL_CORS_ORIGINS").ok();
    let cors = build_cors_layer(origins.as_deref());

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/curves", get(handlers::curves_handler))
        .route("/calibrate", post(handlers::calibrate_handler))
        .route("/combine", post(handlers::combine_handler))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), CalError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CalError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Radiocal HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| CalError::Io(format!("Server error: {}", e)))
}
