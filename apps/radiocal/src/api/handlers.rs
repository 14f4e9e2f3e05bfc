//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Calibration is CPU-bound, so the calibrate and combine handlers run it
//! on the blocking thread pool.

use super::{
    AppState,
    types::{
        CalibrateRequest, CalibrateResponse, CombineRequest, CombineResponse, CurvesResponse,
        HealthResponse, to_determinations,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use radiocal_core::{CalError, CalibratedAge, calibrate_batch, combine};

/// HTTP status for a failed request.
///
/// Storage failures are server errors; everything else is the client's input.
fn status_for(error: &CalError) -> StatusCode {
    match error {
        CalError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CURVES HANDLER
// =============================================================================

/// List available calibration curves.
pub async fn curves_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.available() {
        Ok(names) => (
            StatusCode::OK,
            Json(CurvesResponse::success(names, state.default_curve.to_string())),
        ),
        Err(e) => {
            tracing::error!("Listing curves failed: {}", e);
            (
                status_for(&e),
                Json(CurvesResponse::error(
                    state.default_curve.to_string(),
                    format!("Listing curves failed: {}", e),
                )),
            )
        }
    }
}

// =============================================================================
// CALIBRATE HANDLER
// =============================================================================

/// Calibrate determinations.
pub async fn calibrate_handler(
    State(state): State<AppState>,
    Json(request): Json<CalibrateRequest>,
) -> impl IntoResponse {
    let determinations = match to_determinations(&request.determinations) {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CalibrateResponse::error(format!("Invalid determinations: {}", e))),
            );
        }
    };

    let scale = request.scale();
    let name = state.curve_name(request.curve.as_deref());

    let job = tokio::task::spawn_blocking(move || -> Result<_, CalError> {
        let curve = state.load_curve(&name)?;
        calibrate_batch(&curve, &determinations, scale, &state.calibrator)
    });

    match job.await {
        Ok(Ok(ages)) => {
            tracing::debug!(samples = ages.len(), "Calibrated");
            let reports = ages.iter().map(CalibratedAge::report).collect();
            (StatusCode::OK, Json(CalibrateResponse::success(reports)))
        }
        Ok(Err(e)) => (
            status_for(&e),
            Json(CalibrateResponse::error(format!("Calibration failed: {}", e))),
        ),
        Err(e) => {
            tracing::error!("Calibration task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CalibrateResponse::error("Calibration task failed")),
            )
        }
    }
}

// =============================================================================
// COMBINE HANDLER
// =============================================================================

/// Pool determinations, optionally calibrating the pooled result.
pub async fn combine_handler(
    State(state): State<AppState>,
    Json(request): Json<CombineRequest>,
) -> impl IntoResponse {
    let determinations = match to_determinations(&request.determinations) {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(CombineResponse::error(format!("Invalid determinations: {}", e))),
            );
        }
    };

    let pooled = match combine(&determinations) {
        Ok(p) => p,
        Err(e) => {
            return (
                status_for(&e),
                Json(CombineResponse::error(format!("Pooling failed: {}", e))),
            );
        }
    };

    if !request.calibrate {
        return (StatusCode::OK, Json(CombineResponse::success(pooled, None)));
    }

    let scale = request.scale();
    let name = state.curve_name(request.curve.as_deref());
    let determination = pooled.determination.clone();

    let job = tokio::task::spawn_blocking(move || -> Result<_, CalError> {
        let curve = state.load_curve(&name)?;
        CalibratedAge::new(curve, determination, scale, &state.calibrator)
    });

    match job.await {
        Ok(Ok(age)) => (
            StatusCode::OK,
            Json(CombineResponse::success(pooled, Some(age.report()))),
        ),
        Ok(Err(e)) => (
            status_for(&e),
            Json(CombineResponse::error(format!("Calibration failed: {}", e))),
        ),
        Err(e) => {
            tracing::error!("Calibration task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CombineResponse::error("Calibration task failed")),
            )
        }
    }
}
