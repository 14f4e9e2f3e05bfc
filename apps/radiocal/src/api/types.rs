//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use radiocal_core::{
    CalError, CalendarScale, CalibrationReport, Determination, PooledDetermination,
};
use serde::{Deserialize, Serialize};

/// Upper bound on determinations accepted by one request.
pub const MAX_DETERMINATIONS: usize = 1000;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// CURVES RESPONSE
// =============================================================================

/// Available calibration curves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvesResponse {
    pub success: bool,
    pub curves: Vec<String>,
    pub default_curve: String,
    pub error: Option<String>,
}

impl CurvesResponse {
    pub fn success(curves: Vec<String>, default_curve: impl Into<String>) -> Self {
        Self {
            success: true,
            curves,
            default_curve: default_curve.into(),
            error: None,
        }
    }

    pub fn error(default_curve: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            curves: Vec::new(),
            default_curve: default_curve.into(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// DETERMINATIONS
// =============================================================================

/// A determination as submitted by clients. `id` is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterminationJson {
    pub date: f64,
    pub sigma: f64,
    #[serde(default)]
    pub id: Option<String>,
}

/// Convert submitted determinations, naming unlabelled ones `sample-<n>`.
///
/// Rejects empty and oversized lists and invalid values at the API
/// boundary, before anything is calibrated.
pub fn to_determinations(items: &[DeterminationJson]) -> Result<Vec<Determination>, CalError> {
    if items.is_empty() {
        return Err(CalError::EmptyInput);
    }
    if items.len() > MAX_DETERMINATIONS {
        return Err(CalError::InvalidDetermination(format!(
            "{} determinations exceed the maximum of {}",
            items.len(),
            MAX_DETERMINATIONS
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let id = item
                .id
                .clone()
                .unwrap_or_else(|| format!("sample-{}", i + 1));
            let determination = Determination::new(item.date, item.sigma, id);
            determination.validate()?;
            Ok(determination)
        })
        .collect()
}

// =============================================================================
// CALIBRATE REQUEST/RESPONSE
// =============================================================================

/// Calibration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrateRequest {
    /// Curve name; the server default when absent.
    #[serde(default)]
    pub curve: Option<String>,
    pub determinations: Vec<DeterminationJson>,
    /// Report BC/AD years instead of cal BP.
    #[serde(default)]
    pub ad: bool,
}

impl CalibrateRequest {
    #[must_use]
    pub fn scale(&self) -> CalendarScale {
        CalendarScale::from_bp(!self.ad)
    }
}

/// Calibration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrateResponse {
    pub success: bool,
    pub results: Vec<CalibrationReport>,
    pub error: Option<String>,
}

impl CalibrateResponse {
    pub fn success(results: Vec<CalibrationReport>) -> Self {
        Self {
            success: true,
            results,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// COMBINE REQUEST/RESPONSE
// =============================================================================

/// Pooling request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineRequest {
    pub determinations: Vec<DeterminationJson>,
    #[serde(default)]
    pub curve: Option<String>,
    /// Also calibrate the pooled determination.
    #[serde(default)]
    pub calibrate: bool,
    #[serde(default)]
    pub ad: bool,
}

impl CombineRequest {
    #[must_use]
    pub fn scale(&self) -> CalendarScale {
        CalendarScale::from_bp(!self.ad)
    }
}

/// Pooling response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineResponse {
    pub success: bool,
    pub pooled: Option<PooledDetermination>,
    pub calibrated: Option<CalibrationReport>,
    pub error: Option<String>,
}

impl CombineResponse {
    pub fn success(pooled: PooledDetermination, calibrated: Option<CalibrationReport>) -> Self {
        Self {
            success: true,
            pooled: Some(pooled),
            calibrated,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            pooled: None,
            calibrated: None,
            error: Some(msg.into()),
        }
    }
}
