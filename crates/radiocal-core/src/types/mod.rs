//! # Core Type Definitions
//!
//! This module contains the value types shared by every stage of the
//! calibration pipeline:
//! - Radiocarbon input (`Determination`)
//! - Calendar conventions (`CalendarScale`)
//! - Curve and probability samples (`CurvePoint`, `ProbabilityPoint`)
//! - Output structures (`ConfidenceInterval`)
//! - Error types (`CalError`)
//!
//! All types are plain immutable records. Anything that needs to change
//! (e.g. switching BP to BC/AD) is rebuilt, never mutated in place.

use crate::primitives::BP_EPOCH;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// RADIOCARBON DETERMINATION
// =============================================================================

/// A measured radiocarbon age with its one-sigma uncertainty.
///
/// `date` and `sigma` are expressed in uncalibrated radiocarbon years BP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Determination {
    /// Conventional radiocarbon age (BP).
    pub date: f64,
    /// One-standard-deviation uncertainty, strictly positive.
    pub sigma: f64,
    /// Free-text sample label.
    pub id: String,
}

impl Determination {
    /// Create a new determination.
    #[must_use]
    pub fn new(date: f64, sigma: f64, id: impl Into<String>) -> Self {
        Self {
            date,
            sigma,
            id: id.into(),
        }
    }

    /// Check that the determination can be calibrated or pooled.
    ///
    /// Returns `CalError::InvalidDetermination` if the date is not finite or
    /// the uncertainty is not a finite, strictly positive number.
    pub fn validate(&self) -> Result<(), CalError> {
        if !self.date.is_finite() {
            return Err(CalError::InvalidDetermination(format!(
                "{}: date must be finite, got {}",
                self.id, self.date
            )));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(CalError::InvalidDetermination(format!(
                "{}: sigma must be positive, got {}",
                self.id, self.sigma
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Determination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ± {} BP", self.id, self.date, self.sigma)
    }
}

// =============================================================================
// CALENDAR SCALE
// =============================================================================

/// Calendar direction requested for calibrated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarScale {
    /// Calibrated years Before Present (1950 CE).
    #[default]
    Bp,
    /// Signed BC/AD calendar years (negative = BC).
    Ad,
}

impl CalendarScale {
    /// Pick the scale from the usual "BP output?" switch.
    #[must_use]
    pub const fn from_bp(bp: bool) -> Self {
        if bp { Self::Bp } else { Self::Ad }
    }

    /// Convert a calibrated BP year into this scale.
    ///
    /// The AD conversion is `1950 - year`, which is its own inverse:
    /// applying it twice returns the original value.
    #[must_use]
    pub fn convert(self, bp_year: f64) -> f64 {
        match self {
            Self::Bp => bp_year,
            Self::Ad => BP_EPOCH - bp_year,
        }
    }

    /// Short name of the scale.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bp => "BP",
            Self::Ad => "BC/AD",
        }
    }
}

impl fmt::Display for CalendarScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// CURVE SAMPLES
// =============================================================================

/// One row of a calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Calendar year (BP in curve files).
    pub year: f64,
    /// Expected radiocarbon age at that calendar year.
    pub radiocarbon: f64,
    /// One-sigma uncertainty of the radiocarbon age.
    pub error: f64,
}

impl CurvePoint {
    /// Create a new curve point.
    #[must_use]
    pub const fn new(year: f64, radiocarbon: f64, error: f64) -> Self {
        Self {
            year,
            radiocarbon,
            error,
        }
    }
}

/// One sample of a calibrated probability curve.
///
/// Probabilities are unnormalized relative densities: only ratios and
/// cumulative sums carry meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPoint {
    pub year: f64,
    pub probability: f64,
}

impl ProbabilityPoint {
    #[must_use]
    pub const fn new(year: f64, probability: f64) -> Self {
        Self { year, probability }
    }
}

// =============================================================================
// CONFIDENCE INTERVAL
// =============================================================================

/// A calendar range with the share of probability mass it actually covers.
///
/// `start <= end` always holds regardless of the order the bracket years
/// were found in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub start: f64,
    pub end: f64,
    /// Covered fraction of the total mass, in `[0, 1]`.
    pub coverage: f64,
}

impl ConfidenceInterval {
    /// Create an interval from two bracket years in either order.
    #[must_use]
    pub fn new(a: f64, b: f64, coverage: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
            coverage,
        }
    }

    /// Covered fraction as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.coverage * 100.0
    }

    /// Number of calendar years spanned.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    /// Check whether a calendar year lies inside the interval.
    #[must_use]
    pub fn contains(&self, year: f64) -> bool {
        self.start <= year && year <= self.end
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the calibration pipeline.
///
/// Every variant is a deterministic validation failure: none of them is
/// worth retrying with the same input.
#[derive(Debug, Error)]
pub enum CalError {
    /// The named calibration curve could not be resolved.
    #[error("Calibration curve not found: {0}")]
    CurveNotFound(String),

    /// A curve data row is not three comma-separated numbers.
    #[error("Malformed curve data at line {line}: {reason}")]
    CurveFormat { line: usize, reason: String },

    /// The radiocarbon determination cannot be used (e.g. sigma <= 0).
    #[error("Invalid determination: {0}")]
    InvalidDetermination(String),

    /// A probability curve is empty, carries no mass, or yields malformed intervals.
    #[error("Degenerate curve: {0}")]
    DegenerateCurve(String),

    /// The excluded tail probability is outside the open interval (0, 1).
    #[error("Invalid alpha: {0} (must lie strictly between 0 and 1)")]
    InvalidAlpha(f64),

    /// Pooling was requested with no determinations.
    #[error("Cannot combine an empty set of determinations")]
    EmptyInput,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// The configuration is malformed.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determination_rejects_non_positive_sigma() {
        let zero = Determination::new(1000.0, 0.0, "zero");
        assert!(matches!(
            zero.validate(),
            Err(CalError::InvalidDetermination(_))
        ));

        let negative = Determination::new(1000.0, -5.0, "negative");
        assert!(negative.validate().is_err());
    }

    #[test]
    fn determination_rejects_nan() {
        let nan = Determination::new(f64::NAN, 20.0, "nan");
        assert!(nan.validate().is_err());

        let nan_sigma = Determination::new(1000.0, f64::NAN, "nan-sigma");
        assert!(nan_sigma.validate().is_err());
    }

    #[test]
    fn determination_display() {
        let d = Determination::new(1000.0, 30.0, "OxA-1");
        assert_eq!(d.to_string(), "OxA-1: 1000 ± 30 BP");
    }

    #[test]
    fn scale_conversion_is_an_involution() {
        for year in [-3000.5, 0.0, 1.0, 1950.0, 12345.0] {
            let once = CalendarScale::Ad.convert(year);
            assert_eq!(CalendarScale::Ad.convert(once), year);
            assert_eq!(CalendarScale::Bp.convert(year), year);
        }
    }

    #[test]
    fn scale_conversion_matches_epoch() {
        assert_eq!(CalendarScale::Ad.convert(0.0), 1950.0);
        assert_eq!(CalendarScale::Ad.convert(2000.0), -50.0);
        assert_eq!(CalendarScale::from_bp(true), CalendarScale::Bp);
        assert_eq!(CalendarScale::from_bp(false), CalendarScale::Ad);
    }

    #[test]
    fn interval_orders_endpoints() {
        let interval = ConfidenceInterval::new(1200.0, 1100.0, 0.5);
        assert_eq!(interval.start, 1100.0);
        assert_eq!(interval.end, 1200.0);
        assert_eq!(interval.width(), 100.0);
        assert!(interval.contains(1150.0));
        assert!(!interval.contains(1201.0));
        assert!((interval.percent() - 50.0).abs() < 1e-12);
    }
}
