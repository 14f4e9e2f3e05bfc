//! # Calibration
//!
//! Converts one radiocarbon determination into a calibrated probability
//! curve over calendar years.
//!
//! For each curve record `(t, f_t, sigma_t)` the relative density is
//!
//! ```text
//! sigma_sum = sigma_m² + sigma_t²
//! P(t)      = exp(-(f_m - f_t)² / (2 · sigma_sum)) / sqrt(sigma_sum)
//! ```
//!
//! (Bronk Ramsey 2008, doi:10.1111/j.1475-4754.2008.00394.x). Points whose
//! density does not exceed the probability floor are dropped.

use crate::curve::CalibrationCurve;
use crate::primitives::DEFAULT_PROBABILITY_FLOOR;
use crate::{CalError, CalendarScale, Determination, ProbabilityPoint};
use serde::{Deserialize, Serialize};

/// Relative calibration density of a determination against one curve point.
///
/// Symmetric in its two `(mean, sigma)` operands.
#[must_use]
pub fn calibration_density(f_m: f64, sigma_m: f64, f_t: f64, sigma_t: f64) -> f64 {
    let sigma_sum = sigma_m.powi(2) + sigma_t.powi(2);
    (-(f_m - f_t).powi(2) / (2.0 * sigma_sum)).exp() / sigma_sum.sqrt()
}

// =============================================================================
// PROBABILITY CURVE
// =============================================================================

/// Calibrated probability curve: `(calendar year, relative density)` pairs
/// in the order of the source curve records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilityCurve {
    points: Vec<ProbabilityPoint>,
}

impl ProbabilityCurve {
    /// Build a curve from raw points.
    #[must_use]
    pub fn new(points: Vec<ProbabilityPoint>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[ProbabilityPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all densities.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.probability).sum()
    }

    /// Smallest and largest calendar year, `None` when empty.
    #[must_use]
    pub fn year_span(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), p| (lo.min(p.year), hi.max(p.year)),
        ))
    }

    /// Smallest and largest density, `None` when empty.
    #[must_use]
    pub fn density_span(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), p| (lo.min(p.probability), hi.max(p.probability)),
        ))
    }

    /// The point with the highest density (first one on ties).
    #[must_use]
    pub fn mode(&self) -> Option<ProbabilityPoint> {
        self.points
            .iter()
            .copied()
            .reduce(|best, p| if p.probability > best.probability { p } else { best })
    }

    /// Copy of the curve with every year converted from BP to `scale`.
    ///
    /// The conversion is an involution for `CalendarScale::Ad`: converting
    /// twice yields the original curve exactly.
    #[must_use]
    pub fn to_scale(&self, scale: CalendarScale) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| ProbabilityPoint::new(scale.convert(p.year), p.probability))
                .collect(),
        }
    }

    /// Copy of the points sorted by ascending calendar year.
    #[must_use]
    pub fn sorted_by_year(&self) -> Vec<ProbabilityPoint> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| a.year.total_cmp(&b.year));
        sorted
    }
}

// =============================================================================
// CALIBRATOR
// =============================================================================

/// Per-point calibration of determinations against a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrator {
    probability_floor: f64,
}

impl Default for Calibrator {
    fn default() -> Self {
        Self {
            probability_floor: DEFAULT_PROBABILITY_FLOOR,
        }
    }
}

impl Calibrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different negligible-density floor.
    ///
    /// Returns `CalError::Config` unless the floor is finite and non-negative.
    pub fn with_floor(probability_floor: f64) -> Result<Self, CalError> {
        if !probability_floor.is_finite() || probability_floor < 0.0 {
            return Err(CalError::Config(format!(
                "probability floor must be a non-negative number, got {}",
                probability_floor
            )));
        }
        Ok(Self { probability_floor })
    }

    #[must_use]
    pub fn probability_floor(&self) -> f64 {
        self.probability_floor
    }

    /// Calibrate a determination against every record of `curve`.
    ///
    /// Years are kept on the curve's own (BP) scale. The result may be empty
    /// if the determination falls far outside the curve.
    pub fn calibrate(
        &self,
        determination: &Determination,
        curve: &CalibrationCurve,
    ) -> Result<ProbabilityCurve, CalError> {
        determination.validate()?;

        let points = curve
            .points()
            .iter()
            .filter_map(|record| {
                let p = calibration_density(
                    determination.date,
                    determination.sigma,
                    record.radiocarbon,
                    record.error,
                );
                (p > self.probability_floor).then_some(ProbabilityPoint::new(record.year, p))
            })
            .collect();

        Ok(ProbabilityCurve::new(points))
    }
}

// =============================================================================
// TESTS
// =============================================================================
