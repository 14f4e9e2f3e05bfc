//! # Calibrated Age
//!
//! One calibrated sample: the determination, the curve it was calibrated
//! against, the calibrated probability curve on the requested calendar
//! scale, and the standard 68.2% / 95.4% HPD interval sets.
//!
//! Construction is the only place where calibration, BP to BC/AD
//! conversion and interval extraction are composed. A built age is
//! immutable and can be read by any number of consumers at once.

use crate::calibration::{Calibrator, ProbabilityCurve};
use crate::curve::CalibrationCurve;
use crate::hpd::confidence_intervals;
use crate::primitives::{ALPHA_68, ALPHA_95, DISPLAY_HEADROOM};
use crate::{CalError, CalendarScale, ConfidenceInterval, CurvePoint, Determination};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A radiocarbon determination calibrated against a curve.
#[derive(Debug, Clone)]
pub struct CalibratedAge {
    determination: Determination,
    curve: Arc<CalibrationCurve>,
    scale: CalendarScale,
    probabilities: ProbabilityCurve,
    intervals68: Vec<ConfidenceInterval>,
    intervals95: Vec<ConfidenceInterval>,
}

impl CalibratedAge {
    /// Calibrate `determination` against `curve` and extract its intervals.
    ///
    /// # Errors
    /// - `CalError::InvalidDetermination` for an unusable determination
    /// - `CalError::DegenerateCurve` if the calibrated curve is too small or
    ///   carries no mass (e.g. the date lies far outside the curve)
    pub fn new(
        curve: Arc<CalibrationCurve>,
        determination: Determination,
        scale: CalendarScale,
        calibrator: &Calibrator,
    ) -> Result<Self, CalError> {
        let probabilities = calibrator
            .calibrate(&determination, &curve)?
            .to_scale(scale);

        let intervals68 = confidence_intervals(&probabilities, ALPHA_68)?;
        let intervals95 = confidence_intervals(&probabilities, ALPHA_95)?;

        Ok(Self {
            determination,
            curve,
            scale,
            probabilities,
            intervals68,
            intervals95,
        })
    }

    #[must_use]
    pub fn determination(&self) -> &Determination {
        &self.determination
    }

    /// The calibration curve used (BP years, as loaded).
    #[must_use]
    pub fn curve(&self) -> &Arc<CalibrationCurve> {
        &self.curve
    }

    #[must_use]
    pub fn scale(&self) -> CalendarScale {
        self.scale
    }

    /// Calibrated probability curve on `self.scale()`.
    #[must_use]
    pub fn probabilities(&self) -> &ProbabilityCurve {
        &self.probabilities
    }

    /// 68.2% HPD intervals.
    #[must_use]
    pub fn intervals68(&self) -> &[ConfidenceInterval] {
        &self.intervals68
    }

    /// 95.4% HPD intervals.
    #[must_use]
    pub fn intervals95(&self) -> &[ConfidenceInterval] {
        &self.intervals95
    }

    /// Earliest and latest calibrated year.
    #[must_use]
    pub fn year_span(&self) -> (f64, f64) {
        // Non-empty: interval extraction succeeded during construction.
        self.probabilities.year_span().unwrap_or((0.0, 0.0))
    }

    /// Label for the calendar axis.
    ///
    /// `"BP"` on the BP scale. On the BC/AD scale: `"BC"` or `"AD"` when the
    /// whole calibrated span is on one side of year 0, `"BC/AD"` otherwise.
    #[must_use]
    pub fn scale_label(&self) -> &'static str {
        match self.scale {
            CalendarScale::Bp => "BP",
            CalendarScale::Ad => {
                let (min, max) = self.year_span();
                if min < 0.0 && max > 0.0 {
                    "BC/AD"
                } else if max <= 0.0 {
                    "BC"
                } else {
                    "AD"
                }
            }
        }
    }

    /// Lower and upper density bounds for display.
    ///
    /// The upper bound leaves `DISPLAY_HEADROOM` times the peak density.
    #[must_use]
    pub fn density_bounds(&self) -> (f64, f64) {
        let (min, max) = self.probabilities.density_span().unwrap_or((0.0, 0.0));
        (min, max * DISPLAY_HEADROOM)
    }

    /// The calibration curve with its years converted to `self.scale()`.
    #[must_use]
    pub fn display_curve(&self) -> Vec<CurvePoint> {
        self.curve
            .points()
            .iter()
            .map(|p| CurvePoint::new(self.scale.convert(p.year), p.radiocarbon, p.error))
            .collect()
    }

    /// Serializable snapshot for text, JSON and plotting consumers.
    #[must_use]
    pub fn report(&self) -> CalibrationReport {
        let (year_min, year_max) = self.year_span();
        CalibrationReport {
            determination: self.determination.clone(),
            curve_title: self.curve.title().to_string(),
            scale: self.scale,
            scale_label: self.scale_label().to_string(),
            year_min,
            year_max,
            intervals68: self.intervals68.clone(),
            intervals95: self.intervals95.clone(),
            probabilities: self.probabilities.clone(),
        }
    }
}

/// Plain-data view of a [`CalibratedAge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub determination: Determination,
    pub curve_title: String,
    pub scale: CalendarScale,
    pub scale_label: String,
    pub year_min: f64,
    pub year_max: f64,
    pub intervals68: Vec<ConfidenceInterval>,
    pub intervals95: Vec<ConfidenceInterval>,
    pub probabilities: ProbabilityCurve,
}

/// Calendar span shared by several ages, `None` for an empty slice.
///
/// Used to put several samples on one common axis.
#[must_use]
pub fn common_year_span(ages: &[CalibratedAge]) -> Option<(f64, f64)> {
    ages.iter().map(CalibratedAge::year_span).reduce(|(lo, hi), (min, max)| {
        (lo.min(min), hi.max(max))
    })
}

/// Calibrate many determinations against one shared curve, in parallel.
///
/// Results keep the input order. The first failing determination aborts
/// the batch with its error.
pub fn calibrate_batch(
    curve: &Arc<CalibrationCurve>,
    determinations: &[Determination],
    scale: CalendarScale,
    calibrator: &Calibrator,
) -> Result<Vec<CalibratedAge>, CalError> {
    determinations
        .par_iter()
        .map(|d| CalibratedAge::new(Arc::clone(curve), d.clone(), scale, calibrator))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Linear synthetic curve: radiocarbon age equals calendar age.
    fn linear_curve() -> Arc<CalibrationCurve> {
        let points = (0..=3000)
            .rev()
            .map(|year| CurvePoint::new(year as f64, year as f64, 10.0))
            .collect();
        Arc::new(CalibrationCurve::from_points("Linear", points).expect("curve"))
    }

    #[test]
    fn age_holds_both_interval_sets() {
        let age = CalibratedAge::new(
            linear_curve(),
            Determination::new(1500.0, 30.0, "S1"),
            CalendarScale::Bp,
            &Calibrator::new(),
        )
        .expect("age");

        assert_eq!(age.intervals68().len(), 1);
        assert_eq!(age.intervals95().len(), 1);

        let i68 = age.intervals68()[0];
        let i95 = age.intervals95()[0];
        assert!(i68.contains(1500.0) && i95.contains(1500.0));
        assert!(i95.width() > i68.width());
        assert!(i95.coverage > i68.coverage);
        assert_eq!(age.scale_label(), "BP");
        assert_eq!(age.curve().title(), "Linear");
    }

    #[test]
    fn ad_scale_converts_curve_and_intervals() {
        let age = CalibratedAge::new(
            linear_curve(),
            Determination::new(1500.0, 30.0, "S1"),
            CalendarScale::Ad,
            &Calibrator::new(),
        )
        .expect("age");

        // 1500 BP = AD 450
        assert!(age.intervals68()[0].contains(450.0));
        assert_eq!(age.scale_label(), "AD");

        let display = age.display_curve();
        assert_eq!(display[0].year, 1950.0 - 3000.0);
        assert_eq!(display[0].radiocarbon, 3000.0);
    }

    #[test]
    fn scale_label_follows_year_sign() {
        let bc = CalibratedAge::new(
            linear_curve(),
            Determination::new(2500.0, 20.0, "bc"),
            CalendarScale::Ad,
            &Calibrator::new(),
        )
        .expect("age");
        assert_eq!(bc.scale_label(), "BC");

        let straddling = CalibratedAge::new(
            linear_curve(),
            Determination::new(1950.0, 40.0, "zero"),
            CalendarScale::Ad,
            &Calibrator::new(),
        )
        .expect("age");
        assert_eq!(straddling.scale_label(), "BC/AD");
    }

    #[test]
    fn far_date_is_degenerate() {
        let result = CalibratedAge::new(
            linear_curve(),
            Determination::new(40000.0, 50.0, "far"),
            CalendarScale::Bp,
            &Calibrator::new(),
        );
        assert!(matches!(result, Err(CalError::DegenerateCurve(_))));
    }

    #[test]
    fn density_bounds_leave_headroom() {
        let age = CalibratedAge::new(
            linear_curve(),
            Determination::new(1000.0, 25.0, "b"),
            CalendarScale::Bp,
            &Calibrator::new(),
        )
        .expect("age");
        let (lo, hi) = age.density_bounds();
        let peak = age.probabilities().mode().expect("mode").probability;
        assert!(lo > 0.0);
        assert!((hi - 2.0 * peak).abs() < 1e-15);
    }

    #[test]
    fn batch_preserves_order_and_shares_curve() {
        let curve = linear_curve();
        let determinations: Vec<Determination> = [500.0, 1200.0, 2200.0]
            .iter()
            .enumerate()
            .map(|(i, &date)| Determination::new(date, 25.0, format!("S{}", i)))
            .collect();

        let ages = calibrate_batch(&curve, &determinations, CalendarScale::Bp, &Calibrator::new())
            .expect("batch");

        assert_eq!(ages.len(), 3);
        for (age, det) in ages.iter().zip(&determinations) {
            assert_eq!(age.determination(), det);
            assert!(Arc::ptr_eq(age.curve(), &curve));
        }

        let (lo, hi) = common_year_span(&ages).expect("span");
        assert!(lo < 500.0 && hi > 2200.0);
        assert!(common_year_span(&[]).is_none());
    }

    #[test]
    fn batch_reports_first_error() {
        let curve = linear_curve();
        let determinations = vec![
            Determination::new(500.0, 25.0, "ok"),
            Determination::new(500.0, 0.0, "bad"),
        ];
        let result = calibrate_batch(&curve, &determinations, CalendarScale::Bp, &Calibrator::new());
        assert!(matches!(result, Err(CalError::InvalidDetermination(_))));
    }

    #[test]
    fn report_mirrors_age() {
        let age = CalibratedAge::new(
            linear_curve(),
            Determination::new(1500.0, 30.0, "S1"),
            CalendarScale::Ad,
            &Calibrator::new(),
        )
        .expect("age");
        let report = age.report();

        assert_eq!(report.curve_title, "Linear");
        assert_eq!(report.scale, CalendarScale::Ad);
        assert_eq!(report.scale_label, "AD");
        assert_eq!(report.intervals95, age.intervals95());
        assert_eq!(report.probabilities.len(), age.probabilities().len());
        assert_eq!((report.year_min, report.year_max), age.year_span());
    }
}
