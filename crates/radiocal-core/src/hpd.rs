//! # Highest Posterior Density
//!
//! Interval extraction and coverage for calibrated probability curves.
//!
//! HPD intervals are chosen by density rank, not by cutting symmetric tails:
//! 1. rank points by density, highest first
//! 2. walk the normalized cumulative sum until it reaches `1 - alpha`
//! 3. the density at that rank is the threshold; every year strictly above
//!    it belongs to the HPD set
//! 4. the HPD set is split into contiguous runs over the calendar grid, and
//!    each run contributes one `(start, end)` pair
//!
//! A multimodal calibrated curve (common with the wiggles of the
//! calibration curve) therefore yields several disjoint intervals. Coverage
//! is approximate: the set is discrete, so the mass actually covered is
//! reported next to each interval by [`coverage_percent`].

use crate::calibration::ProbabilityCurve;
use crate::{CalError, ConfidenceInterval, ProbabilityPoint};

/// Check that `alpha` is a usable excluded tail probability.
fn validate_alpha(alpha: f64) -> Result<(), CalError> {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(CalError::InvalidAlpha(alpha))
    }
}

/// Total mass of `points`, rejecting empty or massless curves.
fn positive_total(points: &[ProbabilityPoint]) -> Result<f64, CalError> {
    let total: f64 = points.iter().map(|p| p.probability).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(CalError::DegenerateCurve(format!(
            "total probability is {}",
            total
        )));
    }
    Ok(total)
}

/// Density above which a year belongs to the HPD set for `alpha`.
fn density_threshold(points: &[ProbabilityPoint], total: f64, alpha: f64) -> f64 {
    let mut ranked: Vec<f64> = points.iter().map(|p| p.probability).collect();
    ranked.sort_by(|a, b| b.total_cmp(a));

    let target = 1.0 - alpha;
    let mut cumulative = 0.0;
    let mut index = ranked.len() - 1;
    for (i, p) in ranked.iter().enumerate() {
        cumulative += p;
        if cumulative / total >= target {
            index = i;
            break;
        }
    }
    ranked[index]
}

/// Group ascending boundary years into `(start, end)` pairs.
///
/// An odd number of boundaries means a run was opened and never closed;
/// that is reported instead of dropping the unmatched year.
pub fn pair_boundaries(boundaries: &[f64]) -> Result<Vec<(f64, f64)>, CalError> {
    if boundaries.len() % 2 != 0 {
        return Err(CalError::DegenerateCurve(format!(
            "odd number of interval boundaries ({})",
            boundaries.len()
        )));
    }
    Ok(boundaries
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect())
}

/// Extract HPD year ranges excluding a tail probability of `alpha`.
///
/// `alpha = 0.046` gives the ~95.4% intervals, `alpha = 0.318` the ~68.2%
/// ones. Ranges are returned in ascending calendar order as `(start, end)`
/// with `start <= end`; a single isolated year yields `(year, year)`.
/// When the years tied at the highest density already hold `1 - alpha` of
/// the mass, those years form the HPD set.
///
/// # Errors
/// - `CalError::InvalidAlpha` if `alpha` is not strictly between 0 and 1
/// - `CalError::DegenerateCurve` if the curve has fewer than 2 points, no
///   mass, or is flat (every year at the same density)
pub fn hpd_intervals(curve: &ProbabilityCurve, alpha: f64) -> Result<Vec<(f64, f64)>, CalError> {
    validate_alpha(alpha)?;

    if curve.len() < 2 {
        return Err(CalError::DegenerateCurve(format!(
            "need at least 2 points, got {}",
            curve.len()
        )));
    }

    let total = positive_total(curve.points())?;
    let threshold = density_threshold(curve.points(), total, alpha);

    let grid = curve.sorted_by_year();
    let mut inside: Vec<bool> = grid.iter().map(|p| p.probability > threshold).collect();

    // The top tie group alone reaches `1 - alpha`: it is the HPD set.
    if !inside.iter().any(|&selected| selected) {
        if grid.iter().all(|p| p.probability == threshold) {
            return Err(CalError::DegenerateCurve(
                "flat curve has no highest density region".to_string(),
            ));
        }
        inside = grid.iter().map(|p| p.probability >= threshold).collect();
    }

    let mut boundaries = Vec::new();
    for (i, point) in grid.iter().enumerate() {
        if !inside[i] {
            continue;
        }
        let previous_inside = i > 0 && inside[i - 1];
        let next_inside = i + 1 < inside.len() && inside[i + 1];

        // A run opens where the previous grid year is outside the set and
        // closes where the next one is. Interior years are neither.
        if !previous_inside {
            boundaries.push(point.year);
        }
        if !next_inside {
            boundaries.push(point.year);
        }
    }

    pair_boundaries(&boundaries)
}

/// Fraction of the curve's total mass that falls inside `interval`.
///
/// Endpoints may be given in either order. Each endpoint is located by its
/// insertion index in the ascending year grid, and every grid point between
/// the two indices (inclusive) is summed. The caller's curve is never
/// modified.
///
/// # Errors
/// `CalError::DegenerateCurve` if the curve is empty, has no mass, or the
/// interval lies entirely outside its year range.
pub fn coverage_percent(interval: (f64, f64), curve: &ProbabilityCurve) -> Result<f64, CalError> {
    if curve.is_empty() {
        return Err(CalError::DegenerateCurve("empty curve".to_string()));
    }

    let grid = curve.sorted_by_year();
    let total = positive_total(&grid)?;

    let (lo, hi) = (interval.0.min(interval.1), interval.0.max(interval.1));
    let first = grid[0].year;
    let last = grid[grid.len() - 1].year;
    if hi < first || lo > last {
        return Err(CalError::DegenerateCurve(format!(
            "interval {}..{} lies outside the curve range {}..{}",
            lo, hi, first, last
        )));
    }

    let a = grid.partition_point(|p| p.year < interval.0);
    let b = grid.partition_point(|p| p.year < interval.1);
    let from = a.min(b);
    let to = a.max(b).min(grid.len() - 1);

    Ok(grid[from..=to].iter().map(|p| p.probability / total).sum())
}

/// HPD intervals for `alpha`, each annotated with its actual coverage.
pub fn confidence_intervals(
    curve: &ProbabilityCurve,
    alpha: f64,
) -> Result<Vec<ConfidenceInterval>, CalError> {
    hpd_intervals(curve, alpha)?
        .into_iter()
        .map(|(a, b)| Ok(ConfidenceInterval::new(a, b, coverage_percent((a, b), curve)?)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{ALPHA_68, ALPHA_95};

    fn curve_from(points: &[(f64, f64)]) -> ProbabilityCurve {
        ProbabilityCurve::new(
            points
                .iter()
                .map(|&(year, p)| ProbabilityPoint::new(year, p))
                .collect(),
        )
    }

    /// Two separated peaks on a 20-year grid.
    fn bimodal() -> ProbabilityCurve {
        let mut points = Vec::new();
        for year in 0..20 {
            let y = year as f64;
            let p = (-(y - 4.0).powi(2) / 2.0).exp() + 0.8 * (-(y - 15.0).powi(2) / 2.0).exp();
            points.push((y, p));
        }
        curve_from(&points)
    }

    #[test]
    fn single_peak_gives_one_interval() {
        let curve = curve_from(&[(100.0, 0.9394), (101.0, 1.0), (102.0, 0.9394)]);
        let intervals = hpd_intervals(&curve, 0.5).expect("hpd");
        assert_eq!(intervals, vec![(101.0, 101.0)]);
    }

    #[test]
    fn bimodal_curve_gives_two_intervals() {
        let curve = bimodal();
        let intervals = hpd_intervals(&curve, ALPHA_95).expect("hpd");

        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].0 <= 4.0 && 4.0 <= intervals[0].1);
        assert!(intervals[1].0 <= 15.0 && 15.0 <= intervals[1].1);
        assert!(intervals[0].1 < intervals[1].0);
    }

    #[test]
    fn intervals_ignore_input_order() {
        let curve = bimodal();
        let mut reversed = curve.points().to_vec();
        reversed.reverse();
        let reversed = ProbabilityCurve::new(reversed);

        assert_eq!(
            hpd_intervals(&curve, ALPHA_68).expect("hpd"),
            hpd_intervals(&reversed, ALPHA_68).expect("hpd")
        );
    }

    #[test]
    fn wider_level_covers_more_mass() {
        let curve = bimodal();
        let narrow: f64 = confidence_intervals(&curve, ALPHA_68)
            .expect("68")
            .iter()
            .map(|i| i.coverage)
            .sum();
        let wide: f64 = confidence_intervals(&curve, ALPHA_95)
            .expect("95")
            .iter()
            .map(|i| i.coverage)
            .sum();

        assert!(wide >= narrow);
        assert!((0.9..=1.0 + 1e-12).contains(&wide));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let single = curve_from(&[(1.0, 1.0)]);
        assert!(matches!(
            hpd_intervals(&single, ALPHA_95),
            Err(CalError::DegenerateCurve(_))
        ));

        let massless = curve_from(&[(1.0, 0.0), (2.0, 0.0)]);
        assert!(matches!(
            hpd_intervals(&massless, ALPHA_95),
            Err(CalError::DegenerateCurve(_))
        ));

        let flat = curve_from(&[(1.0, 0.5), (2.0, 0.5), (3.0, 0.5)]);
        assert!(matches!(
            hpd_intervals(&flat, ALPHA_95),
            Err(CalError::DegenerateCurve(_))
        ));
    }

    #[test]
    fn top_tie_group_holding_the_mass_is_the_interval() {
        let curve = curve_from(&[(1.0, 1.0), (2.0, 1.0), (3.0, 0.1), (4.0, 0.1)]);

        assert_eq!(hpd_intervals(&curve, ALPHA_68).expect("hpd"), vec![(1.0, 2.0)]);

        let intervals = confidence_intervals(&curve, ALPHA_68).expect("intervals");
        assert!((intervals[0].coverage - 2.0 / 2.2).abs() < 1e-12);
    }

    #[test]
    fn separated_tie_groups_give_separate_intervals() {
        let curve = curve_from(&[(1.0, 1.0), (2.0, 0.01), (3.0, 1.0), (4.0, 0.01)]);
        assert_eq!(
            hpd_intervals(&curve, ALPHA_68).expect("hpd"),
            vec![(1.0, 1.0), (3.0, 3.0)]
        );
    }

    #[test]
    fn alpha_must_be_a_probability() {
        let curve = bimodal();
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                hpd_intervals(&curve, alpha),
                Err(CalError::InvalidAlpha(_))
            ));
        }
    }

    #[test]
    fn odd_boundary_count_is_an_error() {
        assert!(matches!(
            pair_boundaries(&[1.0, 5.0, 9.0]),
            Err(CalError::DegenerateCurve(_))
        ));
        assert_eq!(
            pair_boundaries(&[1.0, 5.0, 9.0, 12.0]).expect("pairs"),
            vec![(1.0, 5.0), (9.0, 12.0)]
        );
    }

    #[test]
    fn coverage_of_full_range_is_one() {
        let curve = bimodal();
        let total = coverage_percent((0.0, 19.0), &curve).expect("coverage");
        assert!((total - 1.0).abs() < 1e-12);

        let swapped = coverage_percent((19.0, 0.0), &curve).expect("coverage");
        assert!((swapped - total).abs() < 1e-15);
    }

    #[test]
    fn coverage_of_single_year() {
        let curve = curve_from(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)]);
        let share = coverage_percent((2.0, 2.0), &curve).expect("coverage");
        assert!((share - 0.5).abs() < 1e-12);
    }

    #[test]
    fn coverage_outside_range_is_degenerate() {
        let curve = curve_from(&[(1.0, 1.0), (2.0, 2.0), (3.0, 1.0)]);
        assert!(matches!(
            coverage_percent((10.0, 20.0), &curve),
            Err(CalError::DegenerateCurve(_))
        ));
        assert!(matches!(
            coverage_percent((-5.0, 0.5), &curve),
            Err(CalError::DegenerateCurve(_))
        ));
    }

    #[test]
    fn coverage_does_not_touch_curve() {
        let curve = bimodal();
        let before = curve.clone();
        let _ = coverage_percent((3.0, 6.0), &curve).expect("coverage");
        assert_eq!(curve, before);
    }
}
