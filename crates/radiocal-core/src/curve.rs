//! # Calibration Curve
//!
//! Parsing and resampling of calibration curve resources.
//!
//! A curve resource is plain text:
//! - the first line is a comment carrying the curve title
//! - every other line containing `#` is a comment and is discarded
//! - data rows are `calendarYearBP, radiocarbonYearBP, radiocarbonError`
//!
//! Rows are stored most recent first (calendar year descending). Resampling
//! puts the curve on a 1-year grid so that probability sums downstream are
//! taken over evenly spaced years.

use crate::primitives::{COMMENT_MARKER, CURVE_FIELDS, FIELD_SEPARATOR, GRID_STEP, MAX_GRID_POINTS};
use crate::{CalError, CurvePoint};
use serde::{Deserialize, Serialize};

/// A calibration curve: a title plus an ordered sequence of records.
///
/// Immutable once built. Shared read-only (usually behind an `Arc`) by every
/// calibration that uses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    title: String,
    points: Vec<CurvePoint>,
}

impl CalibrationCurve {
    /// Build a curve from already parsed records.
    ///
    /// Returns `CalError::DegenerateCurve` if `points` is empty or any value
    /// is not finite.
    pub fn from_points(
        title: impl Into<String>,
        points: Vec<CurvePoint>,
    ) -> Result<Self, CalError> {
        if points.is_empty() {
            return Err(CalError::DegenerateCurve(
                "calibration curve has no data rows".to_string(),
            ));
        }
        if let Some(bad) = points.iter().find(|p| {
            !(p.year.is_finite() && p.radiocarbon.is_finite() && p.error.is_finite())
        }) {
            return Err(CalError::DegenerateCurve(format!(
                "non-finite curve record at year {}",
                bad.year
            )));
        }
        Ok(Self {
            title: title.into(),
            points,
        })
    }

    /// Parse a curve resource.
    ///
    /// The title is the first line with the comment marker and surrounding
    /// whitespace stripped. Blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, CalError> {
        let mut lines = text.lines().enumerate().peekable();

        let title = match lines.peek() {
            Some((_, first)) if first.contains(COMMENT_MARKER) => {
                let title = first
                    .trim()
                    .trim_matches(COMMENT_MARKER)
                    .trim()
                    .to_string();
                lines.next();
                title
            }
            _ => String::new(),
        };

        let mut points = Vec::new();
        for (index, line) in lines {
            if line.contains(COMMENT_MARKER) || line.trim().is_empty() {
                continue;
            }
            points.push(parse_row(line, index + 1)?);
        }

        Self::from_points(title, points)
    }

    /// Human-readable curve title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Curve records in stored order.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed curve; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest calendar year covered by the curve.
    #[must_use]
    pub fn year_range(&self) -> (f64, f64) {
        self.points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.year), hi.max(p.year))
            })
    }

    /// Resample the curve onto a contiguous 1-year grid.
    ///
    /// The grid starts at the smallest calendar year and steps up to the
    /// largest one, never beyond it. Radiocarbon mean and error are linearly
    /// interpolated between the neighbouring original records. The result is
    /// returned in descending calendar order, like curve files.
    ///
    /// Returns `CalError::DegenerateCurve` if the grid would exceed
    /// `MAX_GRID_POINTS`.
    pub fn resampled(&self) -> Result<Self, CalError> {
        let mut ascending = self.points.clone();
        ascending.sort_by(|a, b| a.year.total_cmp(&b.year));

        let (first, last) = match (ascending.first(), ascending.last()) {
            (Some(first), Some(last)) if ascending.len() > 1 => (first.year, last.year),
            _ => return Ok(self.clone()),
        };

        let span = ((last - first) / GRID_STEP).floor();
        if span >= MAX_GRID_POINTS as f64 {
            return Err(CalError::DegenerateCurve(format!(
                "year span {}..{} exceeds {} grid points",
                first, last, MAX_GRID_POINTS
            )));
        }
        let steps = span as usize;
        let mut grid = Vec::with_capacity(steps + 1);
        let mut segment = 0;

        for step in 0..=steps {
            let year = first + step as f64 * GRID_STEP;

            // Grid years increase monotonically, so the segment only moves forward.
            while segment + 2 < ascending.len() && ascending[segment + 1].year < year {
                segment += 1;
            }

            let lower = ascending[segment];
            let upper = ascending[segment + 1];
            grid.push(CurvePoint::new(
                year,
                lerp(lower.year, lower.radiocarbon, upper.year, upper.radiocarbon, year),
                lerp(lower.year, lower.error, upper.year, upper.error, year),
            ));
        }

        grid.reverse();

        Ok(Self {
            title: self.title.clone(),
            points: grid,
        })
    }
}

/// Parse one `year, radiocarbon, error` data row.
fn parse_row(line: &str, line_number: usize) -> Result<CurvePoint, CalError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();

    if fields.len() != CURVE_FIELDS {
        return Err(CalError::CurveFormat {
            line: line_number,
            reason: format!(
                "expected {} fields, found {}",
                CURVE_FIELDS,
                fields.len()
            ),
        });
    }

    let mut values = [0.0_f64; CURVE_FIELDS];
    for (slot, field) in values.iter_mut().zip(&fields) {
        let value = field.parse::<f64>().map_err(|_| CalError::CurveFormat {
            line: line_number,
            reason: format!("'{}' is not a number", field),
        })?;
        if !value.is_finite() {
            return Err(CalError::CurveFormat {
                line: line_number,
                reason: format!("'{}' is not a finite number", field),
            });
        }
        *slot = value;
    }

    Ok(CurvePoint::new(values[0], values[1], values[2]))
}

/// Linear interpolation of `y` at `x` between `(x0, y0)` and `(x1, y1)`.
fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

// =============================================================================
// TESTS
// =============================================================================
