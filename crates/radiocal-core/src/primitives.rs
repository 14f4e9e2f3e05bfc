//! # Calibration Constants
//!
//! Fixed values used across the calibration pipeline.
//!
//! Some of these are conventions (the BP epoch, the 1-sigma/2-sigma tail
//! probabilities). Others are arbitrary tunables with no physical meaning
//! (the probability floor, the display headroom) and can be overridden by
//! callers.

/// Reference year of the Before Present scale (1950 CE).
pub const BP_EPOCH: f64 = 1950.0;

/// Calibrated densities at or below this value are dropped.
///
/// Only keeps the calibrated curve small. It is not a statistical
/// threshold; `Calibrator::with_floor` overrides it.
pub const DEFAULT_PROBABILITY_FLOOR: f64 = 1e-9;

/// Tail probability excluded by the 68.2% HPD intervals.
pub const ALPHA_68: f64 = 0.318;

/// Tail probability excluded by the 95.4% HPD intervals.
pub const ALPHA_95: f64 = 0.046;

/// Marker that starts a comment line in curve files.
pub const COMMENT_MARKER: char = '#';

/// Field separator of curve data rows.
pub const FIELD_SEPARATOR: char = ',';

/// Number of fields in a curve data row.
pub const CURVE_FIELDS: usize = 3;

/// File extension of curve resources (`<name>.14c`).
pub const CURVE_EXTENSION: &str = "14c";

/// Step of the resampled calendar grid, in years.
pub const GRID_STEP: f64 = 1.0;

/// Largest number of points a resampled curve may hold.
///
/// Published curves span about 55 000 calendar years; a wider span means a
/// mistyped year in the curve file.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Multiplier applied to the peak density to get an upper display bound.
///
/// Arbitrary: leaves room above the curve for interval bars.
pub const DISPLAY_HEADROOM: f64 = 2.0;
