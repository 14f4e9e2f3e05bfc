//! # radiocal-core
//!
//! The radiocarbon calibration engine for Radiocal - THE MATH.
//!
//! This crate turns a radiocarbon determination (mean ± sigma, in
//! uncalibrated years BP) into a probability distribution over calendar
//! years, and summarizes it with Highest Posterior Density intervals.
//!
//! ## Pipeline
//!
//! ```text
//! CurveStore ──▶ Calibrator ──▶ hpd (intervals, coverage) ──▶ CalibratedAge
//!                    ▲
//!   pooling::combine ┘  (a pooled determination re-enters the pipeline)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure: no I/O once a curve is loaded, no async, no terminal output
//! - Explicit: every tunable is a parameter, nothing is read from the
//!   process environment
//! - Shareable: curves are immutable and handed out as `Arc`s, so
//!   independent samples can be calibrated concurrently

// =============================================================================
// MODULES
// =============================================================================

pub mod age;
pub mod calibration;
pub mod curve;
pub mod hpd;
pub mod pooling;
pub mod primitives;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CalError, CalendarScale, ConfidenceInterval, CurvePoint, Determination, ProbabilityPoint,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use age::{CalibratedAge, CalibrationReport, calibrate_batch, common_year_span};
pub use calibration::{Calibrator, ProbabilityCurve, calibration_density};
pub use curve::CalibrationCurve;
pub use hpd::{confidence_intervals, coverage_percent, hpd_intervals};
pub use pooling::{PooledDetermination, combine};
pub use store::{CurveSource, CurveStore, DirectorySource, MemorySource};

// =============================================================================
// RE-EXPORTS: Constants
// =============================================================================

pub use primitives::{ALPHA_68, ALPHA_95, BP_EPOCH, DEFAULT_PROBABILITY_FLOOR};
