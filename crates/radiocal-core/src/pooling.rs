//! # Pooling
//!
//! Combination of several radiocarbon determinations believed to date the
//! same event into one inverse-variance weighted determination.
//!
//! - pooled mean  = Σ(mean_i / sigma_i²) / Σ(1 / sigma_i²)
//! - pooled error = sqrt(1 / Σ(1 / sigma_i²))
//! - T            = Σ((mean_i - pooled mean)² / sigma_i²)
//!
//! `T` is reported, not judged: comparing it with a chi-square critical
//! value for `n - 1` degrees of freedom is up to the caller.

use crate::{CalError, Determination};
use serde::{Deserialize, Serialize};

/// A determination derived from several others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledDetermination {
    /// The pooled determination; its id names the inputs and `T`.
    pub determination: Determination,
    /// Chi-square-like homogeneity statistic.
    pub test_statistic: f64,
    /// `n - 1` for `n` inputs.
    pub degrees_of_freedom: usize,
    /// Ids of the combined determinations, in input order.
    pub sources: Vec<String>,
}

impl PooledDetermination {
    /// Pooled mean.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.determination.date
    }

    /// Pooled one-sigma error.
    #[must_use]
    pub fn error(&self) -> f64 {
        self.determination.sigma
    }
}

/// Combine determinations of the same event.
///
/// A single determination pools to itself (same id) with `T = 0`.
///
/// # Errors
/// - `CalError::EmptyInput` if `determinations` is empty
/// - `CalError::InvalidDetermination` if any input fails validation
pub fn combine(determinations: &[Determination]) -> Result<PooledDetermination, CalError> {
    if determinations.is_empty() {
        return Err(CalError::EmptyInput);
    }
    for determination in determinations {
        determination.validate()?;
    }

    let sources: Vec<String> = determinations.iter().map(|d| d.id.clone()).collect();

    if let [single] = determinations {
        return Ok(PooledDetermination {
            determination: single.clone(),
            test_statistic: 0.0,
            degrees_of_freedom: 0,
            sources,
        });
    }

    let weight_sum: f64 = determinations.iter().map(|d| 1.0 / d.sigma.powi(2)).sum();
    let weighted_sum: f64 = determinations
        .iter()
        .map(|d| d.date / d.sigma.powi(2))
        .sum();

    let mean = weighted_sum / weight_sum;
    let error = (1.0 / weight_sum).sqrt();
    let test_statistic: f64 = determinations
        .iter()
        .map(|d| (d.date - mean).powi(2) / d.sigma.powi(2))
        .sum();

    let id = format!("Pooled({}) T={:.3}", sources.join(", "), test_statistic);

    Ok(PooledDetermination {
        determination: Determination::new(mean, error, id),
        test_statistic,
        degrees_of_freedom: determinations.len() - 1,
        sources,
    })
}

// =============================================================================
// TESTS
// =============================================================================
