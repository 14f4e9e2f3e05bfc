//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::report::{pooled_text, single_text};
use super::{CurveArgs, SampleArgs};
use crate::api::{self, AppState};
use crate::config::RadiocalConfig;
use radiocal_core::{
    CalError, CalibratedAge, CalibrationCurve, CalibrationReport, CurveStore, calibrate_batch,
    combine,
};
use std::sync::Arc;

// =============================================================================
// HELPERS
// =============================================================================

/// Curve store for one command, honoring `--no-interpolate`.
fn curve_store(config: &RadiocalConfig, curve: &CurveArgs) -> CurveStore {
    config
        .curve_store()
        .with_interpolation(config.interpolate && !curve.no_interpolate)
}

/// Load the requested curve, falling back to the configured default.
fn load_curve(
    config: &RadiocalConfig,
    curve: &CurveArgs,
) -> Result<Arc<CalibrationCurve>, CalError> {
    let name = curve.curve.as_deref().unwrap_or(&config.default_curve);
    let store = curve_store(config, curve);
    let cache_hit = store.cached(name).is_some();
    let loaded = store.load(name)?;

    tracing::info!(
        curve = name,
        title = loaded.title(),
        points = loaded.len(),
        interpolated = store.interpolates(),
        cache_hit,
        "Loaded calibration curve"
    );
    Ok(loaded)
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// CALIBRATE COMMAND
// =============================================================================

/// Calibrate every sample against one curve.
pub fn cmd_calibrate(
    config: &RadiocalConfig,
    json_mode: bool,
    samples: &SampleArgs,
    curve: &CurveArgs,
) -> Result<(), CalError> {
    let determinations = samples.determinations()?;
    let calibration_curve = load_curve(config, curve)?;
    let calibrator = config.calibrator()?;

    tracing::debug!(
        samples = determinations.len(),
        scale = %curve.scale(),
        "Calibrating"
    );
    let ages = calibrate_batch(
        &calibration_curve,
        &determinations,
        curve.scale(),
        &calibrator,
    )?;

    if json_mode {
        let reports: Vec<CalibrationReport> = ages.iter().map(CalibratedAge::report).collect();
        print_json(&serde_json::json!({ "results": reports }));
        return Ok(());
    }

    for age in &ages {
        println!("{}", single_text(age));
    }

    Ok(())
}

// =============================================================================
// COMBINE COMMAND
// =============================================================================

/// Pool the samples and optionally calibrate the pooled determination.
pub fn cmd_combine(
    config: &RadiocalConfig,
    json_mode: bool,
    samples: &SampleArgs,
    calibrate: bool,
    curve: &CurveArgs,
) -> Result<(), CalError> {
    let determinations = samples.determinations()?;
    let pooled = combine(&determinations)?;

    tracing::info!(
        sources = pooled.sources.len(),
        mean = pooled.mean(),
        error = pooled.error(),
        t = pooled.test_statistic,
        "Pooled determinations"
    );

    let calibrated = if calibrate {
        let calibration_curve = load_curve(config, curve)?;
        Some(CalibratedAge::new(
            calibration_curve,
            pooled.determination.clone(),
            curve.scale(),
            &config.calibrator()?,
        )?)
    } else {
        None
    };

    if json_mode {
        print_json(&serde_json::json!({
            "pooled": pooled,
            "calibrated": calibrated.as_ref().map(CalibratedAge::report),
        }));
        return Ok(());
    }

    println!("{}", pooled_text(&pooled));
    if let Some(age) = &calibrated {
        println!("{}", single_text(age));
    }

    Ok(())
}

// =============================================================================
// CURVES COMMAND
// =============================================================================

/// List curve names found in the curves directory.
pub fn cmd_curves(config: &RadiocalConfig, json_mode: bool) -> Result<(), CalError> {
    let names = config.curve_store().available()?;

    if json_mode {
        print_json(&serde_json::json!({
            "curves_dir": config.curves_dir.to_string_lossy(),
            "default_curve": config.default_curve,
            "curves": names,
        }));
        return Ok(());
    }

    println!("Calibration curves in {:?}", config.curves_dir);
    println!("==========================");
    if names.is_empty() {
        println!("(none found: add <name>.14c files)");
    }
    for name in &names {
        let marker = if *name == config.default_curve {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", name, marker);
    }

    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &RadiocalConfig) -> Result<(), CalError> {
    let state = AppState::new(
        config.curve_store(),
        config.calibrator()?,
        config.default_curve.clone(),
    );

    println!("Radiocal Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:          {}", config.server.host);
    println!("  Port:          {}", config.server.port);
    println!("  Curves:        {:?}", config.curves_dir);
    println!("  Default curve: {}", config.default_curve);
    println!();
    println!("Endpoints:");
    println!("  GET  /health    - Health check");
    println!("  GET  /curves    - List calibration curves");
    println!("  POST /calibrate - Calibrate determinations");
    println!("  POST /combine   - Pool determinations");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.bind_address(), state).await
}
