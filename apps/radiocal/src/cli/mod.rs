//! # Radiocal CLI Module
//!
//! This module implements the CLI interface for Radiocal.
//!
//! ## Available Commands
//!
//! - `calibrate` - Calibrate one or more radiocarbon determinations
//! - `combine` - Pool determinations of the same event, optionally calibrating the result
//! - `curves` - List the calibration curves found in the curves directory
//! - `server` - Start the HTTP server

mod commands;
pub mod report;

use crate::config::RadiocalConfig;
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use radiocal_core::{CalError, CalendarScale, Determination};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Radiocal - radiocarbon calibration
///
/// Turns radiocarbon determinations into calibrated calendar date ranges
/// using a calibration curve.
#[derive(Parser, Debug)]
#[command(name = "radiocal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding `<name>.14c` calibration curves
    #[arg(short = 'C', long, global = true)]
    pub curves_dir: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check sample arguments clap cannot relate to each other.
    ///
    /// Failures are usage errors: `Error::exit` prints them with the usage
    /// line and exits with status 2.
    pub fn validate(&self) -> Result<(), clap::Error> {
        let samples = match &self.command {
            Some(Commands::Calibrate { samples, .. } | Commands::Combine { samples, .. }) => {
                samples
            }
            _ => return Ok(()),
        };
        match samples.count_mismatch() {
            Some(message) => Err(clap::Error::raw(
                ErrorKind::WrongNumberOfValues,
                format!("{}\n", message),
            )
            .format(&mut Cli::command())),
            None => Ok(()),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calibrate radiocarbon determinations
    Calibrate {
        #[command(flatten)]
        samples: SampleArgs,

        #[command(flatten)]
        curve: CurveArgs,
    },

    /// Pool determinations of the same event
    Combine {
        #[command(flatten)]
        samples: SampleArgs,

        /// Calibrate the pooled determination
        #[arg(long)]
        calibrate: bool,

        #[command(flatten)]
        curve: CurveArgs,
    },

    /// List available calibration curves
    Curves,

    /// Start HTTP server
    Server {
        /// Host to bind to [default: from configuration]
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to [default: from configuration]
        #[arg(short, long)]
        port: Option<u16>,
    },
}

/// Repeated `-d DATE -s SIGMA [--id ID]` sample triples.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Radiocarbon age BP (repeatable)
    #[arg(short = 'd', long = "date", required = true, allow_negative_numbers = true)]
    pub dates: Vec<f64>,

    /// One-sigma error of the matching date (repeatable)
    #[arg(short = 's', long = "sigma", required = true, allow_negative_numbers = true)]
    pub sigmas: Vec<f64>,

    /// Sample identifier of the matching date (repeatable)
    #[arg(long = "id")]
    pub ids: Vec<String>,
}

impl SampleArgs {
    /// Describe a mismatch between the number of dates, sigmas and ids.
    #[must_use]
    pub fn count_mismatch(&self) -> Option<String> {
        if self.dates.len() != self.sigmas.len() {
            return Some(format!(
                "{} dates but {} sigmas given",
                self.dates.len(),
                self.sigmas.len()
            ));
        }
        if self.ids.len() > self.dates.len() {
            return Some(format!(
                "{} ids given for {} dates",
                self.ids.len(),
                self.dates.len()
            ));
        }
        None
    }

    /// Zip dates, sigmas and ids into determinations.
    ///
    /// Ids may be omitted from the end; missing ones become `sample-<n>`.
    pub fn determinations(&self) -> Result<Vec<Determination>, CalError> {
        if let Some(message) = self.count_mismatch() {
            return Err(CalError::InvalidDetermination(message));
        }

        Ok(self
            .dates
            .iter()
            .zip(&self.sigmas)
            .enumerate()
            .map(|(i, (&date, &sigma))| {
                let id = self
                    .ids
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("sample-{}", i + 1));
                Determination::new(date, sigma, id)
            })
            .collect())
    }
}

/// Curve selection and output scale.
#[derive(Args, Debug, Clone)]
pub struct CurveArgs {
    /// Calibration curve name [default: from configuration]
    #[arg(short, long)]
    pub curve: Option<String>,

    /// Express calibrated dates in BC/AD
    #[arg(long, conflicts_with = "bp")]
    pub ad: bool,

    /// Express calibrated dates in cal BP (default)
    #[arg(long)]
    pub bp: bool,

    /// Use the curve records as stored, without 1-year resampling
    #[arg(long)]
    pub no_interpolate: bool,
}

impl CurveArgs {
    #[must_use]
    pub fn scale(&self) -> CalendarScale {
        CalendarScale::from_bp(!self.ad)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CalError> {
    let mut config = RadiocalConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.curves_dir {
        config.curves_dir = dir;
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Calibrate { samples, curve }) => {
            cmd_calibrate(&config, json_mode, &samples, &curve)
        }
        Some(Commands::Combine {
            samples,
            calibrate,
            curve,
        }) => cmd_combine(&config, json_mode, &samples, calibrate, &curve),
        Some(Commands::Curves) => cmd_curves(&config, json_mode),
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config).await
        }
        None => {
            // No subcommand - list curves by default
            cmd_curves(&config, json_mode)
        }
    }
}
