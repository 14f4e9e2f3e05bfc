//! # Radiocal - Radiocarbon Calibration
//!
//! The main binary for the Radiocal calibration engine.
//!
//! This application provides:
//! - CLI interface for calibrating and pooling determinations
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │             apps/radiocal (THE BINARY)          │
//! │                                                 │
//! │   ┌─────────────┐            ┌─────────────┐    │
//! │   │    CLI      │            │  HTTP API   │    │
//! │   │   (clap)    │            │   (axum)    │    │
//! │   └──────┬──────┘            └──────┬──────┘    │
//! │          └────────────┬─────────────┘           │
//! │                       ▼                         │
//! │               ┌───────────────┐                 │
//! │               │ radiocal-core │                 │
//! │               │  (THE MATH)   │                 │
//! │               └───────────────┘                 │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Calibrate two samples against IntCal20, BC/AD output
//! radiocal calibrate -d 7505 -s 93 --id P-769 -d 3150 -s 40 --ad
//!
//! # Pool three determinations and calibrate the result
//! radiocal combine -d 1000 -s 30 -d 1050 -s 50 -d 1020 -s 25 --calibrate
//!
//! # Start the HTTP server
//! radiocal server --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use radiocal::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();
    if let Err(e) = cli.validate() {
        e.exit();
    }

    // Initialize tracing. RADIOCAL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("RADIOCAL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "radiocal=debug,tower_http=debug"
    } else {
        "radiocal=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries reports only.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Radiocal startup banner.
fn print_banner() {
    println!(
        r#"
  Radiocal v{}
  Radiocarbon calibration
"#,
        env!("CARGO_PKG_VERSION")
    );
}
