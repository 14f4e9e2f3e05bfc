//! # radiocal
//!
//! Library half of the Radiocal binary: command-line interface, HTTP API
//! and configuration loading around `radiocal-core`.

pub mod api;
pub mod cli;
pub mod config;
