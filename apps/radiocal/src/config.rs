//! # Configuration
//!
//! Runtime settings for the CLI and the HTTP server.
//!
//! Precedence, lowest to highest:
//! 1. built-in defaults
//! 2. the TOML file (`--config <path>`, else `radiocal.toml` if present)
//! 3. `RADIOCAL_CURVES_DIR` / `RADIOCAL_CURVE` environment variables
//! 4. command-line flags (applied by the CLI)
//!
//! ```toml
//! curves_dir = "curves"
//! default_curve = "intcal20"
//! interpolate = true
//! probability_floor = 1e-9
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```

use radiocal_core::{
    CalError, Calibrator, CurveStore, DEFAULT_PROBABILITY_FLOOR, DirectorySource,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "radiocal.toml";

/// Environment variable overriding `curves_dir`.
pub const ENV_CURVES_DIR: &str = "RADIOCAL_CURVES_DIR";

/// Environment variable overriding `default_curve`.
pub const ENV_CURVE: &str = "RADIOCAL_CURVE";

// =============================================================================
// CONFIGURATION TYPES
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadiocalConfig {
    /// Directory holding `<name>.14c` curve files.
    pub curves_dir: PathBuf,
    /// Curve used when a request does not name one.
    pub default_curve: String,
    /// Resample curves onto a 1-year grid when loading.
    pub interpolate: bool,
    /// Densities at or below this value are dropped after calibration.
    pub probability_floor: f64,
    pub server: ServerConfig,
}

/// HTTP server bind settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RadiocalConfig {
    fn default() -> Self {
        Self {
            curves_dir: PathBuf::from("curves"),
            default_curve: "intcal20".to_string(),
            interpolate: true,
            probability_floor: DEFAULT_PROBABILITY_FLOOR,
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl RadiocalConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, CalError> {
        toml::from_str(text).map_err(|e| CalError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CalError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CalError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the configuration from file and process environment.
    ///
    /// An explicit path must exist. Without one, `radiocal.toml` in the
    /// working directory is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CalError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CURVES_DIR).filter(|v| !v.is_empty()) {
            self.curves_dir = PathBuf::from(dir);
        }
        if let Some(curve) = lookup(ENV_CURVE).filter(|v| !v.is_empty()) {
            self.default_curve = curve;
        }
        self
    }

    /// Calibrator honoring `probability_floor`.
    pub fn calibrator(&self) -> Result<Calibrator, CalError> {
        Calibrator::with_floor(self.probability_floor)
    }

    /// Curve store over `curves_dir`.
    #[must_use]
    pub fn curve_store(&self) -> CurveStore {
        CurveStore::new(DirectorySource::new(self.curves_dir.clone()))
            .with_interpolation(self.interpolate)
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
