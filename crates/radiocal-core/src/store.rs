//! # Curve Store
//!
//! Resolution and caching of named calibration curves.
//!
//! - `CurveSource` maps a curve name to raw resource text
//! - `DirectorySource` reads `<root>/<name>.14c` files
//! - `MemorySource` serves curves held in memory
//! - `CurveStore` parses, optionally resamples, and caches curves so each
//!   distinct name is loaded once per process

use crate::curve::CalibrationCurve;
use crate::primitives::CURVE_EXTENSION;
use crate::CalError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

// =============================================================================
// CURVE SOURCE TRAIT
// =============================================================================

/// Resolves curve names to raw curve text.
///
/// Implementations must be `Send + Sync`: a store is shared between
/// threads (batch calibration, HTTP handlers).
pub trait CurveSource: Send + Sync {
    /// Fetch the raw text of the named curve.
    ///
    /// Returns `CalError::CurveNotFound` if the name cannot be resolved.
    fn fetch(&self, name: &str) -> Result<String, CalError>;

    /// List the curve names this source can resolve, sorted.
    fn names(&self) -> Result<Vec<String>, CalError>;
}

/// Reject names that could escape the source's namespace.
fn validate_curve_name(name: &str) -> Result<(), CalError> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.chars().any(char::is_control)
    {
        return Err(CalError::CurveNotFound(name.to_string()));
    }
    Ok(())
}

// =============================================================================
// DIRECTORY SOURCE
// =============================================================================

/// Curves stored as `<name>.14c` files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source over the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory this source reads from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, CURVE_EXTENSION))
    }
}

impl CurveSource for DirectorySource {
    fn fetch(&self, name: &str) -> Result<String, CalError> {
        validate_curve_name(name)?;
        let path = self.path_for(name);

        if !path.is_file() {
            return Err(CalError::CurveNotFound(name.to_string()));
        }

        let bytes = std::fs::read(&path)
            .map_err(|e| CalError::Io(format!("Read curve '{}': {}", path.display(), e)))?;

        // Published curve files are not always UTF-8 (the classic ones are latin-1).
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn names(&self) -> Result<Vec<String>, CalError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            CalError::Io(format!(
                "Cannot list curves in '{}': {}",
                self.root.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CalError::Io(format!("Directory entry: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CURVE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// MEMORY SOURCE
// =============================================================================

/// Curves held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    curves: BTreeMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a curve.
    #[must_use]
    pub fn with_curve(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.curves.insert(name.into(), text.into());
        self
    }
}

impl CurveSource for MemorySource {
    fn fetch(&self, name: &str) -> Result<String, CalError> {
        self.curves
            .get(name)
            .cloned()
            .ok_or_else(|| CalError::CurveNotFound(name.to_string()))
    }

    fn names(&self) -> Result<Vec<String>, CalError> {
        Ok(self.curves.keys().cloned().collect())
    }
}

// =============================================================================
// CURVE STORE
// =============================================================================

/// Loads curves from a source and caches them for the rest of the run.
///
/// Cached curves are handed out as `Arc<CalibrationCurve>`: loading the
/// same name twice returns the same shared, read-only curve.
pub struct CurveStore {
    source: Box<dyn CurveSource>,
    interpolate: bool,
    cache: RwLock<BTreeMap<String, Arc<CalibrationCurve>>>,
}

impl std::fmt::Debug for CurveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveStore")
            .field("interpolate", &self.interpolate)
            .field("cached", &self.cached_names())
            .finish()
    }
}

impl CurveStore {
    /// Create a store over a source. Curves are resampled to a 1-year grid.
    #[must_use]
    pub fn new(source: impl CurveSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            interpolate: true,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Enable or disable resampling of loaded curves.
    #[must_use]
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    /// Whether loaded curves are resampled.
    #[must_use]
    pub fn interpolates(&self) -> bool {
        self.interpolate
    }

    /// Load a curve by name, parsing it on first use.
    pub fn load(&self, name: &str) -> Result<Arc<CalibrationCurve>, CalError> {
        if let Some(curve) = self.cached(name) {
            return Ok(curve);
        }

        let text = self.source.fetch(name)?;
        let parsed = CalibrationCurve::parse(&text)?;
        let curve = Arc::new(if self.interpolate {
            parsed.resampled()?
        } else {
            parsed
        });

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have loaded it meanwhile; keep the first copy.
        let entry = cache
            .entry(name.to_string())
            .or_insert_with(|| Arc::clone(&curve));
        Ok(Arc::clone(entry))
    }

    /// Return the cached curve, if already loaded.
    #[must_use]
    pub fn cached(&self, name: &str) -> Option<Arc<CalibrationCurve>> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.get(name).cloned()
    }

    /// Names of the curves loaded so far, sorted.
    #[must_use]
    pub fn cached_names(&self) -> Vec<String> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.keys().cloned().collect()
    }

    /// Curve names the underlying source can resolve.
    pub fn available(&self) -> Result<Vec<String>, CalError> {
        self.source.names()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE: &str = "# Tiny\n102,520,20\n100,500,20\n";

    #[test]
    fn memory_store_loads_and_resamples() {
        let store = CurveStore::new(MemorySource::new().with_curve("tiny", CURVE));
        let curve = store.load("tiny").expect("load");

        assert_eq!(curve.title(), "Tiny");
        assert_eq!(curve.len(), 3);
    }

    #[test]
    fn store_without_interpolation_keeps_rows() {
        let store = CurveStore::new(MemorySource::new().with_curve("tiny", CURVE))
            .with_interpolation(false);
        let curve = store.load("tiny").expect("load");

        assert_eq!(curve.len(), 2);
        assert!(!store.interpolates());
    }

    #[test]
    fn store_caches_shared_curve() {
        let store = CurveStore::new(MemorySource::new().with_curve("tiny", CURVE));
        assert!(store.cached("tiny").is_none());

        let first = store.load("tiny").expect("load");
        let second = store.load("tiny").expect("load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.cached_names(), vec!["tiny".to_string()]);
    }

    #[test]
    fn unknown_curve_is_not_found() {
        let store = CurveStore::new(MemorySource::new());
        let err = store.load("intcal99").expect_err("missing");
        assert!(matches!(err, CalError::CurveNotFound(name) if name == "intcal99"));
    }

    #[test]
    fn malformed_curve_is_not_cached() {
        let store = CurveStore::new(MemorySource::new().with_curve("bad", "# t\n1,2\n"));
        assert!(matches!(
            store.load("bad"),
            Err(CalError::CurveFormat { .. })
        ));
        assert!(store.cached("bad").is_none());
    }

    #[test]
    fn runaway_year_span_is_rejected() {
        let store =
            CurveStore::new(MemorySource::new().with_curve("typo", "# t\n1e19,0,5\n0,0,5\n"));
        assert!(matches!(
            store.load("typo"),
            Err(CalError::DegenerateCurve(_))
        ));
        assert!(store.cached("typo").is_none());

        let raw = CurveStore::new(MemorySource::new().with_curve("typo", "# t\n1e19,0,5\n0,0,5\n"))
            .with_interpolation(false);
        assert_eq!(raw.load("typo").expect("load").len(), 2);
    }

    #[test]
    fn directory_source_reads_curve_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("tiny.14c"), CURVE).expect("write");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let source = DirectorySource::new(dir.path());
        assert_eq!(source.names().expect("names"), vec!["tiny".to_string()]);

        let store = CurveStore::new(source);
        assert_eq!(store.load("tiny").expect("load").title(), "Tiny");
    }

    #[test]
    fn directory_source_accepts_latin1() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut bytes = b"# Curve \xb1 latin-1\n".to_vec();
        bytes.extend_from_slice(b"100,500,20\n");
        std::fs::write(dir.path().join("legacy.14c"), bytes).expect("write");

        let curve = CurveStore::new(DirectorySource::new(dir.path()))
            .load("legacy")
            .expect("load");
        assert_eq!(curve.len(), 1);
        assert!(curve.title().starts_with("Curve"));
    }

    #[test]
    fn directory_source_rejects_path_traversal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = DirectorySource::new(dir.path());

        for name in ["../etc/passwd", "a/b", "", "..", "x\\y"] {
            assert!(matches!(
                source.fetch(name),
                Err(CalError::CurveNotFound(_))
            ));
        }
    }

    #[test]
    fn directory_source_missing_directory_is_io_error() {
        let source = DirectorySource::new("/nonexistent/radiocal/curves");
        assert!(matches!(source.names(), Err(CalError::Io(_))));
        assert!(matches!(
            source.fetch("intcal20"),
            Err(CalError::CurveNotFound(_))
        ));
    }
}
