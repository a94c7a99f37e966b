//! I/O operations for benchmark results.
//!
//! This module reads the results record written by the benchmark program
//! and turns filesystem and parser failures into [`LoadError`]s.

use crate::error::LoadError;
use crate::result::ResultsRecord;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Default results file, relative to the working directory.
pub const RESULTS_FILE: &str = "benchmark_results.json";

/// Read and validate a results record from a JSON file.
///
/// # Errors
///
/// - [`LoadError::NotFound`] if `path` does not exist.
/// - [`LoadError::Malformed`] if the content is not JSON of the expected
///   shape or breaks a numeric invariant.
/// - [`LoadError::Io`] for any other read failure.
pub fn load_results(path: impl AsRef<Path>) -> Result<ResultsRecord, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let record: ResultsRecord =
        serde_json::from_str(&content).map_err(|e| LoadError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    record.validate().map_err(|invalid| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: invalid.to_string(),
    })?;

    debug!(
        path = %path.display(),
        simple = record.search_simple.len(),
        regex = record.search_regex.len(),
        recommendations = record.recommendations.len(),
        "Results record loaded"
    );

    Ok(record)
}
