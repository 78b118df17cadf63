//! # Extraction Port
//!
//! Contract for the data source side of the pipeline: execute the configured
//! query exactly once and stream the result set into a local CSV artifact.

use std::path::Path;

use crate::domain::errors::Result;

/// Outcome statistics for one extraction.
#[derive(Debug, Default, Clone)]
pub struct ExtractionStats {
    /// Data rows written (the header line is not counted).
    pub rows: u64,
    /// Approximate uncompressed payload bytes, field text plus separators.
    pub bytes: u64,
    pub duration_secs: f64,
}

/// Anything that can turn a query into a CSV artifact on local disk.
///
/// Implementations must stream: one row materialized at a time, in result
/// order, without holding the full set in memory. On failure the partially
/// written destination is left behind; the orchestrator treats any failed
/// run as "destination must not be trusted".
pub trait ExtractionPort {
    fn extract(&self, query: &str, dest: &Path) -> Result<ExtractionStats>;
}
