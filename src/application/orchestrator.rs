//! # Pipeline Orchestrator
//!
//! Sequences the export-and-publish pipeline: query to CSV artifact,
//! optional gzip stage, then the atomic remote publish. Stages run strictly
//! in order, the first fault aborts the remainder of the run, and every
//! milestone is logged so an operator can tell from the log alone which
//! stage failed.

use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use crate::application::publisher;
use crate::compress;
use crate::config::AppConfig;
use crate::domain::errors::Result;
use crate::ports::extraction::ExtractionPort;
use crate::ports::remote_store::RemoteConnector;

/// Outcome of one successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: u64,
    pub bytes: u64,
    pub remote_path: String,
    pub duration_secs: f64,
}

/// Drives one export run end to end through the injected ports.
pub struct Orchestrator {
    extraction: Box<dyn ExtractionPort>,
    connector: Box<dyn RemoteConnector>,
    config: AppConfig,
}

impl Orchestrator {
    pub fn new(
        extraction: Box<dyn ExtractionPort>,
        connector: Box<dyn RemoteConnector>,
        config: AppConfig,
    ) -> Self {
        Self {
            extraction,
            connector,
            config,
        }
    }

    /// Runs the full pipeline once. Local and remote paths are computed
    /// before any stage starts.
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let out_dir = Path::new(&self.config.output.directory);
        fs::create_dir_all(out_dir)?;
        let csv_path = out_dir.join(&self.config.output.csv_name);

        info!("Step 1: SQL -> CSV ({})", csv_path.display());
        let stats = self
            .extraction
            .extract(&self.config.query.sql_text, &csv_path)?;
        info!(
            "Exported {} rows (~{:.2} MB uncompressed) in {:.2}s",
            stats.rows,
            stats.bytes as f64 / (1024.0 * 1024.0),
            stats.duration_secs
        );

        let (artifact, remote_name) = match &self.config.output.gzip_name {
            Some(gz_name) => {
                let gz_path = out_dir.join(gz_name);
                info!("Step 2: CSV -> GZIP ({})", gz_path.display());
                compress::gzip_file(&csv_path, &gz_path)?;
                (gz_path, gz_name.clone())
            }
            None => (csv_path.clone(), self.config.output.csv_name.clone()),
        };

        let paths = publisher::plan(&self.config.ftp.remote_dir, &remote_name);
        info!(
            "Step 3: publishing to {}:{} ({})",
            self.config.ftp.host,
            self.config.ftp.port,
            if self.config.ftp.use_ftps {
                "explicit FTPS"
            } else {
                "plain FTP"
            }
        );

        let mut store = self.connector.connect()?;
        let published = publisher::publish(store.as_mut(), &artifact, &paths);
        // Best-effort close on both exit paths; a close failure never
        // replaces the publish outcome.
        if let Err(e) = store.disconnect() {
            warn!("Disconnect failed: {}", e);
        }
        published?;

        info!("Publish complete: {}", paths.dest);
        Ok(RunSummary {
            rows: stats.rows,
            bytes: stats.bytes,
            remote_path: paths.dest,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}
