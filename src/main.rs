//! # Export Publisher
//!
//! A periodic batch utility that executes one configured SQL query, streams
//! the result set into a canonical CSV artifact (optionally gzip-compressed),
//! and publishes it to an FTP(S) server with a crash-safe two-phase upload:
//! the artifact is uploaded under a temporary `.part` name and then renamed
//! onto its final name, so consumers never observe a half-written file.
//!
//! Exit code 0 on full success, 1 on any fault. Re-running after a failure
//! is always safe; the publish protocol is idempotent.

pub mod application;
pub mod compress;
pub mod config;
pub mod csv_writer;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::process;

use crate::application::orchestrator::Orchestrator;
use crate::config::{AppConfig, CliArgs};
use crate::infrastructure::ftp::FtpConnector;
use crate::infrastructure::postgres::PostgresExtractionAdapter;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();

    let mut config = match AppConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            process::exit(1);
        }
    };
    config.merge_cli(&args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    }

    let password = match config.ftp.resolve_password() {
        Ok(p) => p,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let extraction = Box::new(PostgresExtractionAdapter::new(
        config.sql.connection_string.clone(),
        config.sql.command_timeout_secs,
    ));
    let connector = Box::new(FtpConnector::new(config.ftp.clone(), password));

    let orchestrator = Orchestrator::new(extraction, connector, config);

    info!("Starting export run...");
    match orchestrator.run() {
        Ok(summary) => {
            info!(
                "Run finished: {} rows published to {} in {:.2}s",
                summary.rows, summary.remote_path, summary.duration_secs
            );
        }
        Err(e) => {
            error!("Run failed: {}", e);
            process::exit(1);
        }
    }
}
