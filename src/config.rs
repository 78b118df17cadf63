//! Application configuration: one immutable `AppConfig` value constructed at
//! the process boundary (file + CLI overrides + validation) and passed by
//! reference into the orchestrator. There is no ambient configuration state.

use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;

use crate::domain::errors::{ExportError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub sql: SqlConfig,
    pub ftp: FtpConfig,
    pub output: OutputConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SqlConfig {
    /// Opaque connection string handed to the database driver.
    pub connection_string: String,
    /// Per-statement timeout enforced on the session.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FtpConfig {
    pub host: String,
    #[serde(default = "default_ftp_port")]
    pub port: u16,
    pub user: String,
    /// Falls back to the FTP_PASSWORD environment variable when absent.
    pub password: Option<String>,
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
    /// Explicit FTPS when true, plain FTP when false.
    #[serde(default = "default_true")]
    pub use_ftps: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: String,
    pub csv_name: String,
    /// When set, the CSV is gzipped and the compressed file is what gets
    /// published; when absent the plain CSV is published.
    pub gzip_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    pub sql_text: String,
}

fn default_command_timeout() -> u64 {
    120
}
fn default_ftp_port() -> u16 {
    21
}
fn default_remote_dir() -> String {
    "/exports".to_string()
}
fn default_true() -> bool {
    true
}
fn default_connect_timeout() -> u64 {
    15
}
fn default_read_timeout() -> u64 {
    30
}
fn default_output_dir() -> String {
    "out".to_string()
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    // Overrides for ad-hoc runs
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub remote_dir: Option<String>,
    #[arg(short, long)]
    pub output_dir: Option<String>,
    #[arg(long)]
    pub csv_name: Option<String>,
    #[arg(long)]
    pub gzip_name: Option<String>,
    #[arg(long)]
    pub query: Option<String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ExportError::Config(format!("cannot open {}: {}", path, e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ExportError::Config(format!("cannot read {}: {}", path, e)))?;

        let config: AppConfig = if path.ends_with(".json") {
            serde_json::from_str(&contents)
                .map_err(|e| ExportError::Config(format!("invalid JSON in {}: {}", path, e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ExportError::Config(format!("invalid YAML in {}: {}", path, e)))?
        };

        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(h) = &args.host {
            self.ftp.host = h.clone();
        }
        if let Some(p) = args.port {
            self.ftp.port = p;
        }
        if let Some(u) = &args.user {
            self.ftp.user = u.clone();
        }
        if let Some(p) = &args.password {
            self.ftp.password = Some(p.clone());
        }
        if let Some(d) = &args.remote_dir {
            self.ftp.remote_dir = d.clone();
        }
        if let Some(o) = &args.output_dir {
            self.output.directory = o.clone();
        }
        if let Some(n) = &args.csv_name {
            self.output.csv_name = n.clone();
        }
        if let Some(n) = &args.gzip_name {
            self.output.gzip_name = Some(n.clone());
        }
        if let Some(q) = &args.query {
            self.query.sql_text = q.clone();
        }
    }

    /// Refuses to start when a required setting is missing.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.sql.connection_string.trim().is_empty() {
            missing.push("sql.connection_string");
        }
        if self.query.sql_text.trim().is_empty() {
            missing.push("query.sql_text");
        }
        if self.ftp.host.trim().is_empty() {
            missing.push("ftp.host");
        }
        if self.ftp.user.trim().is_empty() {
            missing.push("ftp.user");
        }
        if self.ftp.remote_dir.trim().is_empty() {
            missing.push("ftp.remote_dir");
        }
        if self.output.csv_name.trim().is_empty() {
            missing.push("output.csv_name");
        }
        if !missing.is_empty() {
            return Err(ExportError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

impl FtpConfig {
    /// Resolves the FTP password from config or the FTP_PASSWORD environment
    /// variable.
    pub fn resolve_password(&self) -> Result<String> {
        self.password
            .clone()
            .or_else(|| std::env::var("FTP_PASSWORD").ok())
            .ok_or_else(|| {
                ExportError::Config(
                    "ftp.password not set and FTP_PASSWORD not in environment".to_string(),
                )
            })
    }
}
