//! Core error definitions for the export-and-publish pipeline.
//!
//! This module provides a centralized `ExportError` enum and a `Result` type
//! used throughout the application. Every fault aborts the run; there is no
//! retry anywhere, so each variant corresponds to one fatal failure category
//! an operator can act on.

use thiserror::Error;

/// Error categories encountered during an export run.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Local I/O error: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Remote transport error: {0}")]
    RemoteTransport(String),

    #[error("Remote publish error: {0}")]
    RemotePublish(String),
}

impl From<postgres::Error> for ExportError {
    fn from(e: postgres::Error) -> Self {
        ExportError::DataSource(e.to_string())
    }
}

impl From<suppaftp::FtpError> for ExportError {
    fn from(e: suppaftp::FtpError) -> Self {
        ExportError::RemoteTransport(e.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => ExportError::LocalIo(io),
            other => ExportError::LocalIo(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("{:?}", other),
            )),
        }
    }
}

/// A specialized Result type for the export pipeline.
pub type Result<T> = std::result::Result<T, ExportError>;
