//! Infrastructure adapter for the remote file store, speaking FTP with
//! optional explicit FTPS.
//!
//! Connection, directory handling, upload, existence probe, delete and
//! rename each map onto a single FTP operation; the two-phase publish
//! sequencing lives in the application layer, not here.

use std::fs::File;
use std::io::BufReader;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::time::Duration;

use log::info;
use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, NativeTlsConnector, NativeTlsFtpStream, Status};

use crate::config::FtpConfig;
use crate::domain::errors::{ExportError, Result};
use crate::ports::remote_store::{RemoteConnector, RemoteStore, UploadOutcome};

/// Builds authenticated FTP(S) sessions from the configured endpoint.
pub struct FtpConnector {
    config: FtpConfig,
    password: String,
}

impl FtpConnector {
    pub fn new(config: FtpConfig, password: String) -> Self {
        Self { config, password }
    }
}

impl RemoteConnector for FtpConnector {
    fn connect(&self) -> Result<Box<dyn RemoteStore>> {
        let addr = (self.config.host.as_str(), self.config.port)
            .to_socket_addrs()
            .map_err(|e| {
                ExportError::RemoteTransport(format!("resolve {}: {}", self.config.host, e))
            })?
            .next()
            .ok_or_else(|| {
                ExportError::RemoteTransport(format!("no address for {}", self.config.host))
            })?;

        let stream = NativeTlsFtpStream::connect_timeout(
            addr,
            Duration::from_secs(self.config.connect_timeout_secs),
        )
        .map_err(|e| ExportError::RemoteTransport(format!("connect {}: {}", addr, e)))?;

        stream
            .get_ref()
            .set_read_timeout(Some(Duration::from_secs(self.config.read_timeout_secs)))
            .map_err(|e| ExportError::RemoteTransport(format!("set read timeout: {}", e)))?;

        let mut stream = if self.config.use_ftps {
            info!("Negotiating explicit FTPS with {}", self.config.host);
            let tls = TlsConnector::builder()
                // matches the deployed server's self-signed certificate;
                // validate a real certificate in production
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|e| ExportError::RemoteTransport(format!("TLS setup: {}", e)))?;
            stream
                .into_secure(NativeTlsConnector::from(tls), &self.config.host)
                .map_err(|e| {
                    ExportError::RemoteTransport(format!("FTPS negotiation: {}", e))
                })?
        } else {
            stream
        };

        stream.login(&self.config.user, &self.password).map_err(|e| {
            ExportError::RemoteTransport(format!("login as {}: {}", self.config.user, e))
        })?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| ExportError::RemoteTransport(format!("set binary mode: {}", e)))?;

        Ok(Box::new(FtpRemoteStore { stream }))
    }
}

/// One open FTP(S) session implementing the remote store operations.
pub struct FtpRemoteStore {
    stream: NativeTlsFtpStream,
}

impl RemoteStore for FtpRemoteStore {
    fn ensure_dir(&mut self, dir: &str) -> Result<()> {
        // MKD answers 550 for an existing directory; create segment by
        // segment and let the upload settle any remaining refusal.
        let mut path = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            if !path.is_empty() || dir.starts_with('/') {
                path.push('/');
            }
            path.push_str(segment);
            match self.stream.mkdir(&path) {
                Ok(()) => {}
                Err(FtpError::UnexpectedResponse(_)) => {}
                Err(e) => {
                    return Err(ExportError::RemoteTransport(format!("mkdir {}: {}", path, e)))
                }
            }
        }
        Ok(())
    }

    fn upload(&mut self, local: &Path, remote: &str) -> Result<UploadOutcome> {
        let file = File::open(local)?;
        let mut reader = BufReader::new(file);
        let bytes = self
            .stream
            .put_file(remote, &mut reader)
            .map_err(|e| ExportError::RemotePublish(format!("upload {}: {}", remote, e)))?;
        info!("Uploaded {} bytes to {}", bytes, remote);
        // STOR overwrites unconditionally; this transfer layer has no
        // "skipped, already identical" path.
        Ok(UploadOutcome::Uploaded)
    }

    fn exists(&mut self, remote: &str) -> Result<bool> {
        match self.stream.size(remote) {
            Ok(_) => Ok(true),
            Err(FtpError::UnexpectedResponse(ref r)) if r.status == Status::FileUnavailable => {
                Ok(false)
            }
            Err(e) => Err(ExportError::RemotePublish(format!(
                "existence check {}: {}",
                remote, e
            ))),
        }
    }

    fn delete(&mut self, remote: &str) -> Result<()> {
        self.stream
            .rm(remote)
            .map_err(|e| ExportError::RemotePublish(format!("delete {}: {}", remote, e)))
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.stream
            .rename(from, to)
            .map_err(|e| ExportError::RemotePublish(format!("rename {} -> {}: {}", from, to, e)))
    }

    fn disconnect(&mut self) -> Result<()> {
        self.stream
            .quit()
            .map_err(|e| ExportError::RemoteTransport(format!("quit: {}", e)))
    }
}
