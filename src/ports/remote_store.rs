//! # Remote Store Port
//!
//! Contract for the file server that receives published artifacts. The
//! publisher drives these operations as a state machine; the port stays
//! black-box about protocol, authentication and encryption.

use std::path::Path;

use crate::domain::errors::Result;

/// Result of a temp-name upload.
///
/// Some transfer layers report "skipped, already identical" instead of
/// re-sending bytes; the publisher accepts that as success. A skip keyed on
/// size or timestamp can in principle mask a stale upload, so the publisher
/// logs it rather than treating it silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded,
    Skipped,
}

/// An open session against the remote file store.
///
/// All paths are remote paths ('/'-separated, relative to the server root).
/// Every method maps a fault to a fatal error; the publisher never retries.
pub trait RemoteStore {
    /// Create-if-absent of `dir`, including parents. Must not fail when the
    /// directory already exists.
    fn ensure_dir(&mut self, dir: &str) -> Result<()>;

    /// Transfers the full content of `local` to `remote`, overwriting any
    /// existing object at that path.
    fn upload(&mut self, local: &Path, remote: &str) -> Result<UploadOutcome>;

    fn exists(&mut self, remote: &str) -> Result<bool>;

    fn delete(&mut self, remote: &str) -> Result<()>;

    /// Renames `from` to `to`. On a conforming store this is a single atomic
    /// metadata operation; no reader observes a partially written `to`.
    fn rename(&mut self, from: &str, to: &str) -> Result<()>;

    /// Closes the session. Called on every exit path, including after a
    /// fault; its own failure must not replace the original error.
    fn disconnect(&mut self) -> Result<()>;
}

/// Establishes a session to the remote store. Connection failure is fatal to
/// the run.
pub trait RemoteConnector {
    fn connect(&self) -> Result<Box<dyn RemoteStore>>;
}
