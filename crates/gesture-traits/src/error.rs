// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Errors surfaced by backend implementations of the contracts in this crate.

use thiserror::Error;

/// Errors a backend can report back to the core.
///
/// None of these are fatal to the recognizer itself — the core treats a
/// failed output call as "dropped this frame" and keeps running; only
/// `gesture-daemon`'s startup sequence treats a subset of these as fatal
/// (device not found, required X extension missing).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The touch device file could not be opened or read.
    #[error("device I/O error: {0}")]
    Device(#[from] std::io::Error),

    /// The display connection could not be established or was lost.
    #[error("display connection error: {0}")]
    Connection(String),

    /// A required display-server extension is missing or too old.
    #[error("required extension unavailable: {0}")]
    ExtensionUnavailable(String),

    /// A window or device property was malformed or absent.
    #[error("property error: {0}")]
    Property(String),

    /// The operation is not supported by this backend.
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Result type used throughout the backend contracts.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = BackendError::ExtensionUnavailable("XInputExtension".to_string());
        assert!(err.to_string().contains("XInputExtension"));
    }

    #[test]
    fn backend_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Device(_)));
    }

    #[test]
    fn backend_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendError>();
    }
}
