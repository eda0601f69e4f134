// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Error types for the gesture engine.
//!
//! The recognizer, easing, and continuation state machines are total by
//! design (see the design notes' error-handling section): they never fail
//! outright, only clamp invariant violations and keep running. This module
//! exists for the narrower set of operations that can genuinely fail —
//! constructing the engine, and backend calls a caller chooses to propagate
//! rather than swallow.

use thiserror::Error;

/// Errors that can occur while building or driving a [`crate::GestureCore`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A backend call (output or window-system) failed.
    #[error("backend error: {0}")]
    Backend(#[from] gesture_traits::BackendError),
}

/// Result type used across the gesture engine's fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn error_wraps_backend_error() {
        let backend = gesture_traits::BackendError::NotSupported("x".into());
        let err: Error = backend.into();
        assert!(err.to_string().contains("backend error"));
    }
}
