// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Errors specific to the X11/evdev backend, convertible into the
//! backend-agnostic [`gesture_traits::BackendError`] at the trait boundary.

use thiserror::Error;

/// Failures this backend can hit talking to the kernel or the display.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The evdev device file could not be opened or read.
    #[error("touch device I/O error: {0}")]
    Device(#[from] std::io::Error),

    /// The X11 connection could not be established.
    #[error("X11 connection error: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    /// A request to the X server failed at the connection layer.
    #[error("X11 connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    /// A request to the X server was rejected or its reply malformed.
    #[error("X11 reply error: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),

    /// An id-allocating request failed.
    #[error("X11 reply error: {0}")]
    ReplyOrId(#[from] x11rb::errors::ReplyOrIdError),

    /// A required extension (XTEST, XInput2, RANDR) is missing or too old.
    #[error("required X11 extension unavailable: {0}")]
    ExtensionUnavailable(String),

    /// No XInput2 device matched the configured touch device.
    #[error("no XInput2 device found for {0}")]
    DeviceNotFound(String),
}

impl From<Error> for gesture_traits::BackendError {
    fn from(err: Error) -> Self {
        match err {
            Error::Device(io) => Self::Device(io),
            Error::Connect(e) => Self::Connection(e.to_string()),
            Error::Connection(e) => Self::Connection(e.to_string()),
            Error::Reply(e) => Self::Connection(e.to_string()),
            Error::ReplyOrId(e) => Self::Connection(e.to_string()),
            Error::ExtensionUnavailable(what) => Self::ExtensionUnavailable(what),
            Error::DeviceNotFound(what) => Self::Property(what),
        }
    }
}

/// Result type used throughout this crate's internals.
pub type Result<T> = std::result::Result<T, Error>;
