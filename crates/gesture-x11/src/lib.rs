// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! X11 + evdev backend implementing the `gesture-traits` contracts.
//!
//! This crate is intentionally conservative: it's a working adapter shaped
//! like production XTest/XInput2 code, not a full X11 toolkit
//! reimplementation.
//!
//! ## Components
//!
//! - [`connection::X11Connection`] — connects, verifies XTEST/RANDR/XInput2,
//!   and resolves the touch device's XInput2 id
//! - [`input::Xtest11Output`] — `OutputSink` via `XTestFakeInput`
//! - [`windows::X11WindowSystem`] — `WindowSystem` via `WM_CLASS` tree walk
//! - [`calibration`] — reads the `xf86-input-evdev` axis-calibration
//!   device properties
//! - [`ingest`] — the evdev read loop that feeds a `GestureCore`
//! - [`config`] — TOML profile configuration

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod calibration;
pub mod config;
pub mod connection;
pub mod error;
pub mod ingest;
pub mod input;
pub mod windows;

pub use connection::X11Connection;
pub use input::Xtest11Output;
pub use windows::X11WindowSystem;
