// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab
//
// This file is part of twofingemu-rs.
// https://github.com/DataScienceBioLab/twofingemu-rs

//! # gesture-core
//!
//! Backend-independent gesture recognition: evdev multi-touch ingestion,
//! per-window profiles, the tap/scroll/zoom/rotate state machine, and the
//! inertial easing and extended-continuation timer workers.
//!
//! This crate provides:
//! - Calibrated touch tracking across both evdev multi-touch protocols
//! - Gesture classification and per-gesture stepping
//! - Inertial scroll easing and grace-period gesture continuation
//! - Focus/activation bookkeeping
//!
//! ## Design Principles
//!
//! - **Backend-independent**: only depends on `gesture-traits`' synchronous
//!   seams, never on a concrete display or device backend
//! - **Concurrent-safe**: [`GestureCore`] is `Send + Sync` and is driven from
//!   multiple threads by design (ingest, focus events, two timer workers)
//! - **Total**: the recognizer never fails outright; invariant violations
//!   clamp rather than propagate an error

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod action;
pub mod activation;
pub mod calibration;
pub mod clock;
pub mod constants;
pub mod continuation;
pub mod core;
pub mod easing;
pub mod error;
pub mod profile;
pub mod recognizer;
pub mod touch;

pub use action::{Action, ActionKind, Modifiers, Phase};
pub use calibration::CalibrationParams;
pub use clock::SystemClock;
pub use core::GestureCore;
pub use error::{Error, Result};
pub use profile::{Profile, ProfileInherit, ProfileSet};
pub use recognizer::{ClickMode, EngineRequest, EasingStart, GestureEngine, GestureKind};
pub use touch::{FingerSlot, TickInput, TouchTracker};
