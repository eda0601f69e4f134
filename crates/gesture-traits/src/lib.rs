// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Backend-agnostic contracts the gesture engine is driven through.
//!
//! This crate defines the seam between [`gesture_core`](https://docs.rs/gesture-core)
//! and whatever is actually attached to the machine: a real X11 display plus an
//! evdev touchscreen in production, or a synthetic harness in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   gesture-traits (this crate)                   │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐            │
//! │  │ OutputSink  │   │ WindowSystem│   │   Clock     │            │
//! │  └──────┬──────┘   └──────┬──────┘   └──────┬──────┘            │
//! └─────────┼─────────────────┼─────────────────┼───────────────────┘
//!           │                 │                 │
//!    ┌──────┴──────┐   ┌──────┴──────┐   ┌──────┴──────┐
//!    │ gesture-x11 │   │ gesture-x11 │   │ SystemClock │
//!    │  (XTest)    │   │ (WM_CLASS)  │   │ / FakeClock │
//!    └─────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! All three traits are deliberately synchronous: the gesture engine runs its
//! recognizer tick on the thread that owns the touch device, and calls these
//! methods directly from it (see `gesture_core`'s concurrency notes).

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

pub mod clock;
pub mod error;
pub mod output;
pub mod raw_event;
pub mod window;

pub use clock::Clock;
pub use error::{BackendError, BackendResult};
pub use output::OutputSink;
pub use raw_event::{RawEvent, EV_ABS, EV_SYN};
pub use window::{WindowId, WindowSystem};
