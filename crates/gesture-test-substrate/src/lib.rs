// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! # gesture-test-substrate
//!
//! Headless validation substrate for the gesture daemon.
//!
//! This crate provides:
//! - **Synthetic evdev streams** - builds `ABS_MT_*`/`SYN_REPORT` sequences
//!   without a real touchscreen
//! - **Recording output sink** - captures every synthetic pointer/key/button
//!   call for assertion
//! - **Fixed window system and fake clock** - deterministic replacements for
//!   the X11 backend and wall-clock time
//! - **Scenario harness** - replays the seeded tap/scroll/zoom/rotate/
//!   continuation scenarios against a bare `GestureEngine`
//! - **CLI runner** - `gesture-validate` binary for CI/headless testing
//!
//! ## Usage
//!
//! ### As a library (in tests)
//!
//! ```
//! use gesture_test_substrate::scenario::run_all;
//!
//! let result = run_all();
//! assert!(result.is_valid());
//! ```
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Run the full seeded-scenario suite
//! gesture-validate
//!
//! # Output JSON for CI
//! gesture-validate --format json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod scenario;
pub mod sink;
pub mod stream;
pub mod validator;

pub use fixtures::{FakeClock, FixedWindowSystem};
pub use scenario::ScenarioHarness;
pub use sink::{RecordedCall, RecordingOutputSink};
pub use validator::{ValidationResult, Validator};
