// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Timing and geometry constants shared across the recognizer, easing, and
//! continuation state machines.

use std::time::Duration;

/// How long a single finger must rest before the simulated button press
/// fires, giving the user a window to add a second finger.
pub const CLICK_DELAY: Duration = Duration::from_millis(200);

/// Above this per-axis scroll interval, easing does not start for that axis.
pub const MAX_EASING_START_INTERVAL: Duration = Duration::from_millis(200);

/// Once the easing worker's interval exceeds this, it parks.
pub const MAX_EASING_INTERVAL: Duration = Duration::from_millis(200);

/// Multiplicative growth applied to the easing interval after each step.
pub const EASING_GROWTH: f64 = 1.15;

/// Grace window during which an all-fingers-up transition is tolerated as
/// part of the same gesture.
pub const CONTINUATION_TIME: Duration = Duration::from_millis(500);

/// Maximum two-finger travel distance, in pixels, still classified as a tap.
pub const TAP_MAX_MOVE_DISTANCE: f64 = 10.0;
