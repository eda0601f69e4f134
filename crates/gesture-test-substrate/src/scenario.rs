// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! A deterministic harness wiring a bare [`GestureEngine`] to the test
//! fakes, plus the six seeded scenarios replayed against it.
//!
//! Every scenario runs at a 1000×1000 screen with identity calibration, the
//! convention the seeded scenarios share. The harness drives
//! [`GestureEngine`] directly rather than the thread-owning [`GestureCore`]
//! wrapper: the easing and continuation workers are real OS threads racing
//! a [`Clock`], and a replay has to stay single-threaded to be reproducible.
//! Where a scenario needs continuation-worker behavior, it calls
//! [`GestureEngine::begin_continuation`]/[`GestureEngine::continuation_timeout`]
//! directly — the same methods the real worker thread would call.

use std::sync::Arc;

use gesture_core::{
    Action, ActionKind, CalibrationParams, ClickMode, EngineRequest, GestureEngine, Profile,
    ProfileSet,
};
use gesture_traits::RawEvent;

use crate::fixtures::{FakeClock, FixedWindowSystem};
use crate::sink::{RecordedCall, RecordingOutputSink};
use crate::stream::SyntheticStream;
use crate::validator::Validator;

/// Bare-pointer-button code for the primary click, mirroring
/// `gesture-core`'s own `BTN_LEFT` constant (not part of its public API).
const BTN_LEFT: u32 = 0x110;

/// A profile with the zoom/rotate actions swapped for distinguishable button
/// codes, since the built-in default leaves them `Action::NONE` and a
/// `RecordingOutputSink` can't observe a no-op. Scroll and tap keep their
/// built-in key/button codes, which are already distinguishable.
fn observable_profile() -> ProfileSet {
    let mut default = Profile::built_in_default();
    default.zoom_in_action = Action::button(0x101);
    default.zoom_out_action = Action::button(0x102);
    default.rotate_left_action = Action::button(0x103);
    default.rotate_right_action = Action::button(0x104);
    ProfileSet { default, ..ProfileSet::built_in() }
}

/// Wires a [`GestureEngine`] to recording/fake backends for one scenario
/// replay.
pub struct ScenarioHarness {
    engine: GestureEngine,
    sink: Arc<RecordingOutputSink>,
    #[allow(dead_code)] // kept alive for Arc<dyn WindowSystem>; scenarios read screen/focus via it
    windows: Arc<FixedWindowSystem>,
    clock: Arc<FakeClock>,
}

impl ScenarioHarness {
    /// A harness using the built-in default profile, unmodified.
    #[must_use]
    pub fn new() -> Self {
        Self::with_profiles(ProfileSet::built_in())
    }

    /// A harness using `profiles` instead of the built-in default.
    #[must_use]
    pub fn with_profiles(profiles: ProfileSet) -> Self {
        let sink = Arc::new(RecordingOutputSink::new());
        let windows = Arc::new(FixedWindowSystem::new());
        let clock = Arc::new(FakeClock::new());

        let mut engine =
            GestureEngine::new(sink.clone(), windows.clone(), clock.clone(), profiles, ClickMode::Center);
        engine.set_calibration(CalibrationParams::identity(1000));
        engine.set_screen_size(1000, 1000);

        let mut harness = Self { engine, sink, windows, clock };
        harness.quiesce();
        harness
    }

    /// Run one all-fingers-up tick so `ActivationState`'s deferred activation
    /// fires before any scenario event — the grab starts inactive and only
    /// activates the first time it observes a quiescent moment.
    fn quiesce(&mut self) {
        for event in SyntheticStream::new().report(0, |_| {}).build() {
            self.engine.ingest_raw_event(event);
        }
    }

    /// Feed a synthetic event stream, setting the fake clock to each event's
    /// carried timestamp before ingesting it — `process_tick` reads time via
    /// the injected `Clock`, not from the event itself.
    pub fn replay(&mut self, events: Vec<RawEvent>) -> Vec<EngineRequest> {
        let mut requests = Vec::new();
        for event in events {
            self.clock.set(event.timestamp_ms);
            requests.extend(self.engine.ingest_raw_event(event));
        }
        requests
    }

    /// Calls recorded so far, with `Flush` entries stripped.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.sink.calls_without_flush()
    }

    /// The wrapped engine, for scenarios that drive continuation directly.
    pub fn engine_mut(&mut self) -> &mut GestureEngine {
        &mut self.engine
    }
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn button(code: u32) -> RecordedCall {
    RecordedCall::PressButton(code)
}

/// Scenario 1: a single finger touches down at the origin and lifts before
/// `CLICK_DELAY` elapses — a plain left click, not a two-finger tap.
pub fn simple_tap(v: &mut Validator) {
    let mut harness = ScenarioHarness::new();
    let events = SyntheticStream::new()
        .report(0, |r| {
            r.down(0, 7, 0, 0);
        })
        .report(50, |r| {
            r.up(0);
        })
        .build();
    harness.replay(events);

    v.check_eq(
        "simple_tap.calls",
        &harness.calls(),
        &vec![
            RecordedCall::Warp(0, 0),
            button(BTN_LEFT),
            RecordedCall::ReleaseButton(BTN_LEFT),
        ],
    );
}

/// Scenario 2: two fingers drag right, crossing `hscroll_step` (50px) twice
/// over three ticks, then lift into an easing-eligible release.
pub fn two_finger_horizontal_scroll(v: &mut Validator) {
    let mut harness = ScenarioHarness::new();
    let events = SyntheticStream::new()
        .report(0, |r| {
            r.down(0, 1, 100, 500).down(1, 2, 400, 500);
        })
        .report(20, |r| {
            r.move_to(0, 140, 500).move_to(1, 440, 500);
        })
        .report(40, |r| {
            r.move_to(0, 180, 500).move_to(1, 480, 500);
        })
        .report(60, |r| {
            r.move_to(0, 220, 500).move_to(1, 520, 500);
        })
        .build();
    harness.replay(events);

    let right_key = Profile::built_in_default().scroll_right_action;
    let ActionKind::Key(right_keysym) = right_key.kind else {
        panic!("built-in scroll_right_action is expected to be a key action");
    };

    v.check_eq(
        "scroll.calls_before_release",
        &harness.calls(),
        &vec![
            RecordedCall::Warp(250, 500),
            RecordedCall::PressKey(right_keysym),
            RecordedCall::ReleaseKey(right_keysym),
            RecordedCall::PressKey(right_keysym),
            RecordedCall::ReleaseKey(right_keysym),
        ],
    );

    let release = harness.replay(
        SyntheticStream::new()
            .report(70, |r| {
                r.up(0).up(1);
            })
            .build(),
    );
    let starts_easing = release.iter().any(|r| matches!(r, EngineRequest::StartEasing(_)));
    let starts_continuation = release.iter().any(|r| matches!(r, EngineRequest::StartContinuation));
    v.check("scroll.release_starts_easing", starts_easing, format!("{release:?}"));
    v.check(
        "scroll.release_arms_extended_continuation",
        starts_continuation,
        format!("{release:?}"),
    );
}

/// Scenario 3: a pinch grows finger separation past `zoom_min_distance`,
/// firing `zoom_in_action` once per tick the step threshold is crossed
/// (`zoom_start_dist` advances multiplicatively by `zoom_step`, so the same
/// absolute growth crosses the threshold at most once per tick).
pub fn pinch_to_zoom(v: &mut Validator) {
    let mut harness = ScenarioHarness::new();
    let events = SyntheticStream::new()
        .report(0, |r| {
            r.down(0, 1, 450, 500).down(1, 2, 550, 500);
        })
        // dist 100 -> 132: crosses 100*1.2=120 once, new start dist 120.
        .report(20, |r| {
            r.move_to(0, 434, 500).move_to(1, 566, 500);
        })
        // dist 132 -> 150: crosses 120*1.2=144 once, new start dist 144.
        .report(40, |r| {
            r.move_to(0, 425, 500).move_to(1, 575, 500);
        })
        .build();
    harness.replay(events);

    v.check_eq(
        "zoom.calls",
        &harness.calls(),
        &vec![
            RecordedCall::Warp(500, 500),
            button(0x101),
            RecordedCall::ReleaseButton(0x101),
            button(0x101),
            RecordedCall::ReleaseButton(0x101),
        ],
    );
}

/// Scenario 4: two fingers rotate around their midpoint without changing
/// separation, crossing `rotate_step` (15°) once per tick until ~30° total.
pub fn rotation_only(v: &mut Validator) {
    let mut harness = ScenarioHarness::with_profiles(observable_profile());
    let events = SyntheticStream::new()
        .report(0, |r| {
            r.down(0, 1, 450, 500).down(1, 2, 550, 500);
        })
        // Rotate the pair to ~16 degrees: crosses the 15 degree classify
        // threshold and the first 15 degree step in the same tick.
        .report(20, |r| {
            r.move_to(0, 452, 486).move_to(1, 548, 514);
        })
        // Rotate on to ~32 degrees: crosses the next 15 degree step past the
        // first commit at 15 degrees.
        .report(40, |r| {
            r.move_to(0, 458, 474).move_to(1, 542, 526);
        })
        .build();
    harness.replay(events);

    v.check_eq(
        "rotate.calls",
        &harness.calls(),
        &vec![
            RecordedCall::Warp(500, 500),
            button(0x104),
            RecordedCall::ReleaseButton(0x104),
            button(0x104),
            RecordedCall::ReleaseButton(0x104),
        ],
    );
}

/// Scenario 5: a two-finger scroll releases into the extended continuation
/// grace window, and a finger returns before the 500ms grace period expires
/// — the grip resumes instead of the gesture ending.
pub fn extended_continuation_regrip(v: &mut Validator) {
    let mut harness = ScenarioHarness::new();
    harness.replay(
        SyntheticStream::new()
            .report(0, |r| {
                r.down(0, 1, 100, 500).down(1, 2, 400, 500);
            })
            .report(100, |r| {
                r.move_to(0, 140, 500).move_to(1, 440, 500);
            })
            .report(200, |r| {
                r.move_to(0, 180, 500).move_to(1, 480, 500);
            })
            .build(),
    );

    let release = harness.replay(
        SyntheticStream::new()
            .report(200, |r| {
                r.up(0).up(1);
            })
            .build(),
    );
    let armed = release.iter().any(|r| matches!(r, EngineRequest::StartContinuation));
    v.check("continuation.release_arms_grace_window", armed, format!("{release:?}"));

    // The continuation worker wakes and marks the grace window active.
    harness.engine_mut().begin_continuation();
    v.check(
        "continuation.grace_window_active_immediately_after_arming",
        harness.engine_mut().is_ignoring_fingers_up(),
        "expected is_ignoring_fingers_up() to be true",
    );

    // A finger returns within the 500ms window (t=400): process_tick's
    // pre-pass sees fingers_down > 0 while ignoring fingers-up and clears the
    // flag itself, without the harness synthesizing an end tick.
    harness.replay(
        SyntheticStream::new()
            .report(400, |r| {
                r.down(0, 3, 180, 500);
            })
            .build(),
    );
    v.check(
        "continuation.real_finger_clears_grace_window",
        !harness.engine_mut().is_ignoring_fingers_up(),
        "expected is_ignoring_fingers_up() to be false after a finger returned",
    );

    // The gesture is still Scroll, not reset: a second finger regripping and
    // continuing the drag still produces scroll steps instead of restarting
    // classification from Undecided.
    let calls_before = harness.calls().len();
    harness.replay(
        SyntheticStream::new()
            .report(420, |r| {
                r.down(1, 4, 480, 500);
            })
            .report(480, |r| {
                r.move_to(0, 260, 500).move_to(1, 560, 500);
            })
            .build(),
    );
    let produced_more_calls = harness.calls().len() > calls_before;
    v.check(
        "continuation.regrip_continues_the_scroll_gesture",
        produced_more_calls,
        format!("calls after regrip: {:?}", harness.calls()),
    );
}

/// Scenario 6: one finger holds past `CLICK_DELAY` (200ms) with no second
/// finger ever touching down — a delayed press while still held, then a
/// release on lift, not a double click.
pub fn delayed_single_finger_click(v: &mut Validator) {
    let mut harness = ScenarioHarness::new();
    harness.replay(
        SyntheticStream::new()
            .report(0, |r| {
                r.down(0, 1, 300, 300);
            })
            .build(),
    );
    // Before CLICK_DELAY elapses, holding still produces no button press.
    harness.replay(
        SyntheticStream::new()
            .report(100, |r| {
                r.move_to(0, 300, 300);
            })
            .build(),
    );
    v.check_eq("delayed_click.no_press_before_delay", &harness.calls(), &vec![RecordedCall::Warp(300, 300)]);

    // Past CLICK_DELAY, the same held position ticks in a press.
    harness.replay(
        SyntheticStream::new()
            .report(220, |r| {
                r.move_to(0, 300, 300);
            })
            .build(),
    );
    v.check_eq(
        "delayed_click.press_after_delay",
        &harness.calls(),
        &vec![RecordedCall::Warp(300, 300), button(BTN_LEFT), RecordedCall::Warp(300, 300)],
    );

    harness.replay(
        SyntheticStream::new()
            .report(250, |r| {
                r.up(0);
            })
            .build(),
    );
    v.check_eq(
        "delayed_click.release_on_lift_not_double_click",
        &harness.calls(),
        &vec![
            RecordedCall::Warp(300, 300),
            button(BTN_LEFT),
            RecordedCall::Warp(300, 300),
            RecordedCall::ReleaseButton(BTN_LEFT),
        ],
    );
}

/// Replay all six seeded scenarios and build the combined report.
#[must_use]
pub fn run_all() -> crate::validator::ValidationResult {
    let mut v = Validator::new();
    simple_tap(&mut v);
    two_finger_horizontal_scroll(&mut v);
    pinch_to_zoom(&mut v);
    rotation_only(&mut v);
    extended_continuation_regrip(&mut v);
    delayed_single_finger_click(&mut v);
    v.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_seeded_scenarios_pass() {
        let result = run_all();
        for failure in result.failures() {
            eprintln!("FAILED {}: {}", failure.name, failure.message);
        }
        assert!(result.is_valid());
    }
}
