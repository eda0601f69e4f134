// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Deterministic `WindowSystem` and `Clock` fakes for scenario replay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use gesture_traits::{BackendResult, Clock, WindowId, WindowSystem};

/// A `WindowSystem` with a fixed focused window, class, and screen size,
/// plus a settable blacklist — everything the seeded scenarios need, since
/// none of them exercise a focus change mid-gesture.
#[derive(Debug)]
pub struct FixedWindowSystem {
    focus: Mutex<Option<(WindowId, String)>>,
    blacklist: Mutex<Vec<String>>,
    screen: Mutex<(u32, u32)>,
}

impl FixedWindowSystem {
    /// A window system with no focused window and a 1000×1000 screen,
    /// matching the seed scenarios' identity-calibration convention.
    #[must_use]
    pub fn new() -> Self {
        Self {
            focus: Mutex::new(None),
            blacklist: Mutex::new(Vec::new()),
            screen: Mutex::new((1000, 1000)),
        }
    }

    /// Set the focused window and its `WM_CLASS`.
    pub fn focus(&self, window: WindowId, class: impl Into<String>) {
        *self.focus.lock().unwrap() = Some((window, class.into()));
    }

    /// Clear the focused window.
    pub fn unfocus(&self) {
        *self.focus.lock().unwrap() = None;
    }

    /// Replace the blacklist.
    pub fn set_blacklist(&self, classes: Vec<String>) {
        *self.blacklist.lock().unwrap() = classes;
    }

    /// Set the screen size future `screen_size()` calls report.
    pub fn set_screen_size(&self, width: u32, height: u32) {
        *self.screen.lock().unwrap() = (width, height);
    }
}

impl Default for FixedWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for FixedWindowSystem {
    fn current_focus_window(&self) -> Option<WindowId> {
        self.focus.lock().unwrap().as_ref().map(|(id, _)| *id)
    }

    fn window_class(&self, window: WindowId) -> Option<String> {
        self.focus
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(id, _)| *id == window)
            .map(|(_, class)| class.clone())
    }

    fn is_blacklisted(&self, window_class: &str) -> bool {
        self.blacklist.lock().unwrap().iter().any(|b| b == window_class)
    }

    fn screen_size(&self) -> BackendResult<(u32, u32)> {
        Ok(*self.screen.lock().unwrap())
    }
}

/// A `Clock` whose time only moves when the test tells it to.
///
/// `sleep_cancellable` never performs a real sleep — it advances the virtual
/// clock by `duration` immediately (or not at all if already cancelled),
/// which is what lets the easing and continuation workers race through a
/// whole decay or grace window in effectively zero wall-clock time while
/// staying on real OS threads (see [`gesture_traits::Clock`]'s doc comment).
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ms: AtomicU64,
}

impl FakeClock {
    /// A clock starting at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self { now_ms: AtomicU64::new(0) }
    }

    /// Move the clock forward by `ms` and return the new time.
    pub fn advance(&self, ms: u64) -> u64 {
        self.now_ms.fetch_add(ms, Ordering::SeqCst) + ms
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep_cancellable(&self, duration: Duration, cancelled: &(dyn Fn() -> bool + Sync)) {
        if cancelled() {
            return;
        }
        self.advance(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_window_system_reports_focused_class() {
        let windows = FixedWindowSystem::new();
        let id = WindowId::new(42);
        windows.focus(id, "Gimp");
        assert_eq!(windows.current_focus_window(), Some(id));
        assert_eq!(windows.window_class(id), Some("Gimp".to_string()));
    }

    #[test]
    fn unfocus_clears_class_lookup() {
        let windows = FixedWindowSystem::new();
        let id = WindowId::new(1);
        windows.focus(id, "Firefox");
        windows.unfocus();
        assert_eq!(windows.current_focus_window(), None);
        assert_eq!(windows.window_class(id), None);
    }

    #[test]
    fn fake_clock_advances_on_sleep() {
        let clock = FakeClock::new();
        clock.sleep_cancellable(Duration::from_millis(50), &|| false);
        assert_eq!(clock.now_ms(), 50);
    }

    #[test]
    fn fake_clock_sleep_is_noop_when_already_cancelled() {
        let clock = FakeClock::new();
        clock.sleep_cancellable(Duration::from_millis(50), &|| true);
        assert_eq!(clock.now_ms(), 0);
    }
}
