// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Wires [`GestureEngine`] behind a shared lock with its two cooperative
//! timer workers, presenting one thread-safe entry point for the backend's
//! ingest loop and focus-event handlers.

use std::sync::{Arc, Mutex};

use gesture_traits::{Clock, OutputSink, RawEvent, WindowSystem};

use crate::calibration::CalibrationParams;
use crate::continuation::{ContinuationWorker, RequestSink};
use crate::easing::EasingWorker;
use crate::profile::ProfileSet;
use crate::recognizer::{ClickMode, EngineRequest, GestureEngine};

/// The assembled gesture engine plus its background workers.
///
/// Cloning is cheap (an `Arc` bump) and intentional: `gesture-x11`'s evdev
/// reader and X11 focus-event listener each hold a clone and call in from
/// their own threads.
#[derive(Clone)]
pub struct GestureCore {
    engine: Arc<Mutex<GestureEngine>>,
    easing: Arc<EasingWorker>,
    continuation: Arc<ContinuationWorker>,
}

/// Routes requests a continuation timeout produces (it can restart easing,
/// but never re-arms itself — `continuation_timeout()` always runs with
/// `dontStartContinuation` set) back through the easing worker.
struct EasingOnlyDispatcher {
    easing: Arc<EasingWorker>,
}

impl RequestSink for EasingOnlyDispatcher {
    fn dispatch(&self, requests: Vec<EngineRequest>) {
        for request in requests {
            match request {
                EngineRequest::StartEasing(params) => self.easing.start(params),
                EngineRequest::StopEasing => self.easing.stop(),
                EngineRequest::StartContinuation => {
                    tracing::debug!("continuation timeout unexpectedly requested re-arming");
                },
            }
        }
    }
}

impl GestureCore {
    /// Assemble an engine and spawn its easing/continuation workers.
    pub fn new(
        output: Arc<dyn OutputSink>,
        windows: Arc<dyn WindowSystem>,
        clock: Arc<dyn Clock>,
        profiles: ProfileSet,
        click_mode: ClickMode,
    ) -> Self {
        let engine = Arc::new(Mutex::new(GestureEngine::new(
            output.clone(),
            windows,
            clock.clone(),
            profiles,
            click_mode,
        )));

        let easing = Arc::new(EasingWorker::spawn(output, clock.clone()));
        let dispatcher: Arc<dyn RequestSink> = Arc::new(EasingOnlyDispatcher {
            easing: easing.clone(),
        });
        let continuation = Arc::new(ContinuationWorker::spawn(engine.clone(), clock, dispatcher));

        Self {
            engine,
            easing,
            continuation,
        }
    }

    /// Feed one raw evdev record in from the ingest thread.
    pub fn feed(&self, event: RawEvent) {
        let requests = self.engine.lock().unwrap().ingest_raw_event(event);
        self.dispatch(requests);
    }

    /// Update calibration, typically once at startup after reading the
    /// touch device's axis ranges.
    pub fn set_calibration(&self, calibration: CalibrationParams) {
        self.engine.lock().unwrap().set_calibration(calibration);
    }

    /// Update the screen size, typically on startup and on `RANDR` change
    /// notifications.
    pub fn set_screen_size(&self, width: u32, height: u32) {
        self.engine.lock().unwrap().set_screen_size(width, height);
    }

    /// The focused window entered a blacklisted class.
    pub fn on_window_enter(&self, window_class: &str) {
        self.engine.lock().unwrap().on_window_enter(window_class);
    }

    /// The focused window lost focus.
    pub fn on_window_leave(&self) {
        self.engine.lock().unwrap().on_window_leave();
    }

    fn dispatch(&self, requests: Vec<EngineRequest>) {
        for request in requests {
            match request {
                EngineRequest::StartEasing(params) => self.easing.start(params),
                EngineRequest::StopEasing => self.easing.stop(),
                EngineRequest::StartContinuation => self.continuation.arm(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_core_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GestureCore>();
    }
}
