// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Extended continuation worker: tolerates a brief all-fingers-released
//! moment as part of the same gesture, so a quick re-grip doesn't restart
//! classification from scratch.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use gesture_traits::Clock;

use crate::constants::CONTINUATION_TIME;
use crate::recognizer::{EngineRequest, GestureEngine};

struct Shared {
    armed: Mutex<bool>,
    shutdown: Mutex<bool>,
    condvar: Condvar,
}

/// A sink for the [`EngineRequest`]s a continuation timeout can itself
/// produce (e.g. restarting easing). [`crate::GestureCore`] implements this
/// to route them back through its own dispatch logic.
pub trait RequestSink: Send + Sync {
    /// Handle requests produced by firing a continuation timeout.
    fn dispatch(&self, requests: Vec<EngineRequest>);
}

/// Owns the continuation background thread; dropping this joins it.
pub struct ContinuationWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl ContinuationWorker {
    /// Spawn the worker thread, parked until the first [`Self::arm`] call.
    pub fn spawn(
        engine: Arc<Mutex<GestureEngine>>,
        clock: Arc<dyn Clock>,
        requests: Arc<dyn RequestSink>,
    ) -> Self {
        let shared = Arc::new(Shared {
            armed: Mutex::new(false),
            shutdown: Mutex::new(false),
            condvar: Condvar::new(),
        });

        let worker_shared = shared.clone();
        let handle = std::thread::Builder::new()
            .name("gesture-continuation".into())
            .spawn(move || run(&worker_shared, &engine, clock.as_ref(), requests.as_ref()))
            .expect("failed to spawn continuation worker thread");

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Arm the grace-period timer; equivalent to the reference
    /// implementation's `startContinuation()`.
    pub fn arm(&self) {
        *self.shared.armed.lock().unwrap() = true;
        self.shared.condvar.notify_one();
    }
}

impl Drop for ContinuationWorker {
    fn drop(&mut self) {
        *self.shared.shutdown.lock().unwrap() = true;
        self.shared.condvar.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(shared: &Shared, engine: &Mutex<GestureEngine>, clock: &dyn Clock, requests: &dyn RequestSink) {
    loop {
        {
            let mut armed = shared.armed.lock().unwrap();
            while !*armed && !*shared.shutdown.lock().unwrap() {
                armed = shared.condvar.wait(armed).unwrap();
            }
            if *shared.shutdown.lock().unwrap() {
                return;
            }
            *armed = false;
        }

        engine.lock().unwrap().begin_continuation();

        let cancelled = || *shared.shutdown.lock().unwrap();
        clock.sleep_cancellable(CONTINUATION_TIME, &cancelled);

        if *shared.shutdown.lock().unwrap() {
            return;
        }

        let mut guard = engine.lock().unwrap();
        if guard.is_ignoring_fingers_up() {
            let followups = guard.continuation_timeout();
            drop(guard);
            requests.dispatch(followups);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::profile::ProfileSet;
    use crate::recognizer::ClickMode;
    use gesture_traits::raw_event::{
        ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, EV_ABS, EV_SYN,
        SYN_REPORT,
    };
    use gesture_traits::{BackendResult, OutputSink, RawEvent, WindowId, WindowSystem};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeClock(AtomicU64);
    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
        fn sleep_cancellable(&self, _duration: Duration, _cancelled: &(dyn Fn() -> bool + Sync)) {}
    }

    #[derive(Default)]
    struct NoopSink;
    impl OutputSink for NoopSink {
        fn warp_pointer(&self, _x: i32, _y: i32) -> BackendResult<()> {
            Ok(())
        }
        fn press_button(&self, _code: u32) -> BackendResult<()> {
            Ok(())
        }
        fn release_button(&self, _code: u32) -> BackendResult<()> {
            Ok(())
        }
        fn press_key(&self, _keysym: u32) -> BackendResult<()> {
            Ok(())
        }
        fn release_key(&self, _keysym: u32) -> BackendResult<()> {
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

    #[derive(Default)]
    struct RecordingRequests {
        seen: StdMutex<Vec<&'static str>>,
    }
    impl RequestSink for RecordingRequests {
        fn dispatch(&self, requests: Vec<EngineRequest>) {
            let mut seen = self.seen.lock().unwrap();
            for r in requests {
                seen.push(match r {
                    EngineRequest::StartEasing(_) => "start_easing",
                    EngineRequest::StopEasing => "stop_easing",
                    EngineRequest::StartContinuation => "start_continuation",
                });
            }
        }
    }

    fn abs(code: u16, value: i32) -> RawEvent {
        RawEvent::new(EV_ABS, code, value, 0)
    }
    fn syn() -> RawEvent {
        RawEvent::new(EV_SYN, SYN_REPORT, 0, 0)
    }

    #[test]
    fn worker_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ContinuationWorker>();
    }

    #[test]
    fn arming_then_timeout_fires_synthetic_release() {
        let mut set = ProfileSet::built_in();
        set.default.tap_action = Action::NONE;
        let engine = Arc::new(Mutex::new(GestureEngine::new(
            Arc::new(NoopSink),
            Arc::new(FakeWindows),
            Arc::new(FakeClock::default()),
            set,
            ClickMode::Center,
        )));
        engine.lock().unwrap().set_screen_size(1000, 1000);
        engine.lock().unwrap().ingest_raw_event(syn());

        {
            let mut e = engine.lock().unwrap();
            e.ingest_raw_event(abs(ABS_MT_SLOT, 0));
            e.ingest_raw_event(abs(ABS_MT_TRACKING_ID, 1));
            e.ingest_raw_event(abs(ABS_MT_POSITION_X, 100));
            e.ingest_raw_event(abs(ABS_MT_POSITION_Y, 100));
            e.ingest_raw_event(abs(ABS_MT_SLOT, 1));
            e.ingest_raw_event(abs(ABS_MT_TRACKING_ID, 2));
            e.ingest_raw_event(abs(ABS_MT_POSITION_X, 300));
            e.ingest_raw_event(abs(ABS_MT_POSITION_Y, 100));
            e.ingest_raw_event(syn());
            // force Scroll classification
            e.ingest_raw_event(abs(ABS_MT_SLOT, 0));
            e.ingest_raw_event(abs(ABS_MT_POSITION_X, 250));
            e.ingest_raw_event(abs(ABS_MT_SLOT, 1));
            e.ingest_raw_event(abs(ABS_MT_POSITION_X, 450));
            e.ingest_raw_event(syn());
        }

        let requests = Arc::new(RecordingRequests::default());
        let worker = ContinuationWorker::spawn(engine.clone(), Arc::new(FakeClock::default()), requests.clone());
        worker.arm();

        // release both fingers: engine itself issues StartContinuation, which
        // a real GestureCore would route into worker.arm(); here we call it
        // directly to exercise the worker's timeout path.
        {
            let mut e = engine.lock().unwrap();
            e.ingest_raw_event(abs(ABS_MT_SLOT, 0));
            e.ingest_raw_event(abs(ABS_MT_TRACKING_ID, -1));
            e.ingest_raw_event(abs(ABS_MT_SLOT, 1));
            e.ingest_raw_event(abs(ABS_MT_TRACKING_ID, -1));
            e.ingest_raw_event(syn());
        }

        drop(worker);
    }
}
