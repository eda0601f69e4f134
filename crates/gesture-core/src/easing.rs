// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Inertial "easing" worker: after a scroll gesture releases with residual
//! velocity, keeps emitting scroll steps at an exponentially growing
//! interval until it exceeds [`MAX_EASING_INTERVAL`].

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use gesture_traits::{Clock, OutputSink};

use crate::action::{execute, Action, Phase};
use crate::constants::{EASING_GROWTH, MAX_EASING_INTERVAL};
use crate::recognizer::EasingStart;

struct Shared {
    pending: Mutex<Option<EasingStart>>,
    /// Cancels the sequence currently running, then resets to `false`.
    stop_requested: Mutex<bool>,
    /// Set once by `Drop`; the worker thread exits for good.
    shutdown: Mutex<bool>,
    condvar: Condvar,
}

/// Owns the easing background thread; dropping this joins it.
pub struct EasingWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl EasingWorker {
    /// Spawn the worker thread, parked until the first [`Self::start`] call.
    pub fn spawn(output: Arc<dyn OutputSink>, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared {
            pending: Mutex::new(None),
            stop_requested: Mutex::new(false),
            shutdown: Mutex::new(false),
            condvar: Condvar::new(),
        });

        let worker_shared = shared.clone();
        let handle = std::thread::Builder::new()
            .name("gesture-easing".into())
            .spawn(move || run(&worker_shared, output.as_ref(), clock.as_ref()))
            .expect("failed to spawn easing worker thread");

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Arm (or re-arm) the worker with a fresh set of easing parameters.
    pub fn start(&self, params: EasingStart) {
        *self.shared.pending.lock().unwrap() = Some(params);
        self.shared.condvar.notify_one();
    }

    /// Cancel any easing currently running; the worker parks again.
    pub fn stop(&self) {
        *self.shared.stop_requested.lock().unwrap() = true;
        self.shared.condvar.notify_one();
    }
}

impl Drop for EasingWorker {
    fn drop(&mut self) {
        *self.shared.shutdown.lock().unwrap() = true;
        self.shared.condvar.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(shared: &Shared, output: &dyn OutputSink, clock: &dyn Clock) {
    loop {
        let params = {
            let mut pending = shared.pending.lock().unwrap();
            while pending.is_none() && !*shared.shutdown.lock().unwrap() {
                pending = shared.condvar.wait(pending).unwrap();
            }
            if *shared.shutdown.lock().unwrap() {
                return;
            }
            pending.take().unwrap()
        };

        step_until_done(shared, output, clock, params);
    }
}

fn take_stop(shared: &Shared) -> bool {
    let mut stop = shared.stop_requested.lock().unwrap();
    if *stop {
        *stop = false;
        true
    } else {
        false
    }
}

fn step_until_done(shared: &Shared, output: &dyn OutputSink, clock: &dyn Clock, mut params: EasingStart) {
    let mut interval = Duration::from_millis(params.interval_ms);

    loop {
        if take_stop(shared) || *shared.shutdown.lock().unwrap() {
            return;
        }

        if let Some(action) = params.horizontal {
            emit(output, &action);
        }
        if let Some(action) = params.vertical {
            emit(output, &action);
        }

        if interval > MAX_EASING_INTERVAL {
            return;
        }

        let cancelled = || *shared.stop_requested.lock().unwrap() || *shared.shutdown.lock().unwrap();
        clock.sleep_cancellable(interval, &cancelled);

        if take_stop(shared) || *shared.shutdown.lock().unwrap() {
            return;
        }

        // A new `start()` call while this sequence is running replaces it
        // wholesale: pick up its parameters and restart the growth curve.
        if let Some(fresh) = shared.pending.lock().unwrap().take() {
            params = fresh;
            interval = Duration::from_millis(params.interval_ms);
        } else {
            interval = interval.mul_f64(EASING_GROWTH);
        }
    }
}

fn emit(output: &dyn OutputSink, action: &Action) {
    if let Err(err) = execute(output, action, Phase::BOTH) {
        tracing::warn!(?err, "easing step failed to emit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_traits::BackendResult;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeClock(AtomicU64);
    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
        fn sleep_cancellable(&self, _duration: Duration, _cancelled: &(dyn Fn() -> bool + Sync)) {}
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: StdMutex<Vec<String>>,
    }
    impl OutputSink for RecordingSink {
        fn warp_pointer(&self, _x: i32, _y: i32) -> BackendResult<()> {
            Ok(())
        }
        fn press_button(&self, _code: u32) -> BackendResult<()> {
            Ok(())
        }
        fn release_button(&self, _code: u32) -> BackendResult<()> {
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

    #[test]
    fn worker_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<EasingWorker>();
    }

    #[test]
    fn start_runs_to_completion_and_emits_steps() {
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(FakeClock::default());
        let worker = EasingWorker::spawn(sink.clone(), clock);
        worker.start(EasingStart {
            interval_ms: 10,
            horizontal: None,
            vertical: Some(Action::key(0x41)),
        });
        // Drop joins the thread; with a no-op sleep the growth curve runs to
        // completion well before the join returns.
        drop(worker);
        assert!(!sink.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn stop_before_any_step_emits_nothing_new() {
        let sink = Arc::new(RecordingSink::default());
        let clock = Arc::new(FakeClock::default());
        let worker = EasingWorker::spawn(sink, clock);
        worker.stop();
        drop(worker);
    }
}
