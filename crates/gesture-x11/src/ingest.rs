// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Reads raw `input_event` records from the touch device and feeds them to
//! the gesture core, retrying on I/O failure rather than exiting.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use evdev::Device;
use tracing::{error, warn};

use gesture_core::GestureCore;
use gesture_traits::RawEvent;

/// Backoff between device (re)open attempts.
const OPEN_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Poll interval while the device is open but has nothing queued, so the
/// loop can notice `running` flipping to `false` promptly.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Open `device_path`, feed [`GestureCore`] until `running` is cleared, and
/// reopen on any read failure rather than returning an error.
pub fn run(device_path: &Path, core: &GestureCore, running: &Arc<AtomicBool>) {
    let epoch = Instant::now();

    while running.load(Ordering::SeqCst) {
        let mut device = match Device::open(device_path) {
            Ok(device) => device,
            Err(err) => {
                warn!(%err, path = %device_path.display(), "failed to open touch device, retrying");
                std::thread::sleep(OPEN_RETRY_BACKOFF);
                continue;
            },
        };

        if let Err(err) = device.set_nonblocking(true) {
            error!(%err, "touch device does not support non-blocking reads");
            std::thread::sleep(OPEN_RETRY_BACKOFF);
            continue;
        }

        if !drain_until_error(&mut device, core, running, epoch) {
            // `running` was cleared mid-read; exit cleanly without retrying.
            return;
        }
    }
}

/// Returns `false` if the loop stopped because `running` was cleared,
/// `true` if it stopped because the device needs reopening.
fn drain_until_error(
    device: &mut Device,
    core: &GestureCore,
    running: &Arc<AtomicBool>,
    epoch: Instant,
) -> bool {
    while running.load(Ordering::SeqCst) {
        match device.fetch_events() {
            Ok(events) => {
                for event in events {
                    core.feed(to_raw_event(&event, epoch));
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(IDLE_POLL_INTERVAL);
            },
            Err(err) => {
                warn!(%err, "touch device read failed, reopening");
                std::thread::sleep(OPEN_RETRY_BACKOFF);
                return true;
            },
        }
    }
    false
}

fn to_raw_event(event: &evdev::InputEvent, epoch: Instant) -> RawEvent {
    let timestamp_ms = epoch.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;
    RawEvent::new(
        event.event_type().0,
        event.code(),
        event.value(),
        timestamp_ms,
    )
}
