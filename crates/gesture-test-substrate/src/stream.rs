// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Synthetic evdev multi-touch stream builder.
//!
//! Produces [`RawEvent`] sequences in the slot-based `ABS_MT_SLOT` protocol,
//! the only protocol the seeded scenarios need — the legacy `MT_SYNC` path
//! is exercised directly by `gesture-core`'s own `touch` module tests.

use gesture_traits::raw_event::{
    ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, EV_ABS, EV_SYN,
    SYN_REPORT,
};
use gesture_traits::RawEvent;

/// Sentinel tracking id that lifts a finger.
pub const LIFT: i32 = -1;

/// One finger's state within a single report, as the builder accumulates it.
#[derive(Debug, Clone, Copy)]
struct SlotWrite {
    slot: u16,
    tracking_id: Option<i32>,
    x: Option<i32>,
    y: Option<i32>,
}

/// Accumulates `ABS_MT_*`/`SYN_REPORT` records for one or more frames.
///
/// ```
/// use gesture_test_substrate::stream::SyntheticStream;
///
/// let events = SyntheticStream::new()
///     .report(0, |r| r.down(0, 7, 100, 200).down(1, 8, 300, 400))
///     .report(50, |r| r.move_to(0, 110, 200).move_to(1, 310, 400))
///     .build();
/// assert!(events.iter().any(|e| e.is_syn_report()));
/// ```
#[derive(Debug, Default)]
pub struct SyntheticStream {
    events: Vec<RawEvent>,
}

/// Accumulates the writes for a single report before it is flushed as one
/// `SYN_REPORT`-terminated frame.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    writes: Vec<SlotWrite>,
}

impl ReportBuilder {
    fn write(&mut self, slot: u16, tracking_id: Option<i32>, x: Option<i32>, y: Option<i32>) {
        self.writes.push(SlotWrite { slot, tracking_id, x, y });
    }

    /// Bring a finger down in `slot` with a fresh `tracking_id` at `(x, y)`.
    pub fn down(&mut self, slot: u16, tracking_id: i32, x: i32, y: i32) -> &mut Self {
        self.write(slot, Some(tracking_id), Some(x), Some(y));
        self
    }

    /// Move the finger already occupying `slot` to `(x, y)`.
    pub fn move_to(&mut self, slot: u16, x: i32, y: i32) -> &mut Self {
        self.write(slot, None, Some(x), Some(y));
        self
    }

    /// Lift the finger occupying `slot`.
    pub fn up(&mut self, slot: u16) -> &mut Self {
        self.write(slot, Some(LIFT), None, None);
        self
    }
}

impl SyntheticStream {
    /// An empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one report frame, built by `build`, stamped with `timestamp_ms`.
    ///
    /// `timestamp_ms` is carried on every record of the frame for realism,
    /// though the recognizer itself reads time through the injected
    /// [`gesture_traits::Clock`], not from event timestamps.
    #[must_use]
    pub fn report(mut self, timestamp_ms: u64, build: impl FnOnce(&mut ReportBuilder)) -> Self {
        let mut report = ReportBuilder::default();
        build(&mut report);

        let mut last_slot = None;
        for write in &report.writes {
            if last_slot != Some(write.slot) {
                self.push(EV_ABS, ABS_MT_SLOT, i32::from(write.slot), timestamp_ms);
                last_slot = Some(write.slot);
            }
            if let Some(id) = write.tracking_id {
                self.push(EV_ABS, ABS_MT_TRACKING_ID, id, timestamp_ms);
            }
            if let Some(x) = write.x {
                self.push(EV_ABS, ABS_MT_POSITION_X, x, timestamp_ms);
            }
            if let Some(y) = write.y {
                self.push(EV_ABS, ABS_MT_POSITION_Y, y, timestamp_ms);
            }
        }
        self.push(EV_SYN, SYN_REPORT, 0, timestamp_ms);
        self
    }

    fn push(&mut self, event_type: u16, code: u16, value: i32, timestamp_ms: u64) {
        self.events.push(RawEvent::new(event_type, code, value, timestamp_ms));
    }

    /// The accumulated record sequence.
    #[must_use]
    pub fn build(self) -> Vec<RawEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_report_two_fingers_down() {
        let events = SyntheticStream::new()
            .report(0, |r| {
                r.down(0, 7, 100, 200).down(1, 8, 300, 400);
            })
            .build();
        assert_eq!(events.last().unwrap().event_type, EV_SYN);
        assert!(events.iter().any(|e| e.code == ABS_MT_TRACKING_ID && e.value == 7));
        assert!(events.iter().any(|e| e.code == ABS_MT_TRACKING_ID && e.value == 8));
    }

    #[test]
    fn move_only_report_omits_tracking_id() {
        let events = SyntheticStream::new()
            .report(0, |r| {
                r.down(0, 1, 0, 0);
            })
            .report(10, |r| {
                r.move_to(0, 5, 5);
            })
            .build();
        let second_frame_start = events
            .iter()
            .position(|e| e.timestamp_ms == 10)
            .expect("second frame present");
        assert!(events[second_frame_start..]
            .iter()
            .all(|e| e.code != ABS_MT_TRACKING_ID || e.timestamp_ms != 10));
    }

    #[test]
    fn lift_writes_sentinel_tracking_id() {
        let events = SyntheticStream::new()
            .report(0, |r| {
                r.down(0, 1, 0, 0);
            })
            .report(10, |r| {
                r.up(0);
            })
            .build();
        assert!(events
            .iter()
            .any(|e| e.code == ABS_MT_TRACKING_ID && e.value == LIFT));
    }
}
