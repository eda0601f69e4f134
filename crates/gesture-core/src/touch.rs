// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Evdev multi-touch ingestion: adapts both the slot-based and `MT_SYNC`
//! protocols into a stable two-finger snapshot.

use gesture_traits::raw_event::{
    ABS_MT_POSITION_X, ABS_MT_POSITION_Y, ABS_MT_SLOT, ABS_MT_TRACKING_ID, EV_ABS,
};
use gesture_traits::RawEvent;

use crate::calibration::CalibrationParams;

/// Sentinel tracking id meaning "this slot has no finger".
pub const EMPTY_SLOT: i32 = -1;

/// One finger slot: identity, raw coordinates, and the calibrated pixel
/// position computed at the end of each report.
///
/// Raw/calibrated coordinates are retained after a finger lifts (only
/// `tracking_id` resets to [`EMPTY_SLOT`]), matching the reference
/// implementation's behavior of reading the last known position for a
/// recently-lifted finger during [`crate::recognizer`]'s geometry
/// computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerSlot {
    /// Tracking id, or [`EMPTY_SLOT`] if unoccupied.
    pub tracking_id: i32,
    /// Raw device X.
    pub raw_x: i32,
    /// Raw device Y.
    pub raw_y: i32,
    /// Calibrated screen X.
    pub x: i32,
    /// Calibrated screen Y.
    pub y: i32,
    set_this_time: bool,
}

impl FingerSlot {
    /// An unoccupied slot.
    pub const EMPTY: Self = Self {
        tracking_id: EMPTY_SLOT,
        raw_x: 0,
        raw_y: 0,
        x: 0,
        y: 0,
        set_this_time: false,
    };

    /// Whether this slot currently holds no finger.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tracking_id < 0
    }
}

/// A completed frame: the two-slot snapshot and how many fingers are down.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// The two finger slots as of this report.
    pub slots: [FingerSlot; 2],
    /// Number of non-empty slots (0, 1, or 2).
    pub fingers_down: u8,
}

/// Adapts the evdev byte stream into [`TickInput`] snapshots.
///
/// Starts assuming the slot protocol (`useSlots = true`); the first
/// `SYN_MT_REPORT` seen while in that state flips it to the legacy `MT_SYNC`
/// protocol permanently (until an explicit `ABS_MT_SLOT` event flips it
/// back).
pub struct TouchTracker {
    use_slots: bool,
    current_slot: i32,
    slots: [FingerSlot; 2],
    temp: FingerSlot,
    calibration: CalibrationParams,
    screen_w: u32,
    screen_h: u32,
}

impl TouchTracker {
    /// Create a tracker with an identity calibration over a 1x1 screen; call
    /// [`Self::set_calibration`]/[`Self::set_screen_size`] before real use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            use_slots: true,
            current_slot: 0,
            slots: [FingerSlot::EMPTY; 2],
            temp: FingerSlot::EMPTY,
            calibration: CalibrationParams::identity(1),
            screen_w: 1,
            screen_h: 1,
        }
    }

    /// Update the calibration transform applied to future reports.
    pub fn set_calibration(&mut self, calibration: CalibrationParams) {
        self.calibration = calibration;
    }

    /// Update the screen size calibration maps onto.
    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen_w = width.max(1);
        self.screen_h = height.max(1);
    }

    /// Feed one raw evdev record. Returns `Some` exactly when a `SYN_REPORT`
    /// completes a frame.
    pub fn ingest(&mut self, event: RawEvent) -> Option<TickInput> {
        if event.is_syn_mt_report() {
            self.on_syn_mt_report();
            return None;
        }
        if event.is_syn_report() {
            return Some(self.on_syn_report());
        }
        if event.event_type == EV_ABS {
            self.on_abs(event.code, event.value);
        }
        None
    }

    fn on_abs(&mut self, code: u16, value: i32) {
        match code {
            ABS_MT_SLOT => {
                if !self.use_slots {
                    self.use_slots = true;
                }
                self.current_slot = if (0..2).contains(&value) { value } else { -1 };
            },
            ABS_MT_TRACKING_ID | ABS_MT_POSITION_X | ABS_MT_POSITION_Y => {
                self.write_field(code, value);
            },
            _ => {},
        }
    }

    fn write_field(&mut self, code: u16, value: i32) {
        let target = if self.use_slots {
            if self.current_slot < 0 {
                return;
            }
            &mut self.slots[self.current_slot as usize]
        } else {
            &mut self.temp
        };
        match code {
            ABS_MT_TRACKING_ID => target.tracking_id = value,
            ABS_MT_POSITION_X => target.raw_x = value,
            ABS_MT_POSITION_Y => target.raw_y = value,
            _ => {},
        }
    }

    fn on_syn_mt_report(&mut self) {
        if self.use_slots {
            // This device actually speaks MT_SYNC; switch protocols and
            // discard the report that revealed it.
            self.use_slots = false;
            return;
        }

        let id = self.temp.tracking_id;
        let target = self
            .slots
            .iter()
            .position(|s| s.tracking_id == id)
            .or_else(|| self.slots.iter().position(FingerSlot::is_empty));

        if let Some(i) = target {
            self.slots[i].tracking_id = id;
            self.slots[i].raw_x = self.temp.raw_x;
            self.slots[i].raw_y = self.temp.raw_y;
            self.slots[i].set_this_time = true;
        }
    }

    fn on_syn_report(&mut self) -> TickInput {
        if !self.use_slots {
            for slot in &mut self.slots {
                if slot.set_this_time {
                    slot.set_this_time = false;
                } else {
                    slot.tracking_id = EMPTY_SLOT;
                }
            }
            self.temp = FingerSlot::EMPTY;
        }

        let mut fingers_down = 0u8;
        for slot in &mut self.slots {
            if !slot.is_empty() {
                fingers_down += 1;
            }
            // Calibration runs even on a slot that just went empty this
            // report, so the last-known position stays fresh for callers
            // (e.g. tap click-mode warp targets) that read it after release.
            let (x, y) = self
                .calibration
                .transform(slot.raw_x, slot.raw_y, self.screen_w, self.screen_h);
            slot.x = x;
            slot.y = y;
        }

        TickInput {
            slots: self.slots,
            fingers_down,
        }
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_traits::raw_event::{EV_SYN, SYN_MT_REPORT, SYN_REPORT};

    fn abs(code: u16, value: i32) -> RawEvent {
        RawEvent::new(EV_ABS, code, value, 0)
    }
    fn syn() -> RawEvent {
        RawEvent::new(EV_SYN, SYN_REPORT, 0, 0)
    }

    #[test]
    fn slot_protocol_basic_two_finger_down() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 7));
        t.ingest(abs(ABS_MT_POSITION_X, 100));
        t.ingest(abs(ABS_MT_POSITION_Y, 200));
        t.ingest(abs(ABS_MT_SLOT, 1));
        t.ingest(abs(ABS_MT_TRACKING_ID, 8));
        t.ingest(abs(ABS_MT_POSITION_X, 300));
        t.ingest(abs(ABS_MT_POSITION_Y, 400));
        let tick = t.ingest(syn()).expect("syn report completes a frame");
        assert_eq!(tick.fingers_down, 2);
        assert_eq!(tick.slots[0].tracking_id, 7);
        assert_eq!(tick.slots[1].tracking_id, 8);
    }

    #[test]
    fn slot_stability_across_ticks() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 7));
        t.ingest(abs(ABS_MT_POSITION_X, 0));
        t.ingest(abs(ABS_MT_POSITION_Y, 0));
        t.ingest(syn());

        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_POSITION_X, 10));
        let tick = t.ingest(syn()).unwrap();
        assert_eq!(tick.slots[0].tracking_id, 7);
        assert_eq!(tick.slots[0].raw_x, 10);
    }

    #[test]
    fn finger_lift_clears_slot_but_keeps_last_position() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 7));
        t.ingest(abs(ABS_MT_POSITION_X, 42));
        t.ingest(syn());

        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, -1));
        let tick = t.ingest(syn()).unwrap();
        assert_eq!(tick.fingers_down, 0);
        assert!(tick.slots[0].is_empty());
        assert_eq!(tick.slots[0].raw_x, 42);
    }

    #[test]
    fn mt_sync_protocol_flip_and_two_fingers() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);

        // First MT_SYNC report flips protocols and is itself discarded.
        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(abs(ABS_MT_POSITION_X, 50));
        t.ingest(abs(ABS_MT_POSITION_Y, 60));
        let none = t.ingest(RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0));
        assert!(none.is_none());

        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(abs(ABS_MT_POSITION_X, 50));
        t.ingest(abs(ABS_MT_POSITION_Y, 60));
        t.ingest(RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 2));
        t.ingest(abs(ABS_MT_POSITION_X, 150));
        t.ingest(abs(ABS_MT_POSITION_Y, 160));
        t.ingest(RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0));
        let tick = t.ingest(syn()).unwrap();
        assert_eq!(tick.fingers_down, 2);
    }

    #[test]
    fn mt_sync_missing_slot_cleared_on_syn_report() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0)); // flips protocol
        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0));
        let tick = t.ingest(syn()).unwrap();
        assert_eq!(tick.fingers_down, 1);

        // Next frame: no MT_SYNC report at all -> the finger disappears.
        let tick2 = t.ingest(syn()).unwrap();
        assert_eq!(tick2.fingers_down, 0);
    }

    #[test]
    fn third_finger_on_full_slots_is_dropped() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(abs(ABS_MT_SLOT, 1));
        t.ingest(abs(ABS_MT_TRACKING_ID, 2));
        t.ingest(syn());
        let tick = t.ingest(syn()).unwrap();
        assert_eq!(tick.fingers_down, 2);
    }

    #[test]
    fn calibration_applied_to_slots() {
        let mut t = TouchTracker::new();
        t.set_screen_size(1000, 1000);
        t.set_calibration(CalibrationParams::identity(2000));
        t.ingest(abs(ABS_MT_SLOT, 0));
        t.ingest(abs(ABS_MT_TRACKING_ID, 1));
        t.ingest(abs(ABS_MT_POSITION_X, 1000));
        t.ingest(abs(ABS_MT_POSITION_Y, 1000));
        let tick = t.ingest(syn()).unwrap();
        assert_eq!((tick.slots[0].x, tick.slots[0].y), (500, 500));
    }
}
