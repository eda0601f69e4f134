// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! The raw evdev record type the touch tracker consumes.
//!
//! Deliberately mirrors the kernel's `struct input_event` wire shape rather
//! than the `evdev` crate's own event enum, so `gesture_core` never needs
//! that crate as a dependency — only `gesture-x11` (the real backend) and
//! `gesture-test-substrate` (synthetic streams) produce these.

/// `EV_SYN` — synchronization event type.
pub const EV_SYN: u16 = 0x00;
/// `EV_ABS` — absolute axis event type.
pub const EV_ABS: u16 = 0x03;
/// `EV_MSC` — miscellaneous event type (ignored by the tracker).
pub const EV_MSC: u16 = 0x04;

/// `SYN_REPORT` — end of an input frame.
pub const SYN_REPORT: u16 = 0x00;
/// `SYN_MT_REPORT` — end of one finger's data, MT_SYNC protocol only.
pub const SYN_MT_REPORT: u16 = 0x02;

/// `ABS_MT_SLOT` — select the active multi-touch slot.
pub const ABS_MT_SLOT: u16 = 0x2f;
/// `ABS_MT_TRACKING_ID` — per-slot tracking id (−1 = finger lifted).
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
/// `ABS_MT_POSITION_X` — per-slot raw X coordinate.
pub const ABS_MT_POSITION_X: u16 = 0x35;
/// `ABS_MT_POSITION_Y` — per-slot raw Y coordinate.
pub const ABS_MT_POSITION_Y: u16 = 0x36;

/// One evdev record: `{type, code, value}` plus a kernel timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// Event type (`EV_SYN`, `EV_ABS`, `EV_MSC`, ...).
    pub event_type: u16,
    /// Event code, meaning depends on `event_type`.
    pub code: u16,
    /// Event value.
    pub value: i32,
    /// Kernel timestamp in milliseconds since an arbitrary epoch.
    pub timestamp_ms: u64,
}

impl RawEvent {
    /// Build a raw event from its wire fields.
    #[must_use]
    pub const fn new(event_type: u16, code: u16, value: i32, timestamp_ms: u64) -> Self {
        Self {
            event_type,
            code,
            value,
            timestamp_ms,
        }
    }

    /// Whether this is the end-of-frame `SYN_REPORT`.
    #[must_use]
    pub const fn is_syn_report(&self) -> bool {
        self.event_type == EV_SYN && self.code == SYN_REPORT
    }

    /// Whether this is a legacy `SYN_MT_REPORT` (MT_SYNC protocol marker).
    #[must_use]
    pub const fn is_syn_mt_report(&self) -> bool {
        self.event_type == EV_SYN && self.code == SYN_MT_REPORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syn_report_detection() {
        let e = RawEvent::new(EV_SYN, SYN_REPORT, 0, 0);
        assert!(e.is_syn_report());
        assert!(!e.is_syn_mt_report());
    }

    #[test]
    fn syn_mt_report_detection() {
        let e = RawEvent::new(EV_SYN, SYN_MT_REPORT, 0, 0);
        assert!(e.is_syn_mt_report());
        assert!(!e.is_syn_report());
    }

    #[test]
    fn raw_event_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RawEvent>();
    }
}
