// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Recording [`OutputSink`] that captures every call for later assertion.

use std::sync::Mutex;

use gesture_traits::{BackendResult, OutputSink};

/// One recorded call, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `warp_pointer(x, y)`
    Warp(i32, i32),
    /// `press_button(code)`
    PressButton(u32),
    /// `release_button(code)`
    ReleaseButton(u32),
    /// `press_key(keysym)`
    PressKey(u32),
    /// `release_key(keysym)`
    ReleaseKey(u32),
    /// `flush()`
    Flush,
    /// `grab_input()`
    Grab,
    /// `ungrab_input()`
    Ungrab,
}

/// An [`OutputSink`] that never fails and records everything, for scenario
/// assertions against an exact call sequence.
#[derive(Debug, Default)]
pub struct RecordingOutputSink {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingOutputSink {
    /// A sink with no recorded calls yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls with `Flush` entries stripped, for scenarios that only
    /// care about the semantic action sequence.
    #[must_use]
    pub fn calls_without_flush(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != RecordedCall::Flush)
            .collect()
    }

    /// Discard all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl OutputSink for RecordingOutputSink {
    fn warp_pointer(&self, x: i32, y: i32) -> BackendResult<()> {
        self.record(RecordedCall::Warp(x, y));
        Ok(())
    }

    fn press_button(&self, code: u32) -> BackendResult<()> {
        self.record(RecordedCall::PressButton(code));
        Ok(())
    }

    fn release_button(&self, code: u32) -> BackendResult<()> {
        self.record(RecordedCall::ReleaseButton(code));
        Ok(())
    }

    fn press_key(&self, keysym: u32) -> BackendResult<()> {
        self.record(RecordedCall::PressKey(keysym));
        Ok(())
    }

    fn release_key(&self, keysym: u32) -> BackendResult<()> {
        self.record(RecordedCall::ReleaseKey(keysym));
        Ok(())
    }

    fn flush(&self) -> BackendResult<()> {
        self.record(RecordedCall::Flush);
        Ok(())
    }

    fn grab_input(&self) -> BackendResult<()> {
        self.record(RecordedCall::Grab);
        Ok(())
    }

    fn ungrab_input(&self) -> BackendResult<()> {
        self.record(RecordedCall::Ungrab);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let sink = RecordingOutputSink::new();
        sink.press_button(0x110).unwrap();
        sink.release_button(0x110).unwrap();
        sink.flush().unwrap();
        assert_eq!(
            sink.calls(),
            vec![
                RecordedCall::PressButton(0x110),
                RecordedCall::ReleaseButton(0x110),
                RecordedCall::Flush,
            ]
        );
    }

    #[test]
    fn without_flush_strips_only_flush_entries() {
        let sink = RecordingOutputSink::new();
        sink.warp_pointer(1, 2).unwrap();
        sink.flush().unwrap();
        sink.press_button(1).unwrap();
        sink.flush().unwrap();
        assert_eq!(
            sink.calls_without_flush(),
            vec![RecordedCall::Warp(1, 2), RecordedCall::PressButton(1)]
        );
    }

    #[test]
    fn clear_empties_the_log() {
        let sink = RecordingOutputSink::new();
        sink.flush().unwrap();
        sink.clear();
        assert!(sink.calls().is_empty());
    }
}
