// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Synthetic output contract: the only way the gesture engine reaches the
//! outside world.

use crate::error::BackendResult;

/// Sink for synthetic pointer/keyboard output and grab control.
///
/// Every method is called only from the thread that currently holds the
/// core's recognizer lock (the ingest thread, or the continuation worker
/// during its synthesized end-of-gesture tick), so implementations do not
/// need interior synchronization of their own beyond what the underlying
/// display connection requires.
pub trait OutputSink: Send + Sync {
    /// Warp the pointer to an absolute screen position.
    fn warp_pointer(&self, x: i32, y: i32) -> BackendResult<()>;

    /// Press a synthetic pointer button (evdev `BTN_*` code).
    fn press_button(&self, code: u32) -> BackendResult<()>;

    /// Release a synthetic pointer button.
    fn release_button(&self, code: u32) -> BackendResult<()>;

    /// Press a synthetic key (X11 keysym).
    fn press_key(&self, keysym: u32) -> BackendResult<()>;

    /// Release a synthetic key.
    fn release_key(&self, keysym: u32) -> BackendResult<()>;

    /// Flush any buffered output so far.
    fn flush(&self) -> BackendResult<()>;

    /// Grab the touch device's button/motion events exclusively.
    fn grab_input(&self) -> BackendResult<()>;

    /// Release a previously established grab.
    fn ungrab_input(&self) -> BackendResult<()>;
}
