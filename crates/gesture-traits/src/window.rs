// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Window-system query contract used by the focus/activation controller.

use crate::error::BackendResult;

/// Opaque handle to a window, stable for the lifetime of the window.
///
/// Deliberately not assumed to be a raw X11 `Window` id — the X11 backend
/// converts internally so the core never links against `x11rb` types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

impl WindowId {
    /// Wrap a raw backend-specific identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The wrapped raw identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Window/display queries the focus and activation controller needs.
///
/// All methods are synchronous; implementations are expected to cache
/// aggressively and refresh from display-server events rather than making a
/// round trip on every call (see `gesture-x11`'s window-tree walk).
pub trait WindowSystem: Send + Sync {
    /// The currently focused top-level window, if one can be determined.
    fn current_focus_window(&self) -> Option<WindowId>;

    /// The `WM_CLASS` resource name of a window, if set.
    fn window_class(&self, window: WindowId) -> Option<String>;

    /// Whether a window class is on the configured blacklist.
    fn is_blacklisted(&self, window_class: &str) -> bool;

    /// Current screen dimensions in pixels, `(width, height)`.
    fn screen_size(&self) -> BackendResult<(u32, u32)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_id_roundtrip() {
        let id = WindowId::new(42);
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn window_id_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WindowId>();
    }
}
