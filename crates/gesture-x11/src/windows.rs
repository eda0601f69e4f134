// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! `WindowSystem` over core X11 plus the XInput2 grab used to exclusively
//! claim the touch device while a profile is active.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xinput::{ConnectionExt as _, GrabMode22};
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt as _, GetPropertyReply, Window};

use gesture_traits::{BackendResult, WindowId, WindowSystem};

use crate::connection::X11Connection;
use crate::error::Result;

/// Walking from the focused window toward the root stops after this many
/// hops even if no `WM_CLASS` was ever found.
const MAX_WALK_STEPS: u8 = 5;

/// `WindowSystem` grounded on `get_input_focus` / `query_tree` / `WM_CLASS`.
pub struct X11WindowSystem {
    connection: X11Connection,
    blacklist: Vec<String>,
}

impl X11WindowSystem {
    /// Wrap a connection plus the configured blacklist.
    #[must_use]
    pub fn new(connection: X11Connection, blacklist: Vec<String>) -> Self {
        Self {
            connection,
            blacklist,
        }
    }

    fn conn(&self) -> &x11rb::rust_connection::RustConnection {
        self.connection.raw()
    }
}

impl WindowSystem for X11WindowSystem {
    fn current_focus_window(&self) -> Option<WindowId> {
        let reply = self.conn().get_input_focus().ok()?.reply().ok()?;
        if reply.focus == 0 || reply.focus == x11rb::NONE {
            return None;
        }
        Some(WindowId::new(u64::from(reply.focus)))
    }

    fn window_class(&self, window: WindowId) -> Option<String> {
        let mut current = window.raw() as Window;
        for _ in 0..MAX_WALK_STEPS {
            if let Some(class) = read_wm_class(self.conn(), current) {
                return Some(class);
            }

            let tree = self.conn().query_tree(current).ok()?.reply().ok()?;
            if tree.parent == 0 || tree.parent == self.connection.root() {
                break;
            }
            current = tree.parent;
        }
        None
    }

    fn is_blacklisted(&self, window_class: &str) -> bool {
        self.blacklist.iter().any(|b| b == window_class)
    }

    fn screen_size(&self) -> BackendResult<(u32, u32)> {
        let geometry = self
            .conn()
            .get_geometry(self.connection.root())
            .map_err(map_err)?
            .reply()
            .map_err(map_err)?;
        Ok((u32::from(geometry.width), u32::from(geometry.height)))
    }
}

fn read_wm_class(conn: &impl Connection, window: Window) -> Option<String> {
    let reply: GetPropertyReply = conn
        .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
        .ok()?
        .reply()
        .ok()?;
    if reply.value.is_empty() {
        return None;
    }
    // WM_CLASS is two NUL-terminated strings: instance then class. The
    // second (resource class) is the one profiles and the blacklist match
    // against, mirroring `XGetClassHint`'s `res_class`.
    let mut parts = reply.value.split(|&b| b == 0).filter(|s| !s.is_empty());
    let _instance = parts.next();
    let class = parts.next().or_else(|| {
        reply
            .value
            .split(|&b| b == 0)
            .find(|s| !s.is_empty())
    })?;
    Some(String::from_utf8_lossy(class).into_owned())
}

/// Claim the touch device's button/motion events exclusively via XInput2's
/// `XIGrabButton` request (any button, any modifiers), mirroring libXi's
/// passive-grab pattern used to steal the device while a profile is active.
pub(crate) fn grab_touch_device(connection: &X11Connection) -> Result<()> {
    debug!(device = connection.touch_device_id(), "xi grab button");
    // Raw XIEventMask bits: ButtonPress (4) | ButtonRelease (5) | Motion (6).
    const BUTTON_PRESS: u32 = 1 << 4;
    const BUTTON_RELEASE: u32 = 1 << 5;
    const MOTION: u32 = 1 << 6;
    let mask = BUTTON_PRESS | BUTTON_RELEASE | MOTION;

    connection
        .raw()
        .xinput_xi_grab_button(
            connection.root(),
            0, // any button
            0, // grab_window's cursor: none
            connection.touch_device_id(),
            GrabMode22::ASYNC,
            GrabMode22::ASYNC,
            false,
            &[mask],
            &[],
        )?
        .check()?;
    Ok(())
}

/// Release the grab established by [`grab_touch_device`].
pub(crate) fn ungrab_touch_device(connection: &X11Connection) -> Result<()> {
    debug!(device = connection.touch_device_id(), "xi ungrab button");
    connection
        .raw()
        .xinput_xi_ungrab_button(0, connection.root(), connection.touch_device_id(), &[])?
        .check()?;
    Ok(())
}

fn map_err(err: impl Into<crate::error::Error>) -> gesture_traits::BackendError {
    err.into().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wm_class_splits_instance_and_class() {
        let raw = b"xterm\0XTerm\0";
        let mut parts = raw.split(|&b| b == 0).filter(|s| !s.is_empty());
        let _instance = parts.next();
        let class = parts.next().unwrap();
        assert_eq!(class, b"XTerm");
    }
}
