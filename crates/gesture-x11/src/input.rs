// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Synthetic pointer/keyboard output via the XTEST extension.

use std::sync::Mutex;

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt as _, GetKeyboardMappingReply, Keycode, Keysym};
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::protocol::xproto::{
    BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, KEY_PRESS_EVENT, KEY_RELEASE_EVENT,
    MOTION_NOTIFY_EVENT,
};
use x11rb::CURRENT_TIME;

use gesture_traits::{BackendError, BackendResult, OutputSink};

use crate::connection::X11Connection;

/// [`OutputSink`] backed by XTEST fake-input requests.
///
/// Every call is synchronous and maps one-to-one onto `XTestFakeInput`,
/// exactly as `xdotool`/`libXtst` consumers drive it: motion for pointer
/// warps, button/key press-release pairs for everything else.
pub struct Xtest11Output {
    connection: X11Connection,
    keymap: Mutex<KeysymMap>,
}

impl Xtest11Output {
    /// Wrap an already-connected, extension-verified X11 connection.
    #[must_use]
    pub fn new(connection: X11Connection) -> Self {
        Self {
            connection,
            keymap: Mutex::new(KeysymMap::empty()),
        }
    }

    fn keycode_for(&self, keysym: Keysym) -> BackendResult<Keycode> {
        let mut keymap = self.keymap.lock().unwrap();
        if keymap.is_empty() {
            *keymap = KeysymMap::load(self.connection.raw()).map_err(map_err)?;
        }
        keymap
            .lookup(keysym)
            .ok_or_else(|| BackendError::Property(format!("no keycode for keysym {keysym:#x}")))
    }
}

impl OutputSink for Xtest11Output {
    fn warp_pointer(&self, x: i32, y: i32) -> BackendResult<()> {
        debug!(x, y, "xtest warp_pointer");
        self.connection
            .raw()
            .xtest_fake_input(
                MOTION_NOTIFY_EVENT,
                0,
                CURRENT_TIME,
                self.connection.root(),
                x as i16,
                y as i16,
                0,
            )
            .map_err(map_err)?;
        Ok(())
    }

    fn press_button(&self, code: u32) -> BackendResult<()> {
        fake_button(&self.connection, code, BUTTON_PRESS_EVENT)
    }

    fn release_button(&self, code: u32) -> BackendResult<()> {
        fake_button(&self.connection, code, BUTTON_RELEASE_EVENT)
    }

    fn press_key(&self, keysym: u32) -> BackendResult<()> {
        let keycode = self.keycode_for(keysym)?;
        fake_key(&self.connection, keycode, KEY_PRESS_EVENT)
    }

    fn release_key(&self, keysym: u32) -> BackendResult<()> {
        let keycode = self.keycode_for(keysym)?;
        fake_key(&self.connection, keycode, KEY_RELEASE_EVENT)
    }

    fn flush(&self) -> BackendResult<()> {
        self.connection.raw().flush().map_err(map_err)
    }

    fn grab_input(&self) -> BackendResult<()> {
        crate::windows::grab_touch_device(&self.connection).map_err(Into::into)
    }

    fn ungrab_input(&self) -> BackendResult<()> {
        crate::windows::ungrab_touch_device(&self.connection).map_err(Into::into)
    }
}

fn fake_button(conn: &X11Connection, code: u32, event_type: u8) -> BackendResult<()> {
    let button = evdev_button_to_x11(code);
    debug!(code, button, event_type, "xtest fake button");
    conn.raw()
        .xtest_fake_input(event_type, button, CURRENT_TIME, 0, 0, 0, 0)
        .map_err(map_err)?;
    Ok(())
}

/// Map an evdev `BTN_*` code to the X11 pointer button index `XTestFakeButtonEvent`
/// expects (1=left, 2=middle, 3=right), per `linux/input-event-codes.h`.
fn evdev_button_to_x11(code: u32) -> u8 {
    match code {
        0x110 => 1, // BTN_LEFT
        0x111 => 3, // BTN_RIGHT
        0x112 => 2, // BTN_MIDDLE
        0x113 => 8, // BTN_SIDE
        0x114 => 9, // BTN_EXTRA
        other => other as u8,
    }
}

fn fake_key(conn: &X11Connection, keycode: Keycode, event_type: u8) -> BackendResult<()> {
    debug!(keycode, event_type, "xtest fake key");
    conn.raw()
        .xtest_fake_input(event_type, keycode, CURRENT_TIME, 0, 0, 0, 0)
        .map_err(map_err)?;
    Ok(())
}

fn map_err(err: impl Into<crate::error::Error>) -> BackendError {
    err.into().into()
}

/// Keysym→keycode lookup built once from `GetKeyboardMapping`, the same
/// table Xlib's `XKeysymToKeycode` consults.
struct KeysymMap {
    min_keycode: Keycode,
    reply: Option<GetKeyboardMappingReply>,
}

impl KeysymMap {
    const fn empty() -> Self {
        Self {
            min_keycode: 0,
            reply: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.reply.is_none()
    }

    fn load(conn: &impl Connection) -> crate::error::Result<Self> {
        let setup = conn.setup();
        let min_keycode = setup.min_keycode;
        let count = setup.max_keycode - setup.min_keycode + 1;
        let reply = conn
            .get_keyboard_mapping(min_keycode, count)?
            .reply()?;
        Ok(Self {
            min_keycode,
            reply: Some(reply),
        })
    }

    fn lookup(&self, keysym: Keysym) -> Option<Keycode> {
        let reply = self.reply.as_ref()?;
        let per_keycode = usize::from(reply.keysyms_per_keycode);
        if per_keycode == 0 {
            return None;
        }
        for (row, syms) in reply.keysyms.chunks(per_keycode).enumerate() {
            if syms.contains(&keysym) {
                return Some(self.min_keycode + row as u8);
            }
        }
        None
    }
}
