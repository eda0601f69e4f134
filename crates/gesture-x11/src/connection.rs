// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Connects to the X server and verifies the extensions this backend needs
//! are present, mirroring the capability-probe-then-connect shape used
//! throughout this codebase's display-server backends.

use std::ffi::CString;

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as _;
use x11rb::protocol::xinput::{ConnectionExt as _, Device};
use x11rb::protocol::xproto::Window;
use x11rb::protocol::xtest::ConnectionExt as _;
use x11rb::rust_connection::RustConnection;

use crate::error::{Error, Result};

/// Minimum protocol versions this backend was written against.
const REQUIRED_XTEST: (u8, u16) = (2, 2);
const REQUIRED_RANDR: (u32, u32) = (1, 3);
const REQUIRED_XINPUT: (u16, u16) = (2, 0);

/// An established connection plus the root window and XInput2 device id of
/// the configured touch device.
pub struct X11Connection {
    conn: RustConnection,
    screen_num: usize,
    root: Window,
    touch_device_id: u16,
}

impl X11Connection {
    /// Connect to the X server named by `$DISPLAY`, verify every extension
    /// this backend depends on, and resolve `device_name` (the evdev
    /// device's kernel name, as reported by `EVIOCGNAME`) to an XInput2
    /// device id.
    ///
    /// Returns [`Error::ExtensionUnavailable`] or [`Error::DeviceNotFound`]
    /// on conditions the caller treats as fatal; callers propagate these to a
    /// process exit code.
    pub fn connect(device_name: &str) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn.setup().roots[screen_num].root;

        info!(screen_num, "connected to X server");

        require_xtest(&conn)?;
        require_randr(&conn)?;
        require_xinput(&conn)?;

        let touch_device_id = find_xinput_device(&conn, device_name)?;
        debug!(touch_device_id, device_name, "resolved XInput2 device id");

        Ok(Self {
            conn,
            screen_num,
            root,
            touch_device_id,
        })
    }

    /// The underlying connection, for request helpers in sibling modules.
    #[must_use]
    pub fn raw(&self) -> &RustConnection {
        &self.conn
    }

    /// The screen number this connection was opened against.
    #[must_use]
    pub const fn screen_num(&self) -> usize {
        self.screen_num
    }

    /// The root window of the active screen.
    #[must_use]
    pub const fn root(&self) -> Window {
        self.root
    }

    /// The XInput2 device id of the configured touch device.
    #[must_use]
    pub const fn touch_device_id(&self) -> u16 {
        self.touch_device_id
    }
}

fn require_xtest(conn: &RustConnection) -> Result<()> {
    let version = conn
        .xtest_get_version(REQUIRED_XTEST.0, REQUIRED_XTEST.1.into())?
        .reply()?;
    if (version.major_version, version.minor_version) < REQUIRED_XTEST {
        return Err(Error::ExtensionUnavailable(format!(
            "XTEST {}.{} < required {}.{}",
            version.major_version, version.minor_version, REQUIRED_XTEST.0, REQUIRED_XTEST.1
        )));
    }
    Ok(())
}

fn require_randr(conn: &RustConnection) -> Result<()> {
    let version = conn
        .randr_query_version(REQUIRED_RANDR.0, REQUIRED_RANDR.1)?
        .reply()?;
    if (version.major_version, version.minor_version) < REQUIRED_RANDR {
        return Err(Error::ExtensionUnavailable(format!(
            "RANDR {}.{} < required {}.{}",
            version.major_version, version.minor_version, REQUIRED_RANDR.0, REQUIRED_RANDR.1
        )));
    }
    Ok(())
}

fn require_xinput(conn: &RustConnection) -> Result<()> {
    let version = conn
        .xinput_xi_query_version(REQUIRED_XINPUT.0, REQUIRED_XINPUT.1)?
        .reply()?;
    if (version.major_version, version.minor_version) < REQUIRED_XINPUT {
        return Err(Error::ExtensionUnavailable(format!(
            "XInput2 {}.{} < required {}.{}",
            version.major_version, version.minor_version, REQUIRED_XINPUT.0, REQUIRED_XINPUT.1
        )));
    }
    Ok(())
}

/// Walk the XInput2 device list looking for one whose advertised name
/// matches the evdev device's kernel name.
fn find_xinput_device(conn: &RustConnection, device_name: &str) -> Result<u16> {
    let devices = conn.xinput_xi_query_device(Device::ALL)?.reply()?;
    for info in devices.infos {
        let name = CString::new(info.name).unwrap_or_default();
        if name.to_string_lossy() == device_name {
            return Ok(info.deviceid);
        }
    }
    Err(Error::DeviceNotFound(device_name.to_string()))
}
