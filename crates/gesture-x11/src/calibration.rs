// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Reads the `xf86-input-evdev` axis-calibration device properties so the
//! daemon doesn't need its own calibration UI.

use tracing::warn;
use x11rb::connection::Connection;
use x11rb::protocol::xinput::{ConnectionExt as _, GetDevicePropertyItems};
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt as _};

use gesture_core::CalibrationParams;

use crate::connection::X11Connection;

const PROP_CALIBRATION: &str = "Evdev Axis Calibration";
const PROP_INVERSION: &str = "Evdev Axis Inversion";
const PROP_SWAP: &str = "Evdev Axes Swap";

/// Read calibration from the device's XInput2 properties, falling back to
/// `fallback_max` (typically the device's reported valuator max) for any
/// property that's absent.
pub fn read_calibration(connection: &X11Connection, fallback_max: i32) -> CalibrationParams {
    let conn = connection.raw();
    let device = connection.touch_device_id();

    let calibration = intern_and_read(conn, device, PROP_CALIBRATION)
        .and_then(|values| match values.as_slice() {
            [min_x, max_x, min_y, max_y] => Some((*min_x, *max_x, *min_y, *max_y)),
            _ => None,
        })
        .unwrap_or_else(|| {
            warn!(
                property = PROP_CALIBRATION,
                "calibration property absent, falling back to device range"
            );
            (0, fallback_max, 0, fallback_max)
        });

    let (invert_x, invert_y) = intern_and_read(conn, device, PROP_INVERSION)
        .and_then(|values| match values.as_slice() {
            [x, y] => Some((*x != 0, *y != 0)),
            _ => None,
        })
        .unwrap_or((false, false));

    let swap_axes = intern_and_read(conn, device, PROP_SWAP)
        .and_then(|values| values.first().map(|v| *v != 0))
        .unwrap_or(false);

    CalibrationParams {
        min_x: calibration.0,
        max_x: calibration.1,
        min_y: calibration.2,
        max_y: calibration.3,
        swap_x: invert_x,
        swap_y: invert_y,
        swap_axes,
    }
}

fn intern_and_read(conn: &impl Connection, device: u16, name: &str) -> Option<Vec<i32>> {
    let atom = intern(conn, name)?;
    read_property_i32(conn, device, atom)
}

fn intern(conn: &impl Connection, name: &str) -> Option<Atom> {
    let reply = conn.intern_atom(true, name.as_bytes()).ok()?.reply().ok()?;
    if reply.atom == 0 {
        None
    } else {
        Some(reply.atom)
    }
}

fn read_property_i32(conn: &impl Connection, device: u16, property: Atom) -> Option<Vec<i32>> {
    let reply = conn
        .xinput_get_device_property(
            property,
            u32::from(AtomEnum::ANY),
            0,
            8,
            device as u8,
            false,
        )
        .ok()?
        .reply()
        .ok()?;

    match reply.items {
        GetDevicePropertyItems::Data8(values) => Some(values.into_iter().map(i32::from).collect()),
        GetDevicePropertyItems::Data16(values) => {
            Some(values.into_iter().map(i32::from).collect())
        },
        GetDevicePropertyItems::Data32(values) => Some(values.into_iter().map(|v| v as i32).collect()),
        GetDevicePropertyItems::InvalidValue(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_identity_shaped() {
        let fallback = gesture_core::CalibrationParams::identity(4096);
        assert_eq!(fallback.min_x, 0);
        assert_eq!(fallback.max_x, 4096);
    }
}
