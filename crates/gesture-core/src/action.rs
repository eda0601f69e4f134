// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Symbolic output actions and the executor that turns them into synthetic
//! events through an [`OutputSink`].

use bitflags::bitflags;
use gesture_traits::{BackendResult, OutputSink};

bitflags! {
    /// Modifier keys held while an action's main event fires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift
        const SHIFT = 0b0001;
        /// Control
        const CONTROL = 0b0010;
        /// Alt
        const ALT = 0b0100;
        /// Super / Meta
        const SUPER = 0b1000;
    }
}

/// Fixed press/release ordering for modifiers: Shift, Control, Alt, Super.
const MODIFIER_ORDER: [(Modifiers, u32); 4] = [
    (Modifiers::SHIFT, 0xffe1),
    (Modifiers::CONTROL, 0xffe3),
    (Modifiers::ALT, 0xffe9),
    (Modifiers::SUPER, 0xffeb),
];

bitflags! {
    /// Which edges of an action to emit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Phase: u8 {
        /// Emit the press edge (and leading modifier presses).
        const PRESS = 0b01;
        /// Emit the release edge (and trailing modifier releases).
        const RELEASE = 0b10;
    }
}

impl Phase {
    /// Press then release, as one atomic executor call.
    pub const BOTH: Self = Self::from_bits_truncate(Self::PRESS.bits() | Self::RELEASE.bits());
}

/// The main event an [`Action`] fires, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// No output at all, even if modifiers are set.
    None,
    /// Synthetic pointer button (evdev `BTN_*` code).
    Button(u32),
    /// Synthetic key (X11 keysym).
    Key(u32),
}

/// A symbolic output event: a main event plus the modifiers held for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    /// The main event.
    pub kind: ActionKind,
    /// Modifiers to hold while the main event is active.
    pub modifiers: Modifiers,
}

impl Action {
    /// The no-op action: emits nothing regardless of phase or modifiers.
    pub const NONE: Self = Self {
        kind: ActionKind::None,
        modifiers: Modifiers::empty(),
    };

    /// A bare button action with no modifiers.
    #[must_use]
    pub const fn button(code: u32) -> Self {
        Self {
            kind: ActionKind::Button(code),
            modifiers: Modifiers::empty(),
        }
    }

    /// A bare key action with no modifiers.
    #[must_use]
    pub const fn key(keysym: u32) -> Self {
        Self {
            kind: ActionKind::Key(keysym),
            modifiers: Modifiers::empty(),
        }
    }

    /// Attach modifiers to this action.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this action emits anything at all.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self.kind, ActionKind::None)
    }
}

/// Execute `action` for the given `phase` through `output`.
///
/// Press order: each set modifier in `Shift, Control, Alt, Super` order, then
/// the main event. Release order: the main event, then each set modifier in
/// the same `Shift, Control, Alt, Super` order. [`Action::NONE`] emits
/// nothing even if `modifiers` happens to be non-empty. The call flushes the
/// sink exactly once at the end, so a `Phase::BOTH` call is atomic from the
/// caller's perspective.
pub fn execute(output: &dyn OutputSink, action: &Action, phase: Phase) -> BackendResult<()> {
    if action.is_none() {
        return Ok(());
    }

    if phase.contains(Phase::PRESS) {
        for (flag, keysym) in MODIFIER_ORDER {
            if action.modifiers.contains(flag) {
                output.press_key(keysym)?;
            }
        }
        press_main(output, action.kind)?;
    }

    if phase.contains(Phase::RELEASE) {
        release_main(output, action.kind)?;
        for (flag, keysym) in MODIFIER_ORDER.into_iter().rev() {
            if action.modifiers.contains(flag) {
                output.release_key(keysym)?;
            }
        }
    }

    output.flush()
}

fn press_main(output: &dyn OutputSink, kind: ActionKind) -> BackendResult<()> {
    match kind {
        ActionKind::None => Ok(()),
        ActionKind::Button(code) => output.press_button(code),
        ActionKind::Key(keysym) => output.press_key(keysym),
    }
}

fn release_main(output: &dyn OutputSink, kind: ActionKind) -> BackendResult<()> {
    match kind {
        ActionKind::None => Ok(()),
        ActionKind::Button(code) => output.release_button(code),
        ActionKind::Key(keysym) => output.release_key(keysym),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
    }

    impl OutputSink for RecordingSink {
        fn warp_pointer(&self, x: i32, y: i32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("warp({x},{y})"));
            Ok(())
        }
        fn press_button(&self, code: u32) -> BackendResult<()> {
            self.calls.lock().unwrap().push(format!("press_button({code})"));
            Ok(())
        }
        fn release_button(&self, code: u32) -> BackendResult<()> {
            self.calls
                .lock().unwrap()
                .push(format!("release_button({code})"));
            Ok(())
        }
        fn press_key(&self, keysym: u32) -> BackendResult<()> {
            self.calls
                .lock().unwrap()
                .push(format!("press_key({keysym:#x})"));
            Ok(())
        }
        fn release_key(&self, keysym: u32) -> BackendResult<()> {
            self.calls
                .lock().unwrap()
                .push(format!("release_key({keysym:#x})"));
            Ok(())
        }
        fn flush(&self) -> BackendResult<()> {
            self.calls.lock().unwrap().push("flush".to_string());
            Ok(())
        }
        fn grab_input(&self) -> BackendResult<()> {
            Ok(())
        }
        fn ungrab_input(&self) -> BackendResult<()> {
            Ok(())
        }
    }

    #[test]
    fn none_action_emits_nothing() {
        let sink = RecordingSink::default();
        execute(&sink, &Action::NONE.with_modifiers(Modifiers::SHIFT), Phase::BOTH).unwrap();
        assert!(sink.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn bare_button_tap_sequence() {
        let sink = RecordingSink::default();
        execute(&sink, &Action::button(0x110), Phase::BOTH).unwrap();
        assert_eq!(
            *sink.calls.lock().unwrap(),
            vec!["press_button(272)", "release_button(272)", "flush"]
        );
    }

    #[test]
    fn modifier_press_release_order() {
        let sink = RecordingSink::default();
        let action =
            Action::key(0xff52).with_modifiers(Modifiers::CONTROL | Modifiers::SHIFT);
        execute(&sink, &action, Phase::BOTH).unwrap();
        assert_eq!(
            *sink.calls.lock().unwrap(),
            vec![
                "press_key(0xffe1)",
                "press_key(0xffe3)",
                "press_key(0xff52)",
                "release_key(0xff52)",
                "release_key(0xffe3)",
                "release_key(0xffe1)",
                "flush",
            ]
        );
    }

    #[test]
    fn press_only_phase() {
        let sink = RecordingSink::default();
        execute(&sink, &Action::button(0x110), Phase::PRESS).unwrap();
        assert_eq!(*sink.calls.lock().unwrap(), vec!["press_button(272)", "flush"]);
    }
}
