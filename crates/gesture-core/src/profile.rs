// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Per-window gesture configuration, with inheritance from a default profile.

use crate::action::Action;

/// Bounded-prefix length used for `WM_CLASS` comparisons, matching the
/// fixed-size 30-byte window-class field some X11 clients still report.
const WINDOW_CLASS_PREFIX_LEN: usize = 30;

/// Which groups of a [`Profile`] fall back to the default profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileInherit {
    /// Tap threshold/action inherited from the default profile.
    pub tap: bool,
    /// Scroll thresholds/steps/actions inherited from the default profile.
    pub scroll: bool,
    /// Zoom thresholds/steps/actions inherited from the default profile.
    pub zoom: bool,
    /// Rotate thresholds/steps/actions inherited from the default profile.
    pub rotate: bool,
}

/// Per-window-class gesture configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// `WM_CLASS` resource name this profile applies to (ignored for the
    /// default profile).
    pub window_class: String,

    /// Minimum two-finger travel distance, in pixels, to classify Scroll.
    pub scroll_min_distance: f64,
    /// Pixels of horizontal travel per emitted scroll-left/right step.
    pub hscroll_step: f64,
    /// Pixels of vertical travel per emitted scroll-up/down step.
    pub vscroll_step: f64,
    /// Minimum change in finger separation, in pixels, to classify Zoom.
    pub zoom_min_distance: f64,
    /// Multiplicative separation ratio per emitted zoom step.
    pub zoom_step: f64,
    /// Minimum finger separation, in pixels, to classify Rotate.
    pub rotate_min_distance: f64,
    /// Minimum rotation, in degrees, to classify Rotate.
    pub rotate_min_angle: f64,
    /// Degrees of rotation per emitted rotate step.
    pub rotate_step: f64,

    /// Action for a quiescent two-finger tap.
    pub tap_action: Action,
    /// Action held down for the duration of a scroll gesture.
    pub scroll_brace_action: Action,
    /// Action emitted per upward scroll step.
    pub scroll_up_action: Action,
    /// Action emitted per downward scroll step.
    pub scroll_down_action: Action,
    /// Action emitted per leftward scroll step.
    pub scroll_left_action: Action,
    /// Action emitted per rightward scroll step.
    pub scroll_right_action: Action,
    /// Action emitted per zoom-in step.
    pub zoom_in_action: Action,
    /// Action emitted per zoom-out step.
    pub zoom_out_action: Action,
    /// Action emitted per left rotate step.
    pub rotate_left_action: Action,
    /// Action emitted per right rotate step.
    pub rotate_right_action: Action,

    /// Which gesture groups fall back to the default profile.
    pub inherit: ProfileInherit,
}

impl Profile {
    /// A conservative built-in default profile, used when no configuration
    /// file is present.
    #[must_use]
    pub fn built_in_default() -> Self {
        Self {
            window_class: String::new(),
            scroll_min_distance: 30.0,
            hscroll_step: 50.0,
            vscroll_step: 50.0,
            zoom_min_distance: 30.0,
            zoom_step: 1.2,
            rotate_min_distance: 50.0,
            rotate_min_angle: 15.0,
            rotate_step: 15.0,
            tap_action: Action::button(0x110), // BTN_LEFT
            scroll_brace_action: Action::NONE,
            scroll_up_action: Action::key(0xff55),   // Prior / Page_Up
            scroll_down_action: Action::key(0xff56),  // Next / Page_Down
            scroll_left_action: Action::key(0xff51),  // Left
            scroll_right_action: Action::key(0xff53), // Right
            zoom_in_action: Action::NONE,
            zoom_out_action: Action::NONE,
            rotate_left_action: Action::NONE,
            rotate_right_action: Action::NONE,
            inherit: ProfileInherit::default(),
        }
    }

    fn matches_class(&self, window_class: &str) -> bool {
        let bound = WINDOW_CLASS_PREFIX_LEN;
        let a = self.window_class.as_bytes();
        let b = window_class.as_bytes();
        a[..a.len().min(bound)] == b[..b.len().min(bound)]
    }
}

/// The full set of loaded profiles plus the blacklist.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSet {
    /// The designated default profile, used when no entry matches and as the
    /// inheritance source for `*_inherit` fields.
    pub default: Profile,
    /// Per-window-class overrides, first match wins.
    pub profiles: Vec<Profile>,
    /// Window classes that never activate the grab.
    pub blacklist: Vec<String>,
}

impl ProfileSet {
    /// A profile set with only the built-in default and an empty blacklist.
    #[must_use]
    pub fn built_in() -> Self {
        Self {
            default: Profile::built_in_default(),
            profiles: Vec::new(),
            blacklist: Vec::new(),
        }
    }

    /// Look up the profile for a window's `WM_CLASS`, falling back to the
    /// default profile on no class hint or no match.
    #[must_use]
    pub fn lookup(&self, window_class: Option<&str>) -> &Profile {
        window_class
            .and_then(|wc| self.profiles.iter().find(|p| p.matches_class(wc)))
            .unwrap_or(&self.default)
    }

    /// Whether a window class is blacklisted.
    #[must_use]
    pub fn is_blacklisted(&self, window_class: &str) -> bool {
        self.blacklist.iter().any(|b| b == window_class)
    }

    /// Resolve the effective profile for a gesture group: `profile` itself,
    /// or the default profile if that group is marked inherited.
    #[must_use]
    pub fn effective<'a>(&'a self, profile: &'a Profile, group_inherit: bool) -> &'a Profile {
        if group_inherit {
            &self.default
        } else {
            profile
        }
    }
}
