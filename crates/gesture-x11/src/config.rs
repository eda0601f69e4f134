// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! TOML configuration model mirroring the `Profile` shape.
//!
//! A `[[profile]]` table only needs the fields it overrides; whichever
//! fields are absent fall back to `[default]` through the `*_inherit`
//! groups `gesture_core::Profile` already understands. This module's job is
//! entirely the `Option<T>` → presence-tracked `Profile` conversion — the
//! inheritance semantics themselves live in `gesture_core::profile`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use gesture_core::{Action, Profile, ProfileInherit, ProfileSet};

/// Failures loading or parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file's contents were not valid TOML for this schema.
    #[error("parsing config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// An `*_action` string didn't match `"none"`, `"button:<code>"`, or
    /// `"key:<keysym>"`.
    #[error("invalid action {0:?}")]
    InvalidAction(String),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    blacklist: Vec<String>,
    #[serde(default)]
    default: RawProfile,
    #[serde(default, rename = "profile")]
    profiles: Vec<RawProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProfile {
    window_class: Option<String>,

    scroll_min_distance: Option<f64>,
    hscroll_step: Option<f64>,
    vscroll_step: Option<f64>,
    zoom_min_distance: Option<f64>,
    zoom_step: Option<f64>,
    rotate_min_distance: Option<f64>,
    rotate_min_angle: Option<f64>,
    rotate_step: Option<f64>,

    tap_action: Option<String>,
    scroll_brace_action: Option<String>,
    scroll_up_action: Option<String>,
    scroll_down_action: Option<String>,
    scroll_left_action: Option<String>,
    scroll_right_action: Option<String>,
    zoom_in_action: Option<String>,
    zoom_out_action: Option<String>,
    rotate_left_action: Option<String>,
    rotate_right_action: Option<String>,
}

/// Parse an action string: `"none"`, `"button:0x110"`, or `"key:0xff55"`.
fn parse_action(raw: &str) -> Result<Action, ConfigError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Ok(Action::NONE);
    }
    let (kind, value) = raw
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidAction(raw.to_string()))?;
    let value = value.trim();
    let code = if let Some(hex) = value.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse::<u32>()
    }
    .map_err(|_| ConfigError::InvalidAction(raw.to_string()))?;

    match kind {
        "button" => Ok(Action::button(code)),
        "key" => Ok(Action::key(code)),
        _ => Err(ConfigError::InvalidAction(raw.to_string())),
    }
}

fn resolve_action(raw: &Option<String>) -> Result<Option<Action>, ConfigError> {
    raw.as_deref().map(parse_action).transpose()
}

impl RawProfile {
    fn into_profile(self, base: &Profile) -> Result<Profile, ConfigError> {
        let scroll_present = self.scroll_min_distance.is_some()
            || self.hscroll_step.is_some()
            || self.vscroll_step.is_some()
            || self.scroll_brace_action.is_some()
            || self.scroll_up_action.is_some()
            || self.scroll_down_action.is_some()
            || self.scroll_left_action.is_some()
            || self.scroll_right_action.is_some();
        let zoom_present = self.zoom_min_distance.is_some()
            || self.zoom_step.is_some()
            || self.zoom_in_action.is_some()
            || self.zoom_out_action.is_some();
        let rotate_present = self.rotate_min_distance.is_some()
            || self.rotate_min_angle.is_some()
            || self.rotate_step.is_some()
            || self.rotate_left_action.is_some()
            || self.rotate_right_action.is_some();
        let tap_present = self.tap_action.is_some();

        Ok(Profile {
            window_class: self.window_class.unwrap_or_default(),
            scroll_min_distance: self.scroll_min_distance.unwrap_or(base.scroll_min_distance),
            hscroll_step: self.hscroll_step.unwrap_or(base.hscroll_step),
            vscroll_step: self.vscroll_step.unwrap_or(base.vscroll_step),
            zoom_min_distance: self.zoom_min_distance.unwrap_or(base.zoom_min_distance),
            zoom_step: self.zoom_step.unwrap_or(base.zoom_step),
            rotate_min_distance: self.rotate_min_distance.unwrap_or(base.rotate_min_distance),
            rotate_min_angle: self.rotate_min_angle.unwrap_or(base.rotate_min_angle),
            rotate_step: self.rotate_step.unwrap_or(base.rotate_step),
            tap_action: resolve_action(&self.tap_action)?.unwrap_or(base.tap_action),
            scroll_brace_action: resolve_action(&self.scroll_brace_action)?
                .unwrap_or(base.scroll_brace_action),
            scroll_up_action: resolve_action(&self.scroll_up_action)?
                .unwrap_or(base.scroll_up_action),
            scroll_down_action: resolve_action(&self.scroll_down_action)?
                .unwrap_or(base.scroll_down_action),
            scroll_left_action: resolve_action(&self.scroll_left_action)?
                .unwrap_or(base.scroll_left_action),
            scroll_right_action: resolve_action(&self.scroll_right_action)?
                .unwrap_or(base.scroll_right_action),
            zoom_in_action: resolve_action(&self.zoom_in_action)?.unwrap_or(base.zoom_in_action),
            zoom_out_action: resolve_action(&self.zoom_out_action)?
                .unwrap_or(base.zoom_out_action),
            rotate_left_action: resolve_action(&self.rotate_left_action)?
                .unwrap_or(base.rotate_left_action),
            rotate_right_action: resolve_action(&self.rotate_right_action)?
                .unwrap_or(base.rotate_right_action),
            inherit: ProfileInherit {
                tap: !tap_present,
                scroll: !scroll_present,
                zoom: !zoom_present,
                rotate: !rotate_present,
            },
        })
    }
}

/// Parse a `profiles.toml` document into a [`ProfileSet`].
pub fn parse(contents: &str) -> Result<ProfileSet, ConfigError> {
    let doc: RawDocument = toml::from_str(contents)?;
    let default_base = Profile::built_in_default();
    let default = doc.default.into_profile(&default_base)?;

    let mut profiles = Vec::with_capacity(doc.profiles.len());
    for raw in doc.profiles {
        profiles.push(raw.into_profile(&default)?);
    }

    Ok(ProfileSet {
        default,
        profiles,
        blacklist: doc.blacklist,
    })
}

/// Read and parse a configuration file from disk.
pub fn load_file(path: &Path) -> Result<ProfileSet, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_built_in_default() {
        let set = parse("").unwrap();
        assert_eq!(set.default, Profile::built_in_default());
        assert!(set.profiles.is_empty());
        assert!(set.blacklist.is_empty());
    }

    #[test]
    fn profile_override_inherits_unset_groups() {
        let toml = r#"
            blacklist = ["Screensaver"]

            [[profile]]
            window_class = "Gimp"
            rotate_step = 5.0
        "#;
        let set = parse(toml).unwrap();
        assert_eq!(set.blacklist, vec!["Screensaver".to_string()]);
        let gimp = &set.profiles[0];
        assert_eq!(gimp.window_class, "Gimp");
        assert_eq!(gimp.rotate_step, 5.0);
        assert!(!gimp.inherit.rotate);
        assert!(gimp.inherit.scroll);
        assert!(gimp.inherit.zoom);
        assert!(gimp.inherit.tap);
    }

    #[test]
    fn action_strings_parse() {
        let toml = r#"
            [default]
            tap_action = "button:0x110"
            scroll_up_action = "key:0xff55"
            zoom_in_action = "none"
        "#;
        let set = parse(toml).unwrap();
        assert_eq!(set.default.tap_action, Action::button(0x110));
        assert_eq!(set.default.scroll_up_action, Action::key(0xff55));
        assert_eq!(set.default.zoom_in_action, Action::NONE);
    }

    #[test]
    fn invalid_action_is_rejected() {
        let toml = r#"
            [default]
            tap_action = "nonsense"
        "#;
        assert!(matches!(parse(toml), Err(ConfigError::InvalidAction(_))));
    }
}
