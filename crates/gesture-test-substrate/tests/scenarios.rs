// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Integration replay of the seeded tap/scroll/zoom/rotate/continuation
//! scenarios, each checked independently so a failure names the exact
//! scenario and assertion that diverged.

use gesture_test_substrate::scenario::{
    delayed_single_finger_click, extended_continuation_regrip, pinch_to_zoom, rotation_only,
    simple_tap, two_finger_horizontal_scroll,
};
use gesture_test_substrate::Validator;

fn run_one(name: &str, scenario: impl FnOnce(&mut Validator)) {
    let mut v = Validator::new();
    scenario(&mut v);
    let result = v.build();
    for failure in result.failures() {
        eprintln!("{name} FAILED {}: {}", failure.name, failure.message);
    }
    assert!(result.is_valid(), "{name} had {} failing check(s)", result.stats.failed);
}

#[test]
fn simple_tap_scenario() {
    run_one("simple_tap", simple_tap);
}

#[test]
fn two_finger_horizontal_scroll_scenario() {
    run_one("two_finger_horizontal_scroll", two_finger_horizontal_scroll);
}

#[test]
fn pinch_to_zoom_scenario() {
    run_one("pinch_to_zoom", pinch_to_zoom);
}

#[test]
fn rotation_only_scenario() {
    run_one("rotation_only", rotation_only);
}

#[test]
fn extended_continuation_regrip_scenario() {
    run_one("extended_continuation_regrip", extended_continuation_regrip);
}

#[test]
fn delayed_single_finger_click_scenario() {
    run_one("delayed_single_finger_click", delayed_single_finger_click);
}
