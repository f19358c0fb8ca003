#![allow(dead_code)]

pub const INITIAL_BALANCE: f64 = 1000.0;

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} (+/- {tolerance}), got {actual}"
    );
}

pub fn assert_tight(actual: f64, expected: f64) {
    assert_close(actual, expected, 1e-9 * expected.abs().max(1.0));
}
