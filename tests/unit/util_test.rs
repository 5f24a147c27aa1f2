//! Tests for utility functions

use std::time::Duration;

use fleet_batcher::util::{format_duration_ms, ms_to_duration, now_ms};

#[test]
fn test_format_duration() {
    assert_eq!(format_duration_ms(65_000.0), "1m,5s");
    assert_eq!(format_duration_ms(59_999.0), "59s");
    assert_eq!(format_duration_ms(0.0), "0ms");
    assert_eq!(format_duration_ms(-10.0), "0ms");
}

#[test]
fn test_ms_to_duration() {
    assert_eq!(ms_to_duration(4600.0), Duration::from_millis(4600));
    assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
}

#[test]
fn test_now_ms_advances() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}
