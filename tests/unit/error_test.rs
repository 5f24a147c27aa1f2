//! Tests for error types

use fleet_batcher::core::FleetError;

#[test]
fn test_capacity_shortfall_error() {
    let err = FleetError::CapacityShortfall {
        job: "batch-n00dles".to_string(),
        task: "grow.js".to_string(),
        remaining: 7,
    };
    assert_eq!(
        format!("{}", err),
        "capacity shortfall: job `batch-n00dles` task `grow.js` has 7 unplaced instances"
    );
}

#[test]
fn test_invalid_timing_error() {
    let err = FleetError::InvalidTiming {
        stage: "hack",
        delay_ms: -200.0,
    };
    assert_eq!(format!("{}", err), "invalid timing: stage `hack` would start at -200ms");
}

#[test]
fn test_dispatch_error() {
    let err = FleetError::Dispatch {
        job: "share".to_string(),
        task: "share.js".to_string(),
        node: "foodnstuff".to_string(),
        reason: "out of ram".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "dispatch failed: job `share` task `share.js` on `foodnstuff`: out of ram"
    );
}

#[test]
fn test_string_errors() {
    assert_eq!(
        format!("{}", FleetError::UnknownNode("zer0".to_string())),
        "unknown node: zer0"
    );
    assert_eq!(
        format!("{}", FleetError::Config("bad".to_string())),
        "config error: bad"
    );
    assert_eq!(
        format!("{}", FleetError::Snapshot("missing".to_string())),
        "snapshot error: missing"
    );
}
