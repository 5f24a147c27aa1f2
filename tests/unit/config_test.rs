//! Tests for configuration validation

use fleet_batcher::config::{BatchConfig, FleetConfig, NodeOverride};

#[test]
fn test_default_fleet_config_is_valid() {
    let cfg = FleetConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.root_host, "home");
    assert_eq!(cfg.lock_poll_interval().as_millis(), 1000);

    let home = &cfg.nodes[0];
    assert_eq!(home.hostname, "home");
    assert_eq!(home.priority, 1);
    assert!((home.reserved - 32.0).abs() < f64::EPSILON);
}

#[test]
fn test_default_batch_config() {
    let batch = BatchConfig::default();
    assert!((batch.spacing_ms - 200.0).abs() < f64::EPSILON);
    assert!((batch.extraction_factor - 0.25).abs() < f64::EPSILON);
    assert!((batch.weaken_security_per_instance - 0.05).abs() < f64::EPSILON);
    assert!(batch.validate().is_ok());
}

#[test]
fn test_batch_config_invalid_extraction() {
    let invalid = BatchConfig {
        extraction_factor: 1.5,
        ..BatchConfig::default()
    };
    assert!(invalid.validate().is_err());

    let invalid = BatchConfig {
        extraction_factor: 0.0,
        ..BatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_batch_config_invalid_spacing() {
    let invalid = BatchConfig {
        spacing_ms: 0.0,
        ..BatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_fleet_config_invalid_poll_interval() {
    let invalid = FleetConfig {
        lock_poll_interval_ms: 0,
        ..FleetConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_fleet_config_negative_reserve() {
    let invalid = FleetConfig {
        nodes: vec![NodeOverride {
            hostname: "home".to_string(),
            schedulable: true,
            priority: 0,
            reserved: -1.0,
        }],
        ..FleetConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_from_json_str_fills_defaults() {
    let cfg = FleetConfig::from_json_str(
        r#"{
            "root_host": "home",
            "nodes": [{ "hostname": "darkweb", "schedulable": false }],
            "batch": { "spacing_ms": 100.0 }
        }"#,
    )
    .expect("valid json");

    assert_eq!(cfg.lock_poll_interval_ms, 1000);
    assert!(!cfg.nodes[0].schedulable);
    assert_eq!(cfg.nodes[0].priority, 0);
    assert!((cfg.batch.spacing_ms - 100.0).abs() < f64::EPSILON);
    assert!((cfg.batch.extraction_factor - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_from_json_str_rejects_invalid() {
    assert!(FleetConfig::from_json_str("{ not json").is_err());
    assert!(FleetConfig::from_json_str(r#"{ "root_host": "" }"#).is_err());
}
