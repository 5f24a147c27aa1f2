//! Tests for builder modules

use std::sync::Arc;

use fleet_batcher::builders::{build_cluster, build_manager, build_registry};
use fleet_batcher::config::{FleetConfig, NodeOverride};
use fleet_batcher::core::{AppResult, FleetError, HostFacts, InMemoryAuditSink};
use fleet_batcher::infra::{InMemoryProbe, RecordingDispatcher};
use fleet_batcher::registry::{FleetSnapshot, SnapshotEntry};
use fleet_batcher::timing::FormulaAnalyzer;

fn network() -> InMemoryProbe {
    InMemoryProbe::new()
        .with_host(HostFacts::with_ram("home", 64.0, 0.0))
        .with_host(HostFacts::with_ram("n00dles", 4.0, 0.0))
        .with_host(HostFacts::with_ram("foodnstuff", 16.0, 0.0))
        .with_link("home", "n00dles")
        .with_link("home", "foodnstuff")
}

#[test]
fn test_build_cluster_discovers_and_applies_overrides() {
    let cfg = FleetConfig::default();
    let cluster = build_cluster(&cfg, network(), RecordingDispatcher::new(), None)
        .expect("cluster builds");

    cluster.with_registry(|registry| {
        assert_eq!(registry.len(), 3);
        let home = registry.find("home").expect("home registered");
        assert_eq!(home.priority(), 1);
        assert!((home.reserved_capacity() - 32.0).abs() < f64::EPSILON);
    });

    // home is filled last
    let order: Vec<String> = cluster
        .schedulable_nodes()
        .iter()
        .map(|n| n.facts().hostname.clone())
        .collect();
    assert_eq!(order.last().map(String::as_str), Some("home"));
}

#[test]
fn test_build_cluster_rejects_invalid_config() {
    let cfg = FleetConfig {
        root_host: String::new(),
        ..FleetConfig::default()
    };
    let result = build_cluster(&cfg, network(), RecordingDispatcher::new(), None);
    assert!(matches!(result, Err(FleetError::Config(_))));
}

#[test]
fn test_build_registry_prefers_snapshot() {
    let path = std::env::temp_dir().join(format!("fleet-snapshot-{}.json", uuid::Uuid::new_v4()));
    FleetSnapshot {
        nodes: vec![SnapshotEntry {
            hostname: "foodnstuff".to_string(),
            schedulable: false,
            priority: 3,
            reserved: 0.0,
        }],
    }
    .save(&path)
    .expect("snapshot written");

    let cfg = FleetConfig {
        snapshot_path: Some(path.clone()),
        nodes: vec![NodeOverride {
            hostname: "foodnstuff".to_string(),
            schedulable: true,
            priority: 3,
            reserved: 2.0,
        }],
        ..FleetConfig::default()
    };
    let registry = build_registry(&cfg, network()).expect("registry builds");
    std::fs::remove_file(&path).ok();

    assert_eq!(registry.len(), 1);
    let node = registry.find("foodnstuff").expect("from snapshot");
    // configuration overrides win over the snapshot
    assert!(node.options().schedulable);
    assert!((node.reserved_capacity() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn test_build_manager_uses_root_as_source() {
    let cfg = FleetConfig::default();
    let audit = InMemoryAuditSink::new(16);
    let cluster = build_cluster(
        &cfg,
        network(),
        RecordingDispatcher::new(),
        Some(Box::new(audit)),
    )
    .expect("cluster builds");
    let manager = build_manager(&cfg, Arc::new(cluster), FormulaAnalyzer::default(), "n00dles");
    assert_eq!(manager.target(), "n00dles");
}

#[test]
fn test_fleet_errors_propagate_into_app_result() -> AppResult<()> {
    let cfg = FleetConfig::default();
    let cluster = build_cluster(&cfg, network(), RecordingDispatcher::new(), None)?;
    let snapshot = cluster.snapshot();
    assert_eq!(snapshot.nodes.len(), 3);

    let missing = build_cluster(
        &cfg,
        InMemoryProbe::new(),
        RecordingDispatcher::new(),
        None,
    );
    let err: anyhow::Error = missing
        .err()
        .map(Into::into)
        .ok_or_else(|| anyhow::anyhow!("expected failure"))?;
    assert!(err.to_string().contains("unknown node: home"));
    Ok(())
}
