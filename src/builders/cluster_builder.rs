//! Builders to construct a cluster and its batch manager from configuration.

use std::sync::Arc;

use crate::config::FleetConfig;
use crate::core::{AuditSink, FleetError, Scheduler, TracingAuditSink};
use crate::dispatch::Dispatcher;
use crate::registry::{FleetSnapshot, HostProbe, NodeRegistry};
use crate::runtime::Cluster;
use crate::timing::{BatchManager, BatchTimingEngine, OperationAnalyzer};

/// Build a node registry, from the configured snapshot when one exists.
///
/// Node overrides from configuration are applied on top of whatever the
/// snapshot says.
pub fn build_registry<P: HostProbe>(
    cfg: &FleetConfig,
    probe: P,
) -> Result<NodeRegistry<P>, FleetError> {
    let snapshot = match &cfg.snapshot_path {
        Some(path) => FleetSnapshot::load(path)?,
        None => None,
    };

    let mut registry = match snapshot {
        Some(snapshot) => NodeRegistry::from_snapshot(probe, cfg.root_host.clone(), &snapshot)?,
        None => NodeRegistry::new(probe, cfg.root_host.clone()),
    };
    for node in &cfg.nodes {
        registry.set_options(node.hostname.clone(), node.options());
    }
    Ok(registry)
}

/// Build a scheduler with the configured poll interval and audit sink.
pub fn build_scheduler(cfg: &FleetConfig, audit: Option<Box<dyn AuditSink>>) -> Scheduler {
    let scheduler = Scheduler::new(cfg.lock_poll_interval());
    scheduler.with_audit(audit.unwrap_or_else(|| Box::new(TracingAuditSink)))
}

/// Build and initialize a cluster from configuration.
///
/// Validates the configuration, loads or discovers the node list, and
/// refreshes every node once before returning.
pub fn build_cluster<P, D>(
    cfg: &FleetConfig,
    probe: P,
    dispatcher: D,
    audit: Option<Box<dyn AuditSink>>,
) -> Result<Cluster<P, D>, FleetError>
where
    P: HostProbe,
    D: Dispatcher,
{
    cfg.validate()
        .map_err(|e| FleetError::Config(format!("config invalid: {e}")))?;

    let registry = build_registry(cfg, probe)?;
    let scheduler = build_scheduler(cfg, audit);
    let cluster = Cluster::new(registry, scheduler, dispatcher);
    cluster.initialize()?;
    Ok(cluster)
}

/// Build a batch manager for `target`, copying workers from the root host.
pub fn build_manager<P, D, A>(
    cfg: &FleetConfig,
    cluster: Arc<Cluster<P, D>>,
    analyzer: A,
    target: impl Into<String>,
) -> BatchManager<P, D, A>
where
    P: HostProbe,
    D: Dispatcher,
    A: OperationAnalyzer,
{
    let engine = BatchTimingEngine::new(cfg.batch.clone());
    BatchManager::new(cluster, analyzer, engine, target, cfg.root_host.clone())
}
