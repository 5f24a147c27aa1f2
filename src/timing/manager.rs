//! Steady-state batch loop against one target.
//!
//! Every cycle re-reads the target, prepares it if needed, and otherwise
//! issues one HWGW batch. The loop then sleeps for the computed duration of
//! whatever it dispatched; remote completion is never polled.

use std::sync::Arc;

use crate::core::{FleetError, NodeFacts};
use crate::dispatch::Dispatcher;
use crate::registry::HostProbe;
use crate::runtime::Cluster;
use crate::timing::{BatchTimingEngine, OperationAnalyzer, PrepState, Preparer};
use crate::util::time::{format_duration_ms, ms_to_duration};

/// Result of one manager cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// State observed at the start of the cycle.
    pub state: PrepState,
    /// Name of the dispatched job.
    pub job: String,
    /// How long to wait before the next cycle (ms).
    pub wait_ms: f64,
}

/// Drives preparation and batching of one target on a cluster.
pub struct BatchManager<P, D, A> {
    cluster: Arc<Cluster<P, D>>,
    analyzer: A,
    engine: BatchTimingEngine,
    preparer: Preparer,
    target: String,
    source: String,
}

impl<P, D, A> BatchManager<P, D, A>
where
    P: HostProbe,
    D: Dispatcher,
    A: OperationAnalyzer,
{
    /// Create a manager batching `target` with workers copied from `source`.
    pub fn new(
        cluster: Arc<Cluster<P, D>>,
        analyzer: A,
        engine: BatchTimingEngine,
        target: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let preparer = Preparer::new(engine.config().clone());
        Self {
            cluster,
            analyzer,
            engine,
            preparer,
            target: target.into(),
            source: source.into(),
        }
    }

    /// Target hostname.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Observe the target and dispatch the job its state calls for.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, FleetError> {
        let facts = self.cluster.refresh_host(&self.target)?;
        let state = PrepState::observe(&facts);
        tracing::debug!(target_host = %self.target, ?state, "observed target");

        let (job, wait_ms) = if state.is_ready() {
            let job = self.engine.build_job(&facts, &self.analyzer, &self.source)?;
            let wait_ms = job.execution_time_ms.unwrap_or(self.engine.spacing());
            (job, wait_ms)
        } else {
            let probe_task = self.engine.config().scripts.weaken.task(&self.source, 1);
            let cap = self.cluster.max_instances(&probe_task)?;
            let Some(plan) =
                self.preparer
                    .plan(&state, &facts, &self.analyzer, &self.source, Some(cap))?
            else {
                return Err(FleetError::InvalidTask(format!(
                    "no preparation plan for {}",
                    facts.hostname()
                )));
            };
            (plan.job, plan.wait_ms)
        };

        self.cluster.execute(&job).await?;
        tracing::info!(
            target_host = %self.target,
            job = %job.name,
            wait = %format_duration_ms(wait_ms),
            "cycle dispatched"
        );
        Ok(CycleOutcome {
            state,
            job: job.name,
            wait_ms,
        })
    }

    /// Run cycles, sleeping between them, until `max_cycles` have completed.
    ///
    /// `None` runs forever. Capacity shortfalls and launch failures are logged
    /// and retried after the configured retry delay; any other error stops the
    /// loop.
    pub async fn run(&self, max_cycles: Option<usize>) -> Result<(), FleetError> {
        let retry_ms = self.engine.config().retry_delay_ms;
        let mut completed = 0_usize;
        while max_cycles.is_none_or(|max| completed < max) {
            let wait_ms = match self.run_cycle().await {
                Ok(outcome) => outcome.wait_ms,
                Err(err @ (FleetError::CapacityShortfall { .. } | FleetError::Dispatch { .. })) => {
                    tracing::warn!(target_host = %self.target, error = %err, "cycle failed, retrying");
                    retry_ms
                }
                Err(err) => {
                    tracing::error!(target_host = %self.target, error = %err, "batch loop stopped");
                    return Err(err);
                }
            };
            completed += 1;
            tokio::time::sleep(ms_to_duration(wait_ms)).await;
        }
        Ok(())
    }
}
