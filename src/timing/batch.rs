//! HWGW batch timing and sizing.
//!
//! A batch is four operations against one target: hack, weaken (offsetting the
//! hack), grow, weaken (offsetting the grow). They must *finish* in that order,
//! each `spacing` after the previous. Weaken is always the longest operation,
//! so the first weaken's finish (`weaken_time` after dispatch) anchors the rest:
//!
//! ```text
//! hack     |------------|          finishes at weaken_time - D
//! weaken1  |--------------------|  finishes at weaken_time
//! grow       |----------------|    finishes at weaken_time + D
//! weaken2    |--------------------|finishes at weaken_time + 2D
//! ```

use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;
use crate::core::{FleetError, Job, NodeFacts, Task};
use crate::timing::analyzer::{ceil_instances, floor_instances, OperationAnalyzer};

/// Intrinsic durations of the three operations against a target (ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationDurations {
    /// Hack duration.
    pub hack_ms: f64,
    /// Grow duration.
    pub grow_ms: f64,
    /// Weaken duration.
    pub weaken_ms: f64,
}

impl OperationDurations {
    /// Read the durations a target currently reports.
    pub fn of(target: &dyn NodeFacts) -> Self {
        Self {
            hack_ms: target.hack_time(),
            grow_ms: target.grow_time(),
            weaken_ms: target.weaken_time(),
        }
    }
}

/// Start delays and finish instants of one batch, relative to dispatch (ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchTiming {
    /// Hack start offset.
    pub hack_delay: f64,
    /// First weaken start offset; always zero.
    pub weaken1_delay: f64,
    /// Grow start offset.
    pub grow_delay: f64,
    /// Second weaken start offset.
    pub weaken2_delay: f64,
    /// Hack finish instant.
    pub hack_finish: f64,
    /// First weaken finish instant.
    pub weaken1_finish: f64,
    /// Grow finish instant.
    pub grow_finish: f64,
    /// Second weaken finish instant.
    pub weaken2_finish: f64,
    /// Spacing the timing was computed with.
    pub spacing: f64,
}

impl BatchTiming {
    /// Time after dispatch at which the next batch may be issued.
    pub fn cycle_ms(&self) -> f64 {
        self.weaken2_finish + self.spacing
    }

    /// Finish instants in completion order: hack, weaken1, grow, weaken2.
    pub const fn finishes(&self) -> [f64; 4] {
        [
            self.hack_finish,
            self.weaken1_finish,
            self.grow_finish,
            self.weaken2_finish,
        ]
    }
}

/// Instance counts of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchThreads {
    /// Hack instances (rounded down).
    pub hack: u32,
    /// Weaken instances offsetting the hack (rounded up).
    pub weaken1: u32,
    /// Grow instances (rounded up).
    pub grow: u32,
    /// Weaken instances offsetting the grow (rounded up).
    pub weaken2: u32,
}

impl BatchThreads {
    /// Sum of all instances.
    pub const fn total(&self) -> u32 {
        self.hack
            .saturating_add(self.weaken1)
            .saturating_add(self.grow)
            .saturating_add(self.weaken2)
    }
}

/// Computes batch delays and instance counts, and assembles batch jobs.
#[derive(Debug, Clone)]
pub struct BatchTimingEngine {
    config: BatchConfig,
}

impl BatchTimingEngine {
    /// Create an engine from batch configuration.
    pub const fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Batch configuration in use.
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Spacing between stage finishes (ms).
    pub const fn spacing(&self) -> f64 {
        self.config.spacing_ms
    }

    /// Compute start delays so the stages finish hack, weaken1, grow, weaken2,
    /// each `spacing` apart.
    ///
    /// A negative delay means the supplied durations are misordered; it is
    /// reported as [`FleetError::InvalidTiming`] rather than clamped. A NaN
    /// delay from non-finite durations is reported the same way.
    pub fn timing(&self, durations: OperationDurations) -> Result<BatchTiming, FleetError> {
        let d = self.config.spacing_ms;

        let weaken1_finish = durations.weaken_ms;
        let hack_finish = weaken1_finish - d;
        let hack_delay = hack_finish - durations.hack_ms;
        let grow_finish = weaken1_finish + d;
        let grow_delay = grow_finish - durations.grow_ms;
        let weaken2_finish = grow_finish + d;
        let weaken2_delay = weaken2_finish - durations.weaken_ms;

        for (stage, delay_ms) in [
            ("hack", hack_delay),
            ("grow", grow_delay),
            ("weaken2", weaken2_delay),
        ] {
            if delay_ms.is_nan() || delay_ms < 0.0 {
                return Err(FleetError::InvalidTiming { stage, delay_ms });
            }
        }

        Ok(BatchTiming {
            hack_delay,
            weaken1_delay: 0.0,
            grow_delay,
            weaken2_delay,
            hack_finish,
            weaken1_finish,
            grow_finish,
            weaken2_finish,
            spacing: d,
        })
    }

    /// Instance counts for one batch against `target`.
    ///
    /// Hack is rounded down so a batch never takes more than intended; the
    /// rest are rounded up so their effect is always fully offset.
    pub fn threads(
        &self,
        target: &dyn NodeFacts,
        analyzer: &dyn OperationAnalyzer,
    ) -> Result<BatchThreads, FleetError> {
        let extraction = target.max_money() * self.config.extraction_factor;
        if extraction.is_nan() || extraction <= 0.0 {
            return Err(FleetError::InvalidTask(format!(
                "target {} has no money to extract",
                target.hostname()
            )));
        }
        let weaken_per_instance = self.config.weaken_security_per_instance;

        let hack = floor_instances(analyzer.hack_instances(target, extraction));
        let weaken1 = ceil_instances(analyzer.hack_security_increase(hack) / weaken_per_instance);
        let grow = ceil_instances(analyzer.grow_instances(target, target.max_money() / extraction));
        let weaken2 = ceil_instances(analyzer.grow_security_increase(grow) / weaken_per_instance);

        Ok(BatchThreads {
            hack,
            weaken1,
            grow,
            weaken2,
        })
    }

    /// Assemble a batch job against `target` with workers copied from `source`.
    ///
    /// Tasks are ordered weaken1, hack, grow, weaken2. Each carries the target
    /// hostname and its start delay as arguments; the job's execution time is
    /// the batch cycle.
    pub fn build_job(
        &self,
        target: &dyn NodeFacts,
        analyzer: &dyn OperationAnalyzer,
        source: &str,
    ) -> Result<Job, FleetError> {
        let timing = self.timing(OperationDurations::of(target))?;
        let threads = self.threads(target, analyzer)?;

        tracing::info!(
            target_host = target.hostname(),
            total = threads.total(),
            hack = threads.hack,
            grow = threads.grow,
            weaken = threads.weaken1 + threads.weaken2,
            cycle_ms = timing.cycle_ms(),
            "creating new batch"
        );

        let scripts = &self.config.scripts;
        let hostname = target.hostname();
        let mut job = Job::new(format!("batch-{hostname}")).with_execution_time(timing.cycle_ms());
        job.add_tasks([
            stage_task(scripts.weaken.task(source, threads.weaken1), hostname, timing.weaken1_delay),
            stage_task(scripts.hack.task(source, threads.hack), hostname, timing.hack_delay),
            stage_task(scripts.grow.task(source, threads.grow), hostname, timing.grow_delay),
            stage_task(scripts.weaken.task(source, threads.weaken2), hostname, timing.weaken2_delay),
        ]);
        Ok(job)
    }
}

/// Attach target and delay to a worker task.
pub(crate) fn stage_task(task: Task, target: &str, delay_ms: f64) -> Task {
    task.with_delay(delay_ms)
        .with_arg(target)
        .with_arg(delay_ms.to_string())
}
