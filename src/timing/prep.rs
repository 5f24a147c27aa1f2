//! Target preparation state machine.
//!
//! Batching assumes the target sits at minimum security and maximum money.
//! The state is never stored: every cycle observes fresh facts and picks the
//! next conditioning job, so a partially failed cycle simply repeats.

use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;
use crate::core::{FleetError, Job, NodeFacts};
use crate::timing::analyzer::{ceil_instances, OperationAnalyzer};
use crate::timing::batch::stage_task;

/// Preparation state of a target, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrepState {
    /// Security is above its minimum by `delta`.
    BelowMinSecurity {
        /// Current minus minimum security.
        delta: f64,
    },
    /// Money is below its maximum; growing by `growth_factor` would fill it.
    BelowMaxMoney {
        /// Maximum over current money.
        growth_factor: f64,
    },
    /// At minimum security and maximum money.
    Ready,
}

impl PrepState {
    /// Classify a target from its current facts. Security is checked first.
    pub fn observe(target: &dyn NodeFacts) -> Self {
        let delta = target.current_security() - target.min_security();
        if delta > 0.0 {
            return Self::BelowMinSecurity { delta };
        }
        if target.current_money() < target.max_money() {
            // An empty target still has to be grown; treat it as holding one unit.
            let current = target.current_money().max(1.0);
            return Self::BelowMaxMoney {
                growth_factor: target.max_money() / current,
            };
        }
        Self::Ready
    }

    /// How far along preparation is: 0 security, 1 money, 2 ready.
    pub const fn progress(&self) -> u8 {
        match self {
            Self::BelowMinSecurity { .. } => 0,
            Self::BelowMaxMoney { .. } => 1,
            Self::Ready => 2,
        }
    }

    /// Whether steady-state batching can begin.
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A conditioning job and how long to wait before observing again.
#[derive(Debug, Clone, PartialEq)]
pub struct PrepPlan {
    /// Job to execute.
    pub job: Job,
    /// Wait after dispatch (ms).
    pub wait_ms: f64,
}

/// Builds conditioning jobs for non-ready targets.
#[derive(Debug, Clone)]
pub struct Preparer {
    config: BatchConfig,
}

impl Preparer {
    /// Create a preparer from batch configuration.
    pub const fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Plan the next conditioning job, or `None` when the target is ready.
    ///
    /// `instance_cap` bounds the total instances of the plan to what the fleet
    /// can hold right now, so preparation progresses in steps instead of
    /// failing until the fleet grows.
    pub fn plan(
        &self,
        state: &PrepState,
        target: &dyn NodeFacts,
        analyzer: &dyn OperationAnalyzer,
        source: &str,
        instance_cap: Option<u32>,
    ) -> Result<Option<PrepPlan>, FleetError> {
        let d = self.config.spacing_ms;
        let weaken_ms = target.weaken_time();
        let hostname = target.hostname();
        let scripts = &self.config.scripts;
        let per_weaken = self.config.weaken_security_per_instance;

        match *state {
            PrepState::Ready => Ok(None),
            PrepState::BelowMinSecurity { delta } => {
                let requested = ceil_instances(delta / per_weaken);
                let instances = instance_cap.map_or(requested, |cap| requested.min(cap));
                if instances < requested {
                    tracing::debug!(requested, instances, "weaken capped to fleet capacity");
                }
                tracing::info!(target_host = hostname, delta, instances, "weakening target");

                let job = Job::new(format!("prep-weaken-{hostname}"))
                    .with_task(stage_task(scripts.weaken.task(source, instances), hostname, 0.0))
                    .with_execution_time(weaken_ms + d);
                Ok(Some(PrepPlan {
                    job,
                    wait_ms: weaken_ms + d,
                }))
            }
            PrepState::BelowMaxMoney { growth_factor } => {
                // Grow finishes `d` before the offsetting weaken.
                let grow_delay = weaken_ms - d - target.grow_time();
                if grow_delay.is_nan() || grow_delay < 0.0 {
                    return Err(FleetError::InvalidTiming {
                        stage: "grow",
                        delay_ms: grow_delay,
                    });
                }

                let requested = ceil_instances(analyzer.grow_instances(target, growth_factor));
                let offset = |grow: u32| {
                    ceil_instances(analyzer.grow_security_increase(grow) / per_weaken)
                };
                let mut grow = requested;
                if let Some(cap) = instance_cap {
                    while grow > 0 && grow.saturating_add(offset(grow)) > cap {
                        let ratio = analyzer.grow_security_increase(1) / per_weaken;
                        let estimate = shrink_estimate(cap, ratio);
                        grow = if estimate < grow { estimate } else { grow - 1 };
                    }
                }
                let weaken = offset(grow);
                tracing::info!(
                    target_host = hostname,
                    growth_factor,
                    grow,
                    weaken,
                    "growing target"
                );

                let mut job = Job::new(format!("prep-grow-{hostname}"))
                    .with_execution_time(weaken_ms + d);
                job.add_tasks([
                    stage_task(scripts.grow.task(source, grow), hostname, grow_delay),
                    stage_task(scripts.weaken.task(source, weaken), hostname, 0.0),
                ]);
                Ok(Some(PrepPlan {
                    job,
                    wait_ms: weaken_ms + d,
                }))
            }
        }
    }
}

/// Largest grow count whose offsetting weaken should still fit under `cap`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn shrink_estimate(cap: u32, weaken_per_grow: f64) -> u32 {
    let estimate = (f64::from(cap) / (1.0 + weaken_per_grow.max(0.0))).floor();
    estimate.max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HostFacts;
    use crate::timing::FormulaAnalyzer;

    fn target(security: f64, money: f64) -> HostFacts {
        HostFacts {
            min_security: 5.0,
            current_security: security,
            max_money: 1_000_000.0,
            current_money: money,
            hack_time: 2000.0,
            grow_time: 3200.0,
            weaken_time: 4000.0,
            ..HostFacts::with_ram("joesguns", 0.0, 0.0)
        }
    }

    #[test]
    fn test_observe_orders_security_before_money() {
        assert!(matches!(
            PrepState::observe(&target(7.0, 10.0)),
            PrepState::BelowMinSecurity { .. }
        ));
        assert!(matches!(
            PrepState::observe(&target(5.0, 10.0)),
            PrepState::BelowMaxMoney { .. }
        ));
        assert!(PrepState::observe(&target(5.0, 1_000_000.0)).is_ready());
    }

    #[test]
    fn test_empty_target_growth_factor_is_finite() {
        match PrepState::observe(&target(5.0, 0.0)) {
            PrepState::BelowMaxMoney { growth_factor } => {
                assert!((growth_factor - 1_000_000.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_weaken_plan_offsets_delta() {
        let preparer = Preparer::new(BatchConfig::default());
        let t = target(7.5, 10.0);
        let state = PrepState::observe(&t);
        let plan = preparer
            .plan(&state, &t, &FormulaAnalyzer::default(), "home", None)
            .expect("plan")
            .expect("not ready");
        assert_eq!(plan.job.tasks().len(), 1);
        assert_eq!(plan.job.tasks()[0].instances, 50);
        assert!((plan.wait_ms - 4200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_grow_plan_finishes_before_weaken() {
        let preparer = Preparer::new(BatchConfig::default());
        let t = target(5.0, 500_000.0);
        let state = PrepState::observe(&t);
        let plan = preparer
            .plan(&state, &t, &FormulaAnalyzer::default(), "home", None)
            .expect("plan")
            .expect("not ready");
        let grow = &plan.job.tasks()[0];
        let weaken = &plan.job.tasks()[1];
        let grow_finish = grow.delay_ms + t.grow_time;
        let weaken_finish = weaken.delay_ms + t.weaken_time;
        assert!((weaken_finish - grow_finish - 200.0).abs() < f64::EPSILON);
        assert!(grow.instances > 0);
        assert!(weaken.instances > 0);
    }

    #[test]
    fn test_grow_plan_respects_cap() {
        let preparer = Preparer::new(BatchConfig::default());
        let t = target(5.0, 1.0);
        let state = PrepState::observe(&t);
        let plan = preparer
            .plan(&state, &t, &FormulaAnalyzer::default(), "home", Some(100))
            .expect("plan")
            .expect("not ready");
        let total: u32 = plan.job.tasks().iter().map(|t| t.instances).sum();
        assert!(total <= 100);
        assert!(plan.job.tasks()[0].instances > 0);
    }

    #[test]
    fn test_tiny_delta_plans_one_weaken() {
        let preparer = Preparer::new(BatchConfig::default());
        let state = PrepState::BelowMinSecurity { delta: 1e-12 };
        let t = target(5.0 + 1e-12, 10.0);
        let plan = preparer
            .plan(&state, &t, &FormulaAnalyzer::default(), "home", None)
            .expect("plan")
            .expect("not ready");
        assert_eq!(plan.job.tasks()[0].instances, 1);
    }

    #[test]
    fn test_nan_grow_time_is_invalid() {
        let preparer = Preparer::new(BatchConfig::default());
        let t = HostFacts {
            grow_time: f64::NAN,
            ..target(5.0, 500_000.0)
        };
        let state = PrepState::observe(&t);
        let result = preparer.plan(&state, &t, &FormulaAnalyzer::default(), "home", None);
        assert!(matches!(
            result,
            Err(FleetError::InvalidTiming { stage: "grow", .. })
        ));
    }
}
