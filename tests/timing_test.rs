//! Integration tests for batch timing, sizing, and preparation planning.

use fleet_batcher::config::BatchConfig;
use fleet_batcher::core::{FleetError, HostFacts};
use fleet_batcher::timing::{
    BatchTimingEngine, FormulaAnalyzer, OperationDurations, PrepState, Preparer,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn joesguns() -> HostFacts {
    HostFacts {
        min_security: 5.0,
        current_security: 5.0,
        max_money: 1_000_000.0,
        current_money: 1_000_000.0,
        hack_time: 2000.0,
        grow_time: 3200.0,
        weaken_time: 4000.0,
        ..HostFacts::with_ram("joesguns", 16.0, 0.0)
    }
}

#[test]
fn test_finishes_are_ordered_and_spaced() {
    let engine = BatchTimingEngine::new(BatchConfig::default());
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..500 {
        let weaken_ms = f64::from(rng.random_range(1_000..600_000_u32));
        // hack and grow are fractions of weaken, as they are for real targets
        let durations = OperationDurations {
            hack_ms: weaken_ms * 0.25,
            grow_ms: weaken_ms * 0.8,
            weaken_ms,
        };
        let timing = engine.timing(durations).expect("valid durations");

        let finishes = timing.finishes();
        for pair in finishes.windows(2) {
            assert!((pair[1] - pair[0] - 200.0).abs() < 1e-6);
        }
        assert!((timing.hack_delay + durations.hack_ms - finishes[0]).abs() < 1e-6);
        assert!((timing.grow_delay + durations.grow_ms - finishes[2]).abs() < 1e-6);
        assert!((timing.weaken2_delay + durations.weaken_ms - finishes[3]).abs() < 1e-6);
        assert!(timing.hack_delay >= 0.0);
        assert!(timing.grow_delay >= 0.0);
        assert!((timing.cycle_ms() - (weaken_ms + 600.0)).abs() < 1e-6);
    }
}

#[test]
fn test_grow_longer_than_weaken_is_invalid() {
    let engine = BatchTimingEngine::new(BatchConfig::default());
    let result = engine.timing(OperationDurations {
        hack_ms: 1000.0,
        grow_ms: 5000.0,
        weaken_ms: 4000.0,
    });
    match result {
        Err(FleetError::InvalidTiming { stage, delay_ms }) => {
            assert_eq!(stage, "grow");
            assert!((delay_ms + 800.0).abs() < 1e-9);
        }
        other => panic!("expected invalid timing, got {other:?}"),
    }
}

#[test]
fn test_threads_round_hack_down_and_offsets_up() {
    let engine = BatchTimingEngine::new(BatchConfig::default());
    let analyzer = FormulaAnalyzer::default();
    let threads = engine.threads(&joesguns(), &analyzer).expect("has money");

    // 250_000 / (1_000_000 * 0.002)
    assert_eq!(threads.hack, 125);
    // 125 * 0.002 / 0.05 = 5
    assert_eq!(threads.weaken1, 5);
    // ln(4) / ln(1.0025) = 555.2...
    assert_eq!(threads.grow, 556);
    // 556 * 0.004 / 0.05 = 44.48
    assert_eq!(threads.weaken2, 45);
    assert_eq!(threads.total(), 125 + 5 + 556 + 45);
}

#[test]
fn test_threads_reject_moneyless_target() {
    let engine = BatchTimingEngine::new(BatchConfig::default());
    let target = HostFacts {
        max_money: 0.0,
        ..joesguns()
    };
    assert!(matches!(
        engine.threads(&target, &FormulaAnalyzer::default()),
        Err(FleetError::InvalidTask(_))
    ));
}

#[test]
fn test_build_job_orders_tasks_and_args() {
    let engine = BatchTimingEngine::new(BatchConfig::default());
    let job = engine
        .build_job(&joesguns(), &FormulaAnalyzer::default(), "home")
        .expect("ready target");

    assert_eq!(job.name, "batch-joesguns");
    let names: Vec<&str> = job.tasks().iter().map(|t| t.name()).collect();
    assert_eq!(names, ["weaken.js", "hack.js", "grow.js", "weaken.js"]);

    let hack = &job.tasks()[1];
    assert_eq!(hack.source, "home");
    assert_eq!(hack.args, vec!["joesguns".to_string(), "1800".to_string()]);
    assert!((hack.delay_ms - 1800.0).abs() < f64::EPSILON);
    assert!((hack.cost.base - 1.70).abs() < f64::EPSILON);

    assert_eq!(job.execution_time_ms, Some(4600.0));
}

#[test]
fn test_prep_progresses_security_then_money() {
    let preparer = Preparer::new(BatchConfig::default());
    let analyzer = FormulaAnalyzer::default();

    let dirty = HostFacts {
        current_security: 12.0,
        current_money: 100_000.0,
        ..joesguns()
    };
    let state = PrepState::observe(&dirty);
    assert_eq!(state.progress(), 0);
    let plan = preparer
        .plan(&state, &dirty, &analyzer, "home", None)
        .expect("valid")
        .expect("not ready");
    assert_eq!(plan.job.name, "prep-weaken-joesguns");
    // (12 - 5) / 0.05
    assert_eq!(plan.job.tasks()[0].instances, 140);

    let weakened = HostFacts {
        current_security: 5.0,
        ..dirty
    };
    let state = PrepState::observe(&weakened);
    assert_eq!(state.progress(), 1);
    let plan = preparer
        .plan(&state, &weakened, &analyzer, "home", None)
        .expect("valid")
        .expect("not ready");
    assert_eq!(plan.job.name, "prep-grow-joesguns");
    assert_eq!(plan.job.tasks().len(), 2);

    let state = PrepState::observe(&joesguns());
    assert!(state.is_ready());
    assert!(preparer
        .plan(&state, &joesguns(), &analyzer, "home", None)
        .expect("valid")
        .is_none());
}

#[test]
fn test_prep_weaken_is_capped() {
    let preparer = Preparer::new(BatchConfig::default());
    let dirty = HostFacts {
        current_security: 50.0,
        ..joesguns()
    };
    let plan = preparer
        .plan(
            &PrepState::observe(&dirty),
            &dirty,
            &FormulaAnalyzer::default(),
            "home",
            Some(64),
        )
        .expect("valid")
        .expect("not ready");
    assert_eq!(plan.job.tasks()[0].instances, 64);
}
