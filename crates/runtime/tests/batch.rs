use std::sync::Arc;

use runtime::{BatchRunner, RuntimeConfig, RuntimeError};
use sim_content::{
    ActionKind, ActionSpec, CharacterParams, CharacterSpec, KitRegistry, ScenarioFactory,
    ScenarioSpec, TargetSpec,
};
use sim_core::{ActionParams, SimConfig, StatKind, Talents};

fn character(key: &str) -> CharacterSpec {
    CharacterSpec {
        key: key.to_string(),
        level: None,
        constellation: 0,
        talents: Talents::default(),
        stats: [
            (StatKind::BaseAtk, 850.0),
            (StatKind::Cr, 0.5),
            (StatKind::Cd, 1.0),
        ]
        .into_iter()
        .collect(),
        energy: None,
        params: CharacterParams::default(),
    }
}

fn act(key: &str, action: ActionKind, repeat: u32) -> ActionSpec {
    ActionSpec {
        character: Some(key.to_string()),
        action,
        repeat,
        frames: None,
        params: ActionParams::default(),
    }
}

fn factory() -> Arc<ScenarioFactory> {
    let spec = ScenarioSpec {
        name: Some("batch-test".into()),
        seed: 0,
        iterations: 8,
        duration_frames: 1200,
        stop_when_targets_defeated: false,
        config: SimConfig::default(),
        party: vec![character("xiangling"), character("yoimiya")],
        active: None,
        targets: vec![TargetSpec::default()],
        actions: vec![
            act("xiangling", ActionKind::Skill, 1),
            act("xiangling", ActionKind::Burst, 1),
            act("yoimiya", ActionKind::Skill, 1),
            act("yoimiya", ActionKind::Attack, 10),
        ],
    };
    let registry = KitRegistry::with_defaults();
    let scenario = spec.validate(&registry).expect("valid scenario");
    Arc::new(ScenarioFactory::new(scenario, registry))
}

#[tokio::test]
async fn worker_count_does_not_change_results() {
    let source = factory();

    let serial = BatchRunner::new(RuntimeConfig::new(8, 1, 17))
        .run(Arc::clone(&source))
        .await
        .expect("serial batch");
    let parallel = BatchRunner::new(RuntimeConfig::new(8, 4, 17))
        .run(Arc::clone(&source))
        .await
        .expect("parallel batch");

    assert_eq!(serial.fingerprints, parallel.fingerprints);
    assert_eq!(serial, parallel);
    assert_eq!(serial.scenario, "batch-test");
}

#[tokio::test]
async fn seeds_are_distinct_and_ordered() {
    let runner = BatchRunner::new(RuntimeConfig::new(8, 3, 5));
    let report = runner.run(factory()).await.expect("batch");

    let expected: Vec<u64> = (0..8).map(|i| runner.seed_for(i)).collect();
    assert_eq!(report.seeds, expected);

    let mut unique = report.seeds.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 8);
}

#[tokio::test]
async fn report_aggregates_every_trial() {
    let runner = BatchRunner::new(RuntimeConfig::new(6, 2, 0));
    let results = runner.run_trials(factory()).await.expect("trials");
    let report = runner.run(factory()).await.expect("batch");

    assert_eq!(report.iterations, 6);
    assert_eq!(report.per_char_damage.len(), 2);
    let mean = results.iter().map(|r| r.total_damage).sum::<f64>() / 6.0;
    assert!((report.damage.mean - mean).abs() < 1e-6);
    assert!(report.damage.min <= report.damage.mean && report.damage.mean <= report.damage.max);
    assert!(report.dps.mean > 0.0);
}

#[tokio::test]
async fn empty_batches_are_rejected() {
    let runner = BatchRunner::new(RuntimeConfig::new(0, 2, 0));
    assert!(matches!(
        runner.run(factory()).await,
        Err(RuntimeError::ZeroIterations)
    ));

    let runner = BatchRunner::new(RuntimeConfig::new(2, 0, 0));
    assert!(matches!(
        runner.run(factory()).await,
        Err(RuntimeError::ZeroWorkers)
    ));
}
