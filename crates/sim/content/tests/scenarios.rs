use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use sim_content::{ConfigLoader, KitRegistry, ScenarioFactory, ScenarioLoader};
use sim_core::{CharIndex, Event, EventTag, Frame, TrialSource};

const AMULET_SCENARIO: &str = r#"
name = "amulet-handoff"
seed = 7
iterations = 4
duration_frames = 600

[[party]]
key = "travelerelectro"
stats = { base_atk = 800.0, er = 0.2 }

[[party]]
key = "xiangling"
energy = 0.0
stats = { base_atk = 900.0 }

[[targets]]
level = 90

[[actions]]
action = "wait"
frames = 50

[[actions]]
character = "travelerelectro"
action = "skill"
params = { hits = 3 }

[[actions]]
character = "xiangling"
action = "swap"

[[actions]]
action = "wait"
frames = 100
"#;

const RON_SCENARIO: &str = r#"(
    seed: 3,
    duration_frames: 900,
    party: [
        (key: "yoimiya", stats: {base_atk: 880.0, cr: 0.6, cd: 1.2}),
        (key: "xiangling", stats: {base_atk: 900.0}),
    ],
    targets: [(level: 90, hp: Some(1000000.0))],
    actions: [
        (character: Some("xiangling"), action: skill),
        (character: Some("yoimiya"), action: skill),
        (character: Some("yoimiya"), action: attack, repeat: 5),
    ],
)"#;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

fn amulet_factory() -> ScenarioFactory {
    let file = write_temp(".toml", AMULET_SCENARIO);
    let registry = KitRegistry::with_defaults();
    let scenario = ScenarioLoader::load_validated(file.path(), &registry).expect("valid scenario");
    ScenarioFactory::new(scenario, registry)
}

#[test]
fn toml_scenario_loads_and_validates() {
    let factory = amulet_factory();
    let scenario = factory.scenario();

    assert_eq!(factory.name(), "amulet-handoff");
    assert_eq!(scenario.iterations, 4);
    assert_eq!(scenario.characters.len(), 2);
    assert_eq!(scenario.characters[1].0.starting_energy, Some(0.0));
    assert_eq!(scenario.steps.len(), 4);
}

#[test]
fn ron_scenario_runs_to_completion() {
    let file = write_temp(".ron", RON_SCENARIO);
    let registry = KitRegistry::with_defaults();
    let scenario = ScenarioLoader::load_validated(file.path(), &registry).expect("valid scenario");
    assert_eq!(scenario.iterations, 100);
    assert_eq!(scenario.steps.len(), 7);

    let factory = ScenarioFactory::new(scenario, registry);
    let result = factory.build(1).expect("trial").run();
    assert!(result.total_damage > 0.0);
    assert!(result.damage_by_char.iter().all(|d| *d > 0.0));
}

#[test]
fn unknown_fields_and_extensions_are_rejected() {
    let file = write_temp(".toml", &format!("{AMULET_SCENARIO}\nturbo = true\n"));
    assert!(ScenarioLoader::load(file.path()).is_err());

    let file = write_temp(".yaml", AMULET_SCENARIO);
    let err = ScenarioLoader::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("Unsupported scenario format"));
}

#[test]
fn invalid_scenario_reports_the_step() {
    let broken = AMULET_SCENARIO.replace("params = { hits = 3 }", "params = { hits = 9 }");
    let file = write_temp(".toml", &broken);
    let err = ScenarioLoader::load_validated(file.path(), &KitRegistry::with_defaults())
        .unwrap_err();
    assert!(err.to_string().contains("action 1"));
}

#[test]
fn config_loader_keeps_defaults_for_missing_keys() {
    let file = write_temp(".toml", "particle_delay = 80\nswap_cooldown = 30\n");
    let config = ConfigLoader::load(file.path()).expect("config");
    assert_eq!(config.particle_delay, 80);
    assert_eq!(config.swap_cooldown, 30);
    assert_eq!(config.default_icd_window, 150);
}

#[test]
fn three_blades_generate_one_particle() {
    let factory = amulet_factory();
    let mut trial = factory.build(7).expect("trial");
    let particles = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&particles);
    trial
        .simulation_mut()
        .subscribe(EventTag::ParticleGenerated, "particles", move |sim, _| {
            seen.borrow_mut().push(sim.now());
            false
        });

    let result = trial.run();
    assert_eq!(*particles.borrow(), vec![Frame(71)]);
    assert_eq!(result.particles, 1);
}

#[test]
fn amulets_are_credited_to_the_swapped_in_character() {
    let factory = amulet_factory();
    let mut trial = factory.build(7).expect("trial");
    let pickups = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&pickups);
    trial
        .simulation_mut()
        .subscribe(EventTag::EnergyAdded, "pickups", move |sim, event| {
            if let Event::EnergyAdded {
                char,
                source: "abundance-amulet",
                ..
            } = *event
            {
                seen.borrow_mut().push((sim.now(), char));
            }
            false
        });

    trial.run();
    assert_eq!(*pickups.borrow(), vec![(Frame(157), CharIndex(1))]);
}

#[test]
fn same_seed_gives_the_same_fingerprint() {
    let factory = amulet_factory();
    let a = factory.build(42).expect("trial").run();
    let b = factory.build(42).expect("trial").run();
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a, b);
}
