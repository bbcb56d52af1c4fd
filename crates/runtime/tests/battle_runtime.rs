//! End-to-end runtime tests over the shipped battle content.

use std::path::PathBuf;
use std::sync::Arc;

use battle_content::ContentFactory;
use battle_core::{
    ActionKind, BattleActorSeed, BattleConfig, BattleEngine, BattleEnv, BattleError, MasterData,
    SetupError, Side, StepKind, prepare_enemy, prepare_player,
};
use runtime::{
    BattleLogRepository, BattleRuntime, BattleSetup, FileBattleLogRepository, RuntimeConfig,
    RuntimeError,
};
use tempfile::TempDir;

fn factory() -> ContentFactory {
    ContentFactory::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../battle/content/data"))
}

fn ambush() -> (Arc<MasterData>, BattleSetup) {
    let factory = factory();
    let master = factory.load_master_data().unwrap();
    let scenario = factory.load_scenario("goblin_ambush").unwrap();
    let env = BattleEnv::with_all(&master);

    let players = scenario
        .party
        .iter()
        .map(|character| prepare_player(&env, character).unwrap().seed)
        .collect();
    let enemies = scenario
        .enemies
        .iter()
        .enumerate()
        .map(|(slot, id)| prepare_enemy(&env, slot as u16, *id).unwrap().seed)
        .collect();

    let setup = BattleSetup {
        id: scenario.name,
        seed: scenario.seed,
        players,
        enemies,
    };
    (Arc::new(master), setup)
}

fn run_synchronously(master: &MasterData, setup: &BattleSetup) -> battle_core::BattleLog {
    let env = BattleEnv::with_all(master);
    let engine = BattleEngine::new(
        &env,
        BattleConfig::default(),
        setup.seed,
        setup.players.clone(),
        setup.enemies.clone(),
    )
    .unwrap();
    engine.run().unwrap().0
}

#[tokio::test]
async fn streamed_battle_matches_the_synchronous_engine() {
    let (master, setup) = ambush();
    let expected = run_synchronously(&master, &setup);

    let runtime = BattleRuntime::new(RuntimeConfig::default(), master);
    let mut handle = runtime.spawn(setup).unwrap();
    assert_eq!(handle.id(), "goblin_ambush");

    let mut steps = Vec::new();
    while let Some(step) = handle.next_step().await {
        steps.push(step);
    }
    let log = handle.finish().await.unwrap().expect("battle completes");

    assert_eq!(log, expected);
    assert_eq!(steps[0].kind, StepKind::BattleStart);
    assert!(steps.last().unwrap().is_final());
    assert!(steps[..steps.len() - 1].iter().all(|step| !step.is_final()));

    let streamed: Vec<ActionKind> = steps
        .iter()
        .flat_map(|step| step.entries.iter().map(|entry| entry.kind))
        .collect();
    let logged: Vec<ActionKind> = log.entries.iter().map(|entry| entry.kind).collect();
    assert_eq!(streamed, logged);
}

#[tokio::test]
async fn finishing_without_reading_still_seals_the_log() {
    let (master, setup) = ambush();
    let expected = run_synchronously(&master, &setup);

    let config = RuntimeConfig {
        step_buffer: 1,
        ..RuntimeConfig::default()
    };
    let handle = BattleRuntime::new(config, master).spawn(setup).unwrap();

    assert_eq!(handle.finish().await.unwrap(), Some(expected));
}

#[tokio::test]
async fn cancelled_battle_yields_no_log() {
    let (master, setup) = ambush();
    let config = RuntimeConfig {
        step_buffer: 1,
        ..RuntimeConfig::default()
    };
    let mut handle = BattleRuntime::new(config, master).spawn(setup).unwrap();

    let first = handle.next_step().await.unwrap();
    assert_eq!(first.kind, StepKind::BattleStart);
    handle.cancel();

    assert_eq!(handle.finish().await.unwrap(), None);
}

#[tokio::test]
async fn setup_errors_surface_before_spawning() {
    let (master, mut setup) = ambush();
    setup.enemies = Vec::<BattleActorSeed>::new();

    let err = BattleRuntime::new(RuntimeConfig::default(), master)
        .spawn(setup)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        RuntimeError::Setup(BattleError::Setup(SetupError::EmptySide { side: Side::Enemy }))
    ));
}

#[tokio::test]
async fn completed_battles_are_appended_to_the_log_dir() {
    let (master, setup) = ambush();
    let temp_dir = TempDir::new().unwrap();
    let config = RuntimeConfig {
        log_dir: Some(temp_dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let runtime = BattleRuntime::open(config, master).unwrap();

    let first = runtime.spawn(setup.clone()).unwrap().finish().await.unwrap();
    let second = runtime.spawn(setup).unwrap().finish().await.unwrap();
    drop(runtime);

    let repo = FileBattleLogRepository::open(temp_dir.path(), RuntimeConfig::LOG_FILE).unwrap();
    let stored = repo.read_all().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(Some(stored[0].clone()), first);
    assert_eq!(Some(stored[1].clone()), second);
    assert_eq!(stored[0].digest().unwrap(), stored[1].digest().unwrap());
}

#[test]
fn runtime_config_reads_the_shipped_toml() {
    let config: RuntimeConfig = factory().load_config().unwrap();
    assert_eq!(config.step_buffer, RuntimeConfig::DEFAULT_STEP_BUFFER);
    assert_eq!(config.log_dir, None);
    assert_eq!(config.battle, BattleConfig::default());
}
