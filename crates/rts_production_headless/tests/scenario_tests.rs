//! Scenario runner tests against files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use rts_production::notification::Notification;
use rts_production::rules::Rules;
use rts_production::world::WorldSnapshot;
use rts_production_headless::{RunReport, ScenarioError, ScenarioRunner};
use rts_test_utils::fixtures::STANDARD_RULES_RON;
use tempfile::TempDir;

fn crate_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn write_scenario(dir: &Path, body: &str) -> PathBuf {
    fs::write(dir.join("rules.ron"), STANDARD_RULES_RON).unwrap();
    let path = dir.join("scenario.ron");
    fs::write(&path, body).unwrap();
    path
}

const RIFLE_RUSH: &str = r#"
Scenario(
    name: "Rifle rush",
    rules: Some("rules.ron"),
    ticks: 400,
    players: [
        PlayerSetup(id: 1, cash: 1000, actors: [
            ActorPlacement(label: Some("yard"), kind: "construction_yard", position: (0, 0), queue: true),
            ActorPlacement(kind: "power_plant", position: (4, 0)),
            ActorPlacement(kind: "barracks", position: (8, 0),
                           producers: [Exit([(0, 2), (1, 2)]), Surround(2, 2)]),
        ]),
    ],
    script: [
        ScriptedAction(tick: 0, action: Order(actor: "yard", order: StartProduction(item: "rifleman"))),
        ScriptedAction(tick: 0, action: Order(actor: "yard", order: StartProduction(item: "rifleman"))),
        ScriptedAction(tick: 0, action: Order(actor: "yard", order: StartProduction(item: "rifleman"))),
    ],
)
"#;

#[test]
fn test_shipped_rules_validate() {
    let rules = Rules::load(crate_dir().join("data/rules.ron")).unwrap();
    assert!(rules.item("war_factory").is_some());
}

#[test]
fn test_shipped_scenario_runs() {
    let mut runner = ScenarioRunner::from_file(crate_dir().join("scenarios/skirmish.ron")).unwrap();
    let report = runner.run(runner.default_ticks());

    assert_eq!(report.final_tick, 3000);
    assert!(report.spawned.get("rifleman").copied().unwrap_or(0) >= 3);
    assert_eq!(report.players[&2].actors["power_plant"], 1);
    assert_eq!(report.players[&1].actors["war_factory"], 1);
}

#[test]
fn test_rifle_rush_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(dir.path(), RIFLE_RUSH);

    let mut runner = ScenarioRunner::from_file(&path).unwrap();
    let report = runner.run(400);

    // Three riflemen back to back: 121 ticks each including hand-out
    assert_eq!(report.spawned.get("rifleman"), Some(&3));
    assert_eq!(report.players[&1].cash, 700);
    let ready_ticks: Vec<u64> = report
        .notifications
        .iter()
        .filter(|n| matches!(n.notification, Notification::UnitReady { .. }))
        .map(|n| n.tick)
        .collect();
    assert_eq!(ready_ticks, vec![120, 241, 362]);
}

#[test]
fn test_report_json_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(dir.path(), RIFLE_RUSH);
    let output = dir.path().join("report.json");

    let report = ScenarioRunner::from_file(&path).unwrap().run(200);
    report.write(&output).unwrap();

    let parsed: RunReport = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_snapshot_matches_report_hash() {
    let dir = TempDir::new().unwrap();
    let path = write_scenario(dir.path(), RIFLE_RUSH);

    let mut runner = ScenarioRunner::from_file(&path).unwrap();
    let report = runner.run(150);
    let bytes = runner.world().snapshot().to_bytes().unwrap();

    let restored = WorldSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(restored.state_hash(), report.state_hash);
    assert_eq!(restored.tick, 150);
}

#[test]
fn test_missing_rules_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scenario.ron");
    fs::write(&path, RIFLE_RUSH).unwrap();

    let err = ScenarioRunner::from_file(&path).unwrap_err();
    assert!(matches!(err, ScenarioError::Game(_)));
}

#[test]
fn test_invalid_rules_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.ron");
    fs::write(
        &path,
        r#"RulesData(items: [ItemData(name: "tank", category: "Vehicle", cost: 700, built_at: ["factory"])])"#,
    )
    .unwrap();

    assert!(Rules::load(&path).is_err());
}

#[test]
fn test_unknown_label_rejected() {
    let dir = TempDir::new().unwrap();
    let body = RIFLE_RUSH.replace("Order(actor: \"yard\"", "Order(actor: \"nowhere\"");
    let path = write_scenario(dir.path(), &body);

    let err = ScenarioRunner::from_file(&path).unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownLabel(label) if label == "nowhere"));
}
