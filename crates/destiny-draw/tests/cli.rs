//! End-to-end tests for the `destiny_draw` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const NO_COMBAT: &str = "You haven't started a combat yet! Use /start_new_combat to begin.";

struct TestEnv {
    tmp: TempDir,
    config: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let db = tmp.path().join("data").join("tables.db");
        let config = tmp.path().join("config.toml");
        fs::write(
            &config,
            format!(
                "player = \"tester\"\n\n[game]\nseed = 42\n\n[storage]\ndatabase_path = {:?}\n",
                db.to_string_lossy()
            ),
        )
        .expect("write config");

        Self { tmp, config }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("destiny_draw");
        cmd.env_remove("RUST_LOG").arg("--config").arg(&self.config);
        cmd
    }

    fn stdout(&self, args: &[&str]) -> String {
        let out = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).expect("utf-8 output")
    }

    fn json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.stdout(args)).expect("valid json output")
    }
}

#[test]
fn hand_before_start() {
    let env = TestEnv::new();
    env.cmd().arg("hand").assert().success().stdout(contains(NO_COMBAT));
}

#[test]
fn start_then_hand_persists() {
    let env = TestEnv::new();
    let started = env.stdout(&["start"]);
    assert!(started.starts_with("Combat started! Drew 5 cards.\nYour hand:\n"));

    let hand = env.stdout(&["hand"]);
    assert!(hand.starts_with("Your hand:\n1. "));
    assert!(started.ends_with(&hand));
}

#[test]
fn players_are_separate() {
    let env = TestEnv::new();
    env.cmd().args(["--player", "ann", "start"]).assert().success();
    env.cmd()
        .args(["--player", "bob", "hand"])
        .assert()
        .success()
        .stdout(contains(NO_COMBAT));
    env.cmd()
        .args(["hand", "--player", "ann"])
        .assert()
        .success()
        .stdout(contains("Your hand:"));
}

#[test]
fn mulligan_flow() {
    let env = TestEnv::new();
    env.cmd().arg("start").assert().success();

    env.cmd()
        .args(["mulligan", "1", "2"])
        .assert()
        .success()
        .stdout(contains("Mulligan complete!"));

    env.cmd()
        .args(["mulligan", "9"])
        .assert()
        .success()
        .stdout(contains("Please provide 1-5 valid card positions (1-5)"));

    let status = env.json(&["status", "--json"]);
    assert_eq!(status["players"][0]["discard"], 2);
    assert_eq!(status["players"][0]["hand"], 5);
}

#[test]
fn resolutions_and_resolve() {
    // Seed 42 deals two 3s and a joker in positions 3-5 beside two unmatched cards.
    let env = TestEnv::new();
    env.cmd().arg("start").assert().success();

    let list = env.stdout(&["resolutions"]);
    let lines: Vec<&str> = list.lines().collect();
    assert_eq!(lines.len(), 7, "unexpected listing:\n{list}");
    assert_eq!(lines[0], "Available hands:");
    assert!(lines[1].starts_with("1. Triple Threat: [3] [4] [5] - Elements: "));
    assert!(lines[2].starts_with("2. Matched Edge: [1] ["));
    assert!(lines[3].starts_with("3. Matched Edge: [2] ["));
    assert!(lines[4].starts_with("4. Matched Edge: [3] [4] - Elements: "));
    assert!(lines[5].starts_with("5. Matched Edge: [3] [5] - Elements: "));
    assert!(lines[6].starts_with("6. Matched Edge: [4] [5] - Elements: "));

    env.cmd()
        .args(["resolve", "99"])
        .assert()
        .success()
        .stdout(contains("Invalid hand number."));

    let resolved = env.stdout(&["resolve", "1"]);
    assert!(resolved.starts_with("Choose three targets present on the scene."));
    assert!(resolved.contains("heal 18 Hit Points"));
    assert!(resolved.contains("take 8 damage"));
    assert!(resolved.contains("Your hand:\n"));

    let history = env.json(&["history", "--json"]);
    let records = history.as_array().expect("history is an array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["resolution"]["kind"], "triple_threat");
    assert_eq!(records[0]["resolution"]["value"], 3);

    let status = env.json(&["status", "--json"]);
    assert_eq!(status["players"][0]["hand"], 5);
    assert_eq!(status["players"][0]["discard"], 3);
}

#[test]
fn history_empty() {
    let env = TestEnv::new();
    assert_eq!(env.json(&["history", "--json"]), Value::Array(Vec::new()));
    env.cmd()
        .arg("history")
        .assert()
        .success()
        .stdout(contains("No hands resolved yet."));
}

#[test]
fn play_console() {
    let env = TestEnv::new();
    env.cmd()
        .arg("play")
        .write_stdin("ann start\nbob hand\nann hand\nquit\n")
        .assert()
        .success()
        .stdout(contains("Combat started! Drew 5 cards.").and(contains(NO_COMBAT)));

    // The console writes through to the same database.
    env.cmd()
        .args(["--player", "ann", "hand"])
        .assert()
        .success()
        .stdout(contains("Your hand:"));
}

#[test]
fn config_show_json() {
    let env = TestEnv::new();
    let config = env.json(&["config", "show", "--json"]);
    assert_eq!(config["player"], "tester");
    assert_eq!(config["game"]["hand_size"], 5);
    assert_eq!(config["game"]["seed"], 42);
}

#[test]
fn oversized_joker_count_is_rejected() {
    let env = TestEnv::new();
    for jokers in ["18446744073709551615", "2000000000"] {
        env.cmd()
            .env("DESTINY_DRAW_GAME__JOKERS", jokers)
            .arg("start")
            .assert()
            .failure()
            .stderr(contains("jokers").and(contains("panicked").not()));
    }
}

#[test]
fn end_combat_clears_state() {
    let env = TestEnv::new();
    env.cmd().arg("start").assert().success();
    env.cmd()
        .arg("end")
        .assert()
        .success()
        .stdout(contains("Combat ended."));
    env.cmd().arg("hand").assert().success().stdout(contains(NO_COMBAT));
    env.cmd().arg("end").assert().success().stdout(contains(NO_COMBAT));
}

#[test]
fn config_validate_reports_failure() {
    let env = TestEnv::new();
    let bad = env.tmp.path().join("bad.toml");
    fs::write(&bad, "[game]\njokers = 500\n").unwrap();

    env.cmd()
        .args(["config", "validate", "--file"])
        .arg(&bad)
        .assert()
        .failure()
        .stdout(contains("Validating configuration"))
        .stderr(contains("jokers"));

    env.cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(contains("Configuration is valid."));
}

#[test]
fn config_validate_ignores_broken_default() {
    let env = TestEnv::new();
    let good = env.tmp.path().join("good.toml");
    fs::write(&good, "player = \"ann\"\n").unwrap();
    fs::write(&env.config, "[game]\nhand_size = 1\n").unwrap();

    env.cmd()
        .args(["config", "validate", "--file"])
        .arg(&good)
        .assert()
        .success()
        .stdout(contains("Configuration is valid."));
}

#[test]
fn invalid_config_fails() {
    let env = TestEnv::new();
    fs::write(&env.config, "[game]\nhand_size = 1\n").unwrap();
    env.cmd()
        .arg("hand")
        .assert()
        .failure()
        .stderr(contains("hand_size"));
}
