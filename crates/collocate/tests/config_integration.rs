//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Tests use
//! `info --json` to assert actual config values, not just process success.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run `info --json` from a directory and parse the JSON output.
fn info_json(dir: &std::path::Path) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "info");
    assert_eq!(json["config"]["corpus_dir"], "corpus");
    assert!(
        json["config"]["config_file"].is_null(),
        "no config file should be reported"
    );
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "max_n = 4").unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["max_n"], 4);
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(
        reported.ends_with(".collocate.toml"),
        "should report dotfile: {reported}"
    );
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join("collocate.toml"), "min_count = 3").unwrap();

    let json = info_json(&sub_dir);

    assert_eq!(json["config"]["min_count"], 3);
    assert_eq!(json["config"]["ngram_file"], "results/corpus_ngrams_3.txt");
}

#[test]
fn regular_name_overrides_dotfile() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "max_n = 4").unwrap();
    fs::write(tmp.path().join("collocate.toml"), "max_n = 6").unwrap();

    let json = info_json(tmp.path());

    assert_eq!(
        json["config"]["max_n"], 6,
        "regular file should override dotfile"
    );
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_toml_search_table() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        r#"output_prefix = "meditations"

[search]
query = '\bsoul\b'
exclusion = "body"
use_exclusion = true
documents = ["meditations_1-6.txt", "meditations_7-12.txt"]
unit = "line"
"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    let search = &json["config"]["search"];
    assert_eq!(search["query"], r"\bsoul\b");
    assert_eq!(search["exclusion"], "body");
    assert_eq!(search["unit"], "line");
    assert_eq!(search["documents"][1], "meditations_7-12.txt");
    assert_eq!(
        json["config"]["ngram_file"],
        "results/meditations_ngrams_2.txt"
    );
}

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.yaml"),
        "max_n: 5\nsearch:\n  query: earth\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["max_n"], 5);
    assert_eq!(json["config"]["search"]["query"], "earth");
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.json"),
        r#"{"results_dir": "out", "log_level": "error"}"#,
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["results_dir"], "out");
    assert_eq!(json["config"]["log_level"], "error");
}

#[test]
fn disabled_exclusion_is_not_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        "[search]\nexclusion = \"body\"\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert!(json["config"]["search"]["exclusion"].is_null());
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "max_n = 3").unwrap();
    fs::write(sub_dir.join(".collocate.toml"), "max_n = 7").unwrap();

    let json = info_json(&sub_dir);

    assert_eq!(json["config"]["max_n"], 7, "closer config should win");
}

#[test]
fn later_extension_overrides_earlier_in_same_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "min_count = 3").unwrap();
    fs::write(tmp.path().join(".collocate.yaml"), "min_count: 5\n").unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["min_count"], 5);
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "max_n = 3").unwrap();
    let explicit = tmp.path().join("override.toml");
    fs::write(&explicit, "max_n = 8").unwrap();

    let output = cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "--config",
            explicit.to_str().unwrap(),
            "info",
            "--json",
        ])
        .output()
        .expect("failed to run command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["max_n"], 8);
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(
        reported.ends_with("override.toml"),
        "--config path should be reported: {reported}"
    );
}

#[test]
fn environment_overrides_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        "max_n = 3\n[search]\nquery = \"file\"\n",
    )
    .unwrap();

    let output = cmd()
        .env("COLLOCATE_MAX_N", "9")
        .env("COLLOCATE_SEARCH__QUERY", "env")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["max_n"], 9);
    assert_eq!(json["config"]["search"]["query"], "env");
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        "this is not valid toml [[[",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn invalid_json_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.json"), "{not valid json}").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn zero_max_n_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".collocate.toml"), "max_n = 0").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_n"));
}

#[test]
fn unknown_search_unit_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        "[search]\nunit = \"paragraph\"\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".collocate.toml"),
        "min_count = 2\nunknown_field = \"should be ignored\"\n",
    )
    .unwrap();

    let json = info_json(tmp.path());
    assert_eq!(json["config"]["min_count"], 2);
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(parent.join(".collocate.toml"), "max_n = 2").unwrap();
    fs::create_dir(repo.join(".git")).unwrap();

    let json = info_json(&src);

    assert_eq!(
        json["config"]["max_n"], 10,
        "boundary stops search"
    );
    assert!(json["config"]["config_file"].is_null());
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(repo.join(".collocate.toml"), "max_n = 2").unwrap();

    let json = info_json(&src);

    assert_eq!(json["config"]["max_n"], 2);
    assert!(json["config"]["config_file"].as_str().is_some());
}
