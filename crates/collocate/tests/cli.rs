//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// A workspace holding `corpus/solar.txt` and `corpus/lunar.txt`.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    fs::write(
        corpus.join("solar.txt"),
        "Solar\nThe sun is the world. The world is bright.\n",
    )
    .unwrap();
    fs::write(
        corpus.join("lunar.txt"),
        "Lunar\nBOOK ONE\nThe moon is pale. \nBOOK TWO\nThe moon is far from the world. \n",
    )
    .unwrap();
    tmp
}

/// Run a command in `dir` with `--json` and parse stdout.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cmd()
        .current_dir(dir)
        .args(args)
        .arg("--json")
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
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("mine"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn long_help_lists_environment_variables() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("COLLOCATE_LOG_DIR"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_reports_mining_defaults() {
    let tmp = TempDir::new().unwrap();
    let json = run_json(tmp.path(), &["info"]);

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["config"]["min_count"], 2);
    assert_eq!(json["config"]["max_n"], 10);
    assert_eq!(json["config"]["search"]["chapter_marker"], r"BOOK (\w+)");
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_flag_accepted() {
    cmd().args(["--quiet", "info"]).assert().success();
}

#[test]
fn multiple_verbose_flags_accepted() {
    cmd().args(["-vv", "info"]).assert().success();
}

#[test]
fn color_never_accepted() {
    cmd().args(["--color", "never", "info"]).assert().success();
}

// =============================================================================
// Mine Command
// =============================================================================

#[test]
fn mine_writes_sorted_table() {
    let tmp = workspace();
    let json = run_json(tmp.path(), &["mine", "--max-n", "3"]);

    assert_eq!(json["documents"], 2);
    let table = fs::read_to_string(tmp.path().join("results/corpus_ngrams_2.txt")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "the\t6");
    assert!(lines.contains(&"the world\t3"));
    assert!(lines.contains(&"the moon is\t2"));

    // Groups are ordered by phrase length.
    let lengths: Vec<usize> = lines
        .iter()
        .map(|l| l.split('\t').next().unwrap().split(' ').count())
        .collect();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn mine_honors_output_and_threshold() {
    let tmp = workspace();
    cmd()
        .current_dir(tmp.path())
        .args(["mine", "--min-count", "4", "-o", "table.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("table.txt"));

    let table = fs::read_to_string(tmp.path().join("table.txt")).unwrap();
    assert_eq!(table, "the\t6\nis\t4\n");
}

#[test]
fn mine_rejects_zero_threshold() {
    let tmp = workspace();
    cmd()
        .current_dir(tmp.path())
        .args(["mine", "--min-count", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_count"));
}

#[test]
fn mine_missing_corpus_fails() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .current_dir(tmp.path())
        .arg("mine")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load corpus"));
}

// =============================================================================
// Search Command
// =============================================================================

#[test]
fn search_writes_reports_and_collocations() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    let json = run_json(tmp.path(), &["search", r"\bworld\b", "-d", "solar.txt"]);
    assert_eq!(json["matches"], 2);
    assert_eq!(json["documents_searched"], 1);
    assert_eq!(json["records"][1]["text"], "The world is bright.");
    assert_eq!(json["records"][1]["spans"][0]["start"], 4);
    let contexts = json["reports"]["contexts"].as_str().unwrap();
    assert!(contexts.ends_with("contexts1.html"), "{contexts}");

    let html = fs::read_to_string(tmp.path().join(contexts)).unwrap();
    assert!(html.contains("<h3>Solar (solar.txt)</h3>"));
    assert!(html.contains("None: The sun is the <b><font color=\"blue\">world</font></b>."));

    let frequencies = json["reports"]["frequencies"].as_str().unwrap();
    let html = fs::read_to_string(tmp.path().join(frequencies)).unwrap();
    assert!(html.contains("<tr><td>the world</td><td>2</td></tr>"));
}

#[test]
fn search_reports_chapters() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    let json = run_json(tmp.path(), &["search", "moon", "--doc", "lunar.txt"]);
    assert_eq!(json["unit"], "sentence");
    assert_eq!(json["matches"], 2);
    assert_eq!(json["records"][0]["chapter"], "ONE");
    assert_eq!(json["records"][1]["chapter"], "TWO");

    let contexts = json["reports"]["contexts"].as_str().unwrap();
    let html = fs::read_to_string(tmp.path().join(contexts)).unwrap();
    assert!(html.contains("<p>ONE: The <b>"));
    assert!(html.contains("<p>TWO: The <b>"));
}

#[test]
fn line_search_reports_chapters() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    let json = run_json(
        tmp.path(),
        &["search", "moon", "-d", "lunar.txt", "--unit", "line"],
    );
    assert_eq!(json["unit"], "line");
    assert_eq!(json["records"][0]["chapter"], "ONE");
    assert_eq!(json["records"][1]["chapter"], "TWO");
}

#[test]
fn search_exclusion_suppresses_hits() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    let json = run_json(
        tmp.path(),
        &["search", r"\bworld\b", "-d", "solar.txt", "-x", "bright"],
    );
    assert_eq!(json["matches"], 1);
}

#[test]
fn repeated_search_never_overwrites_reports() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    run_json(tmp.path(), &["search", "world"]);
    let json = run_json(tmp.path(), &["search", "world"]);
    let contexts = json["reports"]["contexts"].as_str().unwrap();
    assert!(contexts.ends_with("contexts2.html"), "{contexts}");
    assert!(tmp.path().join("results/contexts1.html").exists());
}

#[test]
fn search_missing_document_warns_and_continues() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);

    cmd()
        .current_dir(tmp.path())
        .args(["search", "world", "-d", "nope.txt", "-d", "solar.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nope.txt"))
        .stdout(predicate::str::contains("2 matches"));

    let html = fs::read_to_string(tmp.path().join("results/contexts1.html")).unwrap();
    assert!(html.contains("<h2>WARNING: nope.txt not found</h2>"));
}

#[test]
fn search_without_table_fails() {
    let tmp = workspace();
    cmd()
        .current_dir(tmp.path())
        .args(["search", "world"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("collocate mine"));
}

#[test]
fn search_without_pattern_fails() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);
    cmd()
        .current_dir(tmp.path())
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no search pattern"));
}

#[test]
fn search_invalid_pattern_fails() {
    let tmp = workspace();
    run_json(tmp.path(), &["mine"]);
    cmd()
        .current_dir(tmp.path())
        .args(["search", "(unclosed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid query pattern"));
}

#[test]
fn malformed_table_is_fatal() {
    let tmp = workspace();
    fs::create_dir_all(tmp.path().join("results")).unwrap();
    fs::write(
        tmp.path().join("results/corpus_ngrams_2.txt"),
        "the\t3\nbroken\n",
    )
    .unwrap();
    cmd()
        .current_dir(tmp.path())
        .args(["search", "world"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn no_subcommand_shows_help() {
    // arg_required_else_help makes clap print help to stderr and exit 2
    cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn invalid_unit_shows_error() {
    cmd()
        .args(["search", "x", "--unit", "paragraph"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
