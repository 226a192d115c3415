use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SITES: &str = r#"[
    {"id": 1, "name": "Ivanov Group", "address": "Lenina 5"},
    {"id": 2, "name": "Zenith Holdings", "address": "Moscow, Tverskaya 1", "customer": null}
]"#;

/// Runs `crm-find` inside an empty directory so no local config is picked up.
fn crm_find(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("crm-find").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn workspace_with_sites() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sites.json"), SITES).unwrap();
    dir
}

#[test]
fn score_contained_query() {
    let dir = TempDir::new().unwrap();
    crm_find(&dir)
        .args(["score", "Moscow", "Moscow Tower"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.0%"));
}

#[test]
fn score_json_output() {
    let dir = TempDir::new().unwrap();
    crm_find(&dir)
        .args(["score", "xyz123", "completely unrelated text", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"score\": 0.0"));
}

#[test]
fn score_keeps_quotes_in_query() {
    let dir = TempDir::new().unwrap();
    let output = crm_find(&dir)
        .args(["score", "O'Brien", "O'Brien Ltd", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["query"], "O'Brien");
    assert_eq!(result["score"], 1.0);
}

#[test]
fn search_matches_quoted_names() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("contractors.json"),
        r#"[{"id": 1, "name": "OOO \"Romashka\" & Co"}, {"id": 2, "name": "Zenith"}]"#,
    )
    .unwrap();

    let output = crm_find(&dir)
        .args(["search", "\"Romashka\" & Co", "-i", "contractors.json", "-k", "contractor", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let matches: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["score"], 1.0);
    assert_eq!(matches[0]["record"]["id"], 1);
}

#[test]
fn score_explain_lists_sub_scores() {
    let dir = TempDir::new().unwrap();
    crm_find(&dir)
        .args(["score", "Pulsar", "Pulsr Ltd", "--explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("token_set").and(predicate::str::contains("metaphone")));
}

#[test]
fn search_objects_by_name() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "ivanov", "--input", "sites.json", "--kind", "object"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ivanov Group").and(predicate::str::contains("(name)")));
}

#[test]
fn search_reports_best_field() {
    let dir = workspace_with_sites();
    let output = crm_find(&dir)
        .args(["search", "tverskaya", "-i", "sites.json", "-k", "objects", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let matches: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(matches.as_array().unwrap().len(), 1);
    assert_eq!(matches[0]["field"], "address");
    assert_eq!(matches[0]["record"]["id"], 2);
}

#[test]
fn search_custom_fields() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("people.json"),
        r#"[{"full_name": "Sergey Petrov", "city": "Kazan"}]"#,
    )
    .unwrap();

    crm_find(&dir)
        .args(["search", "kazan", "-i", "people.json", "--fields", "full_name,city"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(city)"));
}

#[test]
fn search_without_matches_exits_with_no_matches() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "qqqqqq", "-i", "sites.json", "-k", "object"])
        .assert()
        .code(5);
}

#[test]
fn short_query_returns_nothing() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "I", "-i", "sites.json", "-k", "object", "--json"])
        .assert()
        .code(5)
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn search_requires_kind_or_fields() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "ivanov", "-i", "sites.json"])
        .assert()
        .failure();
}

#[test]
fn unknown_kind_rejected() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "ivanov", "-i", "sites.json", "-k", "manufacturer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown entity kind"));
}

#[test]
fn invalid_threshold_rejected() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "ivanov", "-i", "sites.json", "-k", "object", "-t", "1.5"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("E5001").and(predicate::str::contains("12001")));
}

#[test]
fn missing_input_file() {
    let dir = TempDir::new().unwrap();
    crm_find(&dir)
        .args(["search", "ivanov", "-i", "missing.json", "-k", "object"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn malformed_records_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.json"), r#"{"name": "not an array"}"#).unwrap();
    crm_find(&dir)
        .args(["search", "ivanov", "-i", "bad.json", "-k", "object"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("E5003"));
}

#[test]
fn script_query_rejected() {
    let dir = workspace_with_sites();
    crm_find(&dir)
        .args(["search", "javascript:alert(1)", "-i", "sites.json", "-k", "object"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Suspicious content"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    crm_find(&dir)
        .args(["--config", "nope.toml", "score", "a", "b"])
        .assert()
        .code(3);
}

#[test]
fn invalid_config_values_fail_as_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".crm-search.toml"), "[search]\nobject_threshold = 2.0\n").unwrap();
    crm_find(&dir)
        .args(["score", "a", "b"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("E3003"));
}

#[test]
fn local_config_is_used() {
    let dir = workspace_with_sites();
    fs::write(
        dir.path().join(".crm-search.toml"),
        "[search]\nmin_query_length = 10\n",
    )
    .unwrap();

    crm_find(&dir)
        .args(["search", "ivanov", "-i", "sites.json", "-k", "object"])
        .assert()
        .code(5);
}

#[test]
fn rank_by_name_similarity() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("names.json"),
        r#"[{"name": "Ivanova"}, {"name": "Petrov"}, {"name": "Ivanov"}]"#,
    )
    .unwrap();

    let output = crm_find(&dir)
        .args(["rank", "ivanov", "-i", "names.json", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let ranked: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ranked.as_array().unwrap().len(), 2);
    assert_eq!(ranked[0]["record"]["name"], "Ivanov");
    assert_eq!(ranked[0]["similarity"], 1.0);
}
