use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn nodal(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nodal").unwrap();
    cmd.env("NODAL_CONFIG", dir.path().join("config.toml"))
        .env("NODAL_DATA_DIR", dir.path().join("data"))
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--format").arg("json").assert().success();
    serde_json::from_slice(&output.get_output().stdout).unwrap()
}

fn add_node(dir: &TempDir, node_type: &str, label: &str) -> String {
    let node = json_output(nodal(dir).args(["node", "add", label, "--type", node_type]));
    node["id"].as_str().unwrap().to_string()
}

#[test]
fn test_node_roundtrip_across_invocations() {
    let dir = tempdir().unwrap();
    let node = json_output(nodal(&dir).args([
        "node", "add", "React", "-t", "Technology", "-p", "version=18.2", "-p", "stable=true",
    ]));
    assert_eq!(node["type"], "Technology");
    assert_eq!(node["properties"]["stable"], true);

    let id = node["id"].as_str().unwrap();
    let fetched = json_output(nodal(&dir).args(["node", "get", id]));
    assert_eq!(fetched, node);

    nodal(&dir)
        .args(["node", "get", id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Label: React"));
}

#[test]
fn test_quoted_property_stays_string() {
    let dir = tempdir().unwrap();
    let node = json_output(nodal(&dir).args([
        "node", "add", "Boston", "-t", "City", "-p", "zip=\"02134\"", "-p", "area=02134",
    ]));
    assert_eq!(node["properties"]["zip"], "02134");
    assert_eq!(node["properties"]["area"], 2134);

    let found = json_output(nodal(&dir).args(["node", "list", "-p", "zip=\"02134\""]));
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_node_is_not_an_error() {
    let dir = tempdir().unwrap();
    nodal(&dir)
        .args(["node", "get", "01ARZ3NDEKTSV4RRFFQ69G5FAV"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));

    let fetched = json_output(nodal(&dir).args(["node", "get", "nonsense"]));
    assert!(fetched.is_null());
}

#[test]
fn test_list_filters_by_type() {
    let dir = tempdir().unwrap();
    add_node(&dir, "Technology", "React");
    add_node(&dir, "Language", "TypeScript");
    add_node(&dir, "Technology", "Vue");

    let nodes = json_output(nodal(&dir).args(["node", "list", "--type", "Technology"]));
    let labels: Vec<&str> = nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"React"));
    assert!(labels.contains(&"Vue"));

    nodal(&dir)
        .args(["node", "list", "--type", "Database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No nodes found"));
}

#[test]
fn test_edges_and_neighbors() {
    let dir = tempdir().unwrap();
    let react = add_node(&dir, "Technology", "React");
    let ts = add_node(&dir, "Language", "TypeScript");

    let edge = json_output(
        nodal(&dir).args(["edge", "add", &react[..], &ts[..], "-t", "uses", "-w", "0.9"]),
    );
    assert_eq!(edge["sourceId"], react.as_str());
    assert_eq!(edge["weight"], 0.9);

    let out = json_output(nodal(&dir).args(["neighbors", &react[..], "--direction", "out"]));
    assert_eq!(out.as_array().unwrap().len(), 1);
    assert_eq!(out[0]["node"]["label"], "TypeScript");

    let incoming = json_output(nodal(&dir).args(["neighbors", &ts[..]]));
    assert_eq!(incoming[0]["direction"], "in");
    assert_eq!(incoming[0]["node"]["label"], "React");

    nodal(&dir)
        .args(["neighbors", &react[..]])
        .assert()
        .success()
        .stdout(predicate::str::contains("TypeScript").and(predicate::str::contains("uses")));
}

#[test]
fn test_dangling_edge_fails_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let react = add_node(&dir, "Technology", "React");

    nodal(&dir)
        .args(["edge", "add", &react[..], "01ARZ3NDEKTSV4RRFFQ69G5FAV", "-t", "uses"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    let stats = json_output(nodal(&dir).arg("stats"));
    assert_eq!(stats["nodeCount"], 1);
    assert_eq!(stats["edgeCount"], 0);
}

#[test]
fn test_validation_error_exits_nonzero() {
    let dir = tempdir().unwrap();
    nodal(&dir)
        .args(["node", "add", "React", "-t", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_memory_backend_persists_nothing() {
    let dir = tempdir().unwrap();
    nodal(&dir)
        .args(["--backend", "memory", "node", "add", "React", "-t", "Technology"])
        .assert()
        .success();

    let stats = json_output(nodal(&dir).args(["--backend", "memory", "stats"]));
    assert_eq!(stats["nodeCount"], 0);
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_config_set_get() {
    let dir = tempdir().unwrap();
    nodal(&dir)
        .args(["config", "set", "format", "json"])
        .assert()
        .success();
    nodal(&dir)
        .args(["config", "get", "format"])
        .assert()
        .success()
        .stdout("json\n");

    // Configured format applies without a flag
    nodal(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodeCount\": 0"));

    nodal(&dir)
        .args(["config", "set", "backend", "postgres"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempdir().unwrap();
    nodal(&dir).args(["config", "init"]).assert().success();
    nodal(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    nodal(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_completions() {
    let dir = tempdir().unwrap();
    nodal(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodal"));
}

#[test]
fn test_serve_speaks_json_rpc() {
    let dir = tempdir().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","#,
        r#""params":{"name":"graph_stats","arguments":{}}}"#,
        "\n",
    );

    let output = nodal(&dir)
        .args(["--backend", "memory", "serve"])
        .write_stdin(input)
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let responses: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "nodal");
    assert!(responses[1]["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("nodeCount"));
}
