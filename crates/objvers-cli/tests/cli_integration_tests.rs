//! CLI integration tests
//!
//! Run the `objvers` binary against a temporary schema, documents and
//! history database.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = r#"
schema_version: 0
types:
  - name: Person
    properties:
      - { name: id, type: i64, id: true }
      - { name: name, type: String }
      - { name: tags, type: "List<String>" }
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("objvers.yaml"), SCHEMA).unwrap();
        Self { dir }
    }

    fn document(&self, name: &str, json: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, json).unwrap();
        path
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_objvers"))
            .current_dir(self.dir.path())
            .args(args)
            .output()
            .expect("Failed to execute CLI")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_diff_prints_value_change() {
    let ws = Workspace::new();
    ws.document("old.json", r#"{ "$type": "Person", "id": 1, "name": "Ann" }"#);
    ws.document("new.json", r#"{ "$type": "Person", "id": 1, "name": "Anna" }"#);

    let output = ws.run(&["diff", "old.json", "new.json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("'name' changed from 'Ann' to 'Anna'"));
    assert!(!ws.path().join(".objvers").exists(), "diff must not create a database");
}

#[test]
fn test_diff_json_output() {
    let ws = Workspace::new();
    ws.document("old.json", r#"{ "$type": "Person", "id": 1, "tags": ["a", "b", "c"] }"#);
    ws.document("new.json", r#"{ "$type": "Person", "id": 1, "tags": ["a", "c"] }"#);

    let output = ws.run(&["diff", "old.json", "new.json", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["change_type"], "ListChange");
    assert_eq!(json[0]["elements"][0]["kind"], "ElementRemoved");
    assert_eq!(json[0]["elements"][0]["index"], 1);
}

#[test]
fn test_commit_history_delete_latest() {
    let ws = Workspace::new();
    ws.document("v1.json", r#"{ "$type": "Person", "id": 1, "name": "Ann" }"#);
    ws.document("v2.json", r#"{ "$type": "Person", "id": 1, "name": "Anna" }"#);

    let first = ws.run(&["commit", "v1.json", "--author", "ann"]);
    assert!(first.status.success(), "stderr: {}", String::from_utf8_lossy(&first.stderr));
    assert!(stdout(&first).starts_with("Committed 1.0"));
    assert!(ws.path().join(".objvers/store.db").exists());

    let again = ws.run(&["commit", "v1.json", "--author", "ann"]);
    assert_eq!(stdout(&again).trim(), "No changes");

    let second = ws.run(&["commit", "v2.json", "--author", "ann"]);
    assert!(stdout(&second).starts_with("Committed 2.0"));

    let deleted = ws.run(&["delete", "Person/1", "--author", "ann"]);
    assert!(deleted.status.success());
    assert!(stdout(&deleted).contains("Person/1 v3 TERMINAL"));

    let history = ws.run(&["history", "Person/1"]);
    let lines: Vec<String> = stdout(&history).lines().map(String::from).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("3.0 Person/1 v3 TERMINAL"));

    let latest = ws.run(&["latest", "Person/1"]);
    assert!(latest.status.success());
    let snapshot: serde_json::Value = serde_json::from_str(&stdout(&latest)).unwrap();
    assert_eq!(snapshot["commit"]["id"], "2.0");
    assert!(String::from_utf8_lossy(&latest.stderr).contains("is deleted"));

    let changes = ws.run(&["changes", "Person/1", "--from", "2.0"]);
    let log = stdout(&changes);
    assert!(log.contains("commit 3.0"));
    assert!(log.contains("- object removed"));
    assert!(log.contains("'name' changed from 'Ann' to 'Anna'"));
}

#[test]
fn test_errors_exit_non_zero() {
    let ws = Workspace::new();

    let unknown = ws.run(&["delete", "Person/404", "--author", "ann"]);
    assert!(!unknown.status.success());
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("ERR_NOT_FOUND"));

    ws.document("bad.json", r#"{ "$type": "Person", "name": "No id" }"#);
    let missing_id = ws.run(&["commit", "bad.json", "--author", "ann"]);
    assert!(!missing_id.status.success());
    assert!(String::from_utf8_lossy(&missing_id.stderr).contains("ERR_MISSING_ID"));

    let bad_id = ws.run(&["latest", "Person"]);
    assert!(!bad_id.status.success());
}
