//! End-to-end tests for the `tq` binary.
//!
//! Each test runs the compiled binary in a sandbox with its own config file
//! and projects file, and checks JSON output and exit codes.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const PROJECTS_JSON: &str = r#"[
    {"id": "1", "name": "Backend", "aliases": ["be", "api"]},
    {"id": "2", "name": "Frontend", "aliases": ["fe"]},
    {"id": "3", "name": "Home Renovation"}
]"#;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary sandbox");
        fs::write(dir.path().join("projects.json"), PROJECTS_JSON)
            .expect("failed to write projects file");
        Self { dir }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("tq-config.toml")
    }

    fn projects_path(&self) -> String {
        self.dir.path().join("projects.json").display().to_string()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_tq"))
            .args(args)
            .env("TQ_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("TQ_LOG")
            .env_remove("TQ_PROJECTS")
            .output()
            .expect("failed to run tq")
    }

    /// Runs with `--json` and returns the exit code and parsed stdout.
    fn run_json(&self, args: &[&str]) -> (i32, Value) {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = serde_json::from_str(&stdout).unwrap_or_else(|err| {
            panic!(
                "command did not emit valid JSON\nargs: {:?}\nerror: {}\nstdout:\n{}\nstderr:\n{}",
                args,
                err,
                stdout,
                String::from_utf8_lossy(&output.stderr)
            )
        });
        (exit_code(&output), value)
    }

    /// Runs with `--json`, expects failure and returns the error object.
    fn run_json_error(&self, args: &[&str]) -> (i32, Value) {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let value: Value = serde_json::from_str(&stderr)
            .unwrap_or_else(|err| panic!("stderr is not JSON ({err}):\n{stderr}"));
        (exit_code(&output), value["error"].clone())
    }
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("process exited with a code")
}

// ============================================================================
// Tokens and Parse
// ============================================================================

#[test]
fn test_tokens_json() {
    let sandbox = Sandbox::new();
    let (code, value) = sandbox.run_json(&["tokens", "status:pending"]);

    assert_eq!(code, 0);
    let kinds: Vec<&str> = value["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["field", "colon", "value", "eof"]);
}

#[test]
fn test_parse_partial_exit_code() {
    let sandbox = Sandbox::new();
    let (code, value) = sandbox.run_json(&["parse", "priority:<> tag:x"]);

    assert_eq!(code, 2);
    assert_eq!(value["errors"].as_array().unwrap().len(), 1);
    assert_eq!(value["clauses"][0]["field"], "tag");
}

#[test]
fn test_tokens_table_output() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["tokens", "@~web"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Pos"));
    assert!(stdout.contains("tilde"));
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_filter_query() {
    let sandbox = Sandbox::new();
    let projects = sandbox.projects_path();
    let (code, value) = sandbox.run_json(&[
        "filter",
        "@be priority:high due:none -tag:later",
        "--projects",
        &projects,
    ]);

    assert_eq!(code, 0);
    assert_eq!(value["input"], "query");
    assert_eq!(value["filter"]["project_id"], "1");
    assert_eq!(value["filter"]["priority"], "high");
    assert_eq!(value["filter"]["due"]["kind"], "missing");
    assert_eq!(value["filter"]["exclude_tags"][0], "later");
    assert_eq!(value["filter"]["sort_by"], "created");
    assert_eq!(value["filter"]["sort_order"], "desc");
}

#[test]
fn test_filter_plain_text_fuzzy() {
    let sandbox = Sandbox::new();
    let projects = sandbox.projects_path();
    let (code, value) = sandbox.run_json(&[
        "filter",
        "fix  login @~back",
        "--projects",
        &projects,
        "--search",
        "fuzzy",
    ]);

    assert_eq!(code, 0);
    assert_eq!(value["input"], "text");
    assert_eq!(value["filter"]["project_id"], "1");
    assert_eq!(value["filter"]["search_query"], "fix login");
    assert_eq!(value["filter"]["search_mode"], "fuzzy");
}

#[test]
fn test_filter_partial_result() {
    let sandbox = Sandbox::new();
    let projects = sandbox.projects_path();
    let (code, value) = sandbox.run_json(&[
        "filter",
        "project:Nowhere tag:ops",
        "--projects",
        &projects,
    ]);

    assert_eq!(code, 2);
    assert_eq!(value["filter"]["tags"][0], "ops");
    assert!(value["filter"].get("project_id").is_none());
    assert_eq!(value["convert_errors"][0]["text"], "project:Nowhere");
    assert!(value["convert_errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("not found"));
}

#[test]
fn test_filter_lexer_failure() {
    let sandbox = Sandbox::new();
    let (code, error) = sandbox.run_json_error(&["filter", "tag:\"open"]);

    assert_eq!(code, 1);
    assert_eq!(error["code"], "LEX_ERROR");
}

#[test]
fn test_filter_missing_projects_file() {
    let sandbox = Sandbox::new();
    let (code, error) =
        sandbox.run_json_error(&["filter", "@be", "--projects", "/nonexistent/projects.json"]);

    assert_eq!(code, 1);
    assert_eq!(error["code"], "PROJECTS_ERROR");
}

// ============================================================================
// Match
// ============================================================================

#[test]
fn test_match_threshold() {
    let sandbox = Sandbox::new();
    let (code, value) =
        sandbox.run_json(&["match", "back", "Frontend", "Backend", "-t", "50"]);

    assert_eq!(code, 0);
    let matches = value["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["text"], "Backend");
    assert_eq!(matches[0]["index"], 1);
}

// ============================================================================
// Config and Completions
// ============================================================================

#[test]
fn test_config_set_changes_filter_defaults() {
    let sandbox = Sandbox::new();

    let (code, _) = sandbox.run_json(&["config", "set", "sort.key", "due"]);
    assert_eq!(code, 0);
    assert!(sandbox.config_path().exists());

    let (_, shown) = sandbox.run_json(&["config", "show"]);
    assert_eq!(shown["config"]["sort"]["key"], "due");

    let (_, value) = sandbox.run_json(&["filter", "tag:x"]);
    assert_eq!(value["filter"]["sort_by"], "due");

    let (_, value) = sandbox.run_json(&["filter", "tag:x", "--sort", "title"]);
    assert_eq!(value["filter"]["sort_by"], "title");
}

#[test]
fn test_config_set_unknown_key() {
    let sandbox = Sandbox::new();
    let (code, error) = sandbox.run_json_error(&["config", "set", "colour", "on"]);

    assert_eq!(code, 1);
    assert_eq!(error["code"], "CONFIG_ERROR");
}

#[test]
fn test_config_path_with_broken_config() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.config_path(), "this is not toml =").unwrap();

    let output = sandbox.run(&["config", "path"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("tq-config.toml"));

    let (code, error) = sandbox.run_json_error(&["tokens", "x"]);
    assert_eq!(code, 1);
    assert_eq!(error["code"], "CONFIG_ERROR");
}

#[test]
fn test_completions_bash() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["completions", "bash"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("_tq()"));
}
