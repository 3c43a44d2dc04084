//! Integration tests for the ractive-to-svelte binary.
//!
//! Each test builds a small workspace in a temporary directory, runs the
//! binary against it with JSON output and inspects the written tree.

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// SHARED TEST INFRASTRUCTURE
// ============================================================================

/// Creates a workspace holding the given files under `client/js`.
fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let path = dir.path().join("client/js").join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

/// Runs the binary against `workspace` with JSON output.
fn run(workspace: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ractive-to-svelte"))
        .arg("--workspace")
        .arg(workspace)
        .args(["--output", "json"])
        .args(extra)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run ractive-to-svelte")
}

fn report(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report")
}

fn read(workspace: &Path, path: &str) -> String {
    fs::read_to_string(workspace.join(path)).unwrap()
}

// ============================================================================
// CONVERSION
// ============================================================================

#[test]
fn converts_templates_to_upper_named_svelte_files() {
    let dir = workspace(&[(
        "fields/input-text.html",
        "<input value=\"{{value}}\" on-change=\"@.update()\"/>\n",
    )]);

    let output = run(dir.path(), &[]);
    assert!(output.status.success());

    assert_eq!(
        read(dir.path(), "client/js-svelte/fields/InputText.svelte"),
        "<input {value} on:change={update}/>"
    );
    let report = report(&output);
    assert_eq!(report["converted"][0]["source"], "client/js/fields/input-text.html");
    assert_eq!(
        report["converted"][0]["output"],
        "client/js-svelte/fields/InputText.svelte"
    );
}

#[test]
fn converts_scripts_in_place_by_name() {
    let dir = workspace(&[("services/api.js", "const http = require('http')\nmodule.exports = http\n")]);

    let output = run(dir.path(), &[]);
    assert!(output.status.success());

    assert_eq!(
        read(dir.path(), "client/js-svelte/services/api.js"),
        "import http from 'http'\nexport default http"
    );
    assert_eq!(report(&output)["converted"][0]["kind"], "script");
}

#[test]
fn writes_store_modules_for_shared_state() {
    let dir = workspace(&[("spinner.html", "{{#if @shared.loading}}<i/>{{/if}}\n")]);

    let output = run(dir.path(), &[]);
    assert!(output.status.success());

    assert_eq!(
        read(dir.path(), "client/js-svelte/stores/loading.js"),
        "import { writable } from 'svelte/store'\nexport default writable(false)\n"
    );
    assert_eq!(
        report(&output)["stores"][0],
        "client/js-svelte/stores/loading.js"
    );
}

#[test]
fn writes_one_store_module_per_shared_key() {
    let dir = workspace(&[
        ("spinner.html", "{{#if @shared.loading}}<i/>{{/if}}\n"),
        ("pages/home.html", "<p>{{@shared.loading}}</p>\n"),
        ("pages/profile.html", "<p>{{@shared.user}} {{@shared.loading}}</p>\n"),
    ]);

    let output = run(dir.path(), &[]);
    assert!(output.status.success());

    let mut written: Vec<String> = fs::read_dir(dir.path().join("client/js-svelte/stores"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["loading.js", "user.js"]);

    assert_eq!(
        read(dir.path(), "client/js-svelte/stores/loading.js"),
        "import { writable } from 'svelte/store'\nexport default writable(false)\n"
    );
    assert_eq!(
        read(dir.path(), "client/js-svelte/stores/user.js"),
        "import { writable } from 'svelte/store'\nexport default writable(null)\n"
    );
    assert_eq!(
        report(&output)["stores"],
        serde_json::json!([
            "client/js-svelte/stores/loading.js",
            "client/js-svelte/stores/user.js"
        ])
    );
}

#[test]
fn counts_follow_ups() {
    let dir = workspace(&[("list.html", "{{#each items}}<li>{{name}}</li>{{/each}}\n")]);

    let output = run(dir.path(), &[]);
    assert!(output.status.success());
    assert_eq!(report(&output)["converted"][0]["followUps"], 1);
}

// ============================================================================
// SKIPPING
// ============================================================================

#[test]
fn skips_paths_from_the_config_file() {
    let dir = workspace(&[("app.html", "<p/>\n"), ("legacy/old.html", "<p/>\n")]);
    fs::write(
        dir.path().join("ractive-to-svelte.json"),
        r#"{ "skip": ["client/js/legacy/**"] }"#,
    )
    .unwrap();

    let output = run(dir.path(), &[]);
    assert!(output.status.success());
    assert!(dir.path().join("client/js-svelte/App.svelte").exists());
    assert!(!dir.path().join("client/js-svelte/legacy").exists());
}

#[test]
fn skips_paths_from_the_command_line() {
    let dir = workspace(&[("app.html", "<p/>\n"), ("card.html", "<p/>\n")]);

    let output = run(dir.path(), &["--skip", "**/card.html"]);
    assert!(output.status.success());
    assert!(dir.path().join("client/js-svelte/App.svelte").exists());
    assert!(!dir.path().join("client/js-svelte/Card.svelte").exists());
    assert_eq!(report(&output)["converted"].as_array().unwrap().len(), 1);
}

// ============================================================================
// RUN MODES AND FAILURES
// ============================================================================

#[test]
fn dry_run_writes_nothing() {
    let dir = workspace(&[("spinner.html", "{{@shared.loading}}\n")]);

    let output = run(dir.path(), &["--dry-run"]);
    assert!(output.status.success());
    assert!(!dir.path().join("client/js-svelte").exists());

    let report = report(&output);
    assert_eq!(report["dryRun"], true);
    assert_eq!(report["converted"][0]["output"], "client/js-svelte/Spinner.svelte");
}

#[test]
fn malformed_config_aborts_the_run() {
    let dir = workspace(&[("app.html", "<p/>\n")]);
    fs::write(dir.path().join("ractive-to-svelte.json"), "{ not json").unwrap();

    let output = run(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!dir.path().join("client/js-svelte").exists());
}

#[test]
fn missing_source_directory_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("source directory not found"));
}
