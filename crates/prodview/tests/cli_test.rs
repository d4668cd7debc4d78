//! Integration tests for the `prodview` CLI binary.
//!
//! Argument parsing, completions, and configuration run without a server;
//! the catalog commands run against a wiremock catalog server.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `prodview` binary with env isolation.
///
/// Clears all `PRODVIEW_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn prodview_cmd() -> assert_cmd::Command {
    prodview_cmd_in(Path::new("/tmp/prodview-cli-test-nonexistent"))
}

fn prodview_cmd_in(config_home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("prodview");
    cmd.env("HOME", config_home)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("PRODVIEW_PROFILE")
        .env_remove("PRODVIEW_SERVER")
        .env_remove("PRODVIEW_OUTPUT")
        .env_remove("PRODVIEW_INSECURE")
        .env_remove("PRODVIEW_TIMEOUT")
        .env_remove("PRODVIEW_MARKUP")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let mut cmd = prodview_cmd();
    cmd.args(["--server", &server.uri(), "--timeout", "5"]).args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn catalog_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "productName": "Leaf Rake",
                "productCode": "GDN-0011",
                "description": "Leaf rake with 48-inch wooden handle",
                "price": 20.0,
                "categoryId": 1,
                "quantityInStock": 15,
                "supplierIds": [2, 1]
            },
            {
                "id": 5,
                "productName": "Hammer",
                "productCode": "TBX-0048",
                "description": "Curved claw steel hammer",
                "price": 8.0,
                "categoryId": 3,
                "quantityInStock": 8
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Garden" },
            { "id": 3, "name": "Toolbox" }
        ])))
        .mount(&server)
        .await;
    for (id, name) in [(1, "Acme Gardening Supply"), (2, "Standard Hardware")] {
        Mock::given(method("GET"))
            .and(path(format!("/api/suppliers/{id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "name": name })),
            )
            .mount(&server)
            .await;
    }
    server
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            combined_output(output)
        )
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = prodview_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    prodview_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("product catalog")
            .and(predicate::str::contains("products"))
            .and(predicate::str::contains("categories"))
            .and(predicate::str::contains("show")),
    );
}

#[test]
fn test_version_flag() {
    prodview_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prodview"));
}

#[test]
fn test_invalid_subcommand() {
    prodview_cmd()
        .arg("nonexistent")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_show_requires_numeric_id() {
    prodview_cmd()
        .args(["show", "rake"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_with_added_conflicts_with_category() {
    prodview_cmd()
        .args(["products", "--with-added", "--category", "1"])
        .assert()
        .failure()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    prodview_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    prodview_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prodview"));
}

#[test]
fn test_completions_fish() {
    prodview_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prodview"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_products_without_server_fails() {
    let output = prodview_cmd().arg("products").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No catalog server configured"),
        "Expected missing-config message:\n{text}"
    );
}

#[test]
fn test_unknown_profile_fails() {
    let output = prodview_cmd()
        .args(["--profile", "staging", "products"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("staging"));
}

#[test]
fn test_config_path() {
    prodview_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_rejects_bad_scheme() {
    let home = tempfile::tempdir().unwrap();
    prodview_cmd_in(home.path())
        .args(["config", "init", "--server", "ftp://catalog.local"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_config_init_then_show() {
    let home = tempfile::tempdir().unwrap();

    prodview_cmd_in(home.path())
        .args([
            "config",
            "init",
            "--server",
            "http://localhost:4200",
            "--profile",
            "local",
            "--refresh-interval",
            "60",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration written"));

    let output = prodview_cmd_in(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let cfg = stdout_json(&output);
    assert_eq!(cfg["default_profile"], "local");
    assert_eq!(cfg["profiles"]["local"]["server"], "http://localhost:4200");
    assert_eq!(cfg["profiles"]["local"]["refresh_interval_secs"], 60);
}

// ── Catalog commands ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_products_json_is_enriched() {
    let server = catalog_server().await;
    let output = run_against(&server, &["products", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let products = stdout_json(&output);
    let list = products.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["name"], "Leaf Rake");
    assert_eq!(list[0]["category"], "Garden");
    assert_eq!(list[0]["price"], 30.0);
    assert_eq!(list[1]["category"], "Toolbox");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_category_filter() {
    let server = catalog_server().await;
    let output = run_against(&server, &["products", "--category", "3", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_products_with_added_placeholder() {
    let server = catalog_server().await;
    let output = run_against(&server, &["products", "--with-added", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let ids: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect();
    assert_eq!(ids, ["1", "5", "42"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_categories_table() {
    let server = catalog_server().await;
    let output = run_against(&server, &["categories", "--color", "never"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Garden") && text.contains("Toolbox"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_lists_suppliers_in_order() {
    let server = catalog_server().await;
    let output = run_against(&server, &["show", "1", "-o", "json"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let detail = stdout_json(&output);
    assert_eq!(detail["title"], "Product Detail for: Leaf Rake");
    let names: Vec<&str> = detail["suppliers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Standard Hardware", "Acme Gardening Supply"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_unknown_product_is_not_found() {
    let server = catalog_server().await;
    let output = run_against(&server, &["show", "99"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_error_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let output = run_against(&server, &["products"]).await;
    assert_eq!(output.status.code(), Some(5));
    assert!(
        combined_output(&output).contains("Backend returned code 500"),
        "{}",
        combined_output(&output)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_session_runs_commands_from_stdin() {
    let server = catalog_server().await;
    let mut cmd = prodview_cmd();
    cmd.args(["--server", &server.uri(), "-o", "plain", "session"])
        .write_stdin("category 1\nadd\nquit\n");
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect();
    // Initial list, the category 1 filter, then the list with the insert.
    assert_eq!(lines, ["1", "5", "1", "1", "5", "42"]);
}
