use std::path::Path;
use std::process::Output;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::MockServer;

mod common;

use common::schwab_mock::{mount_account_numbers, mount_code_exchange, mount_refresh};

const CONFIG_VARS: [&str; 10] = [
    "SCHWAB_CONNECT_CONFIG",
    "SCHWAB_CONNECT_PROJECT_ID",
    "SCHWAB_CONNECT_SECRET_NAME",
    "SCHWAB_CONNECT_SECRET_BACKEND",
    "SCHWAB_CONNECT_STORE",
    "SCHWAB_CONNECT_STORE_DIR",
    "SCHWAB_CONNECT_COLLECTION",
    "SCHWAB_CONNECT_DOCUMENT",
    "SCHWAB_CONNECT_API_BASE_URL",
    "SCHWAB_CONNECT_REDIRECT_URI",
];

fn schwab_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("schwab-connect").unwrap();
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--config")
        .arg(config)
        .env("SCHWAB_APP_KEY", common::APP_KEY)
        .env("SCHWAB_APP_SECRET", common::APP_SECRET)
        .env("SCHWAB_CONNECT_LOG", "warn");
    cmd
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(config: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let config = config.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let stdin = stdin.map(str::to_owned);
    tokio::task::spawn_blocking(move || {
        let mut cmd = schwab_cmd(&config);
        cmd.args(&args);
        if let Some(input) = stdin {
            cmd.write_stdin(input);
        }
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

fn token_file(dir: &Path) -> std::path::PathBuf {
    dir.join("store")
        .join("schwab-tokens")
        .join("schwab-tokens-auth.json")
}

fn seed_tokens(dir: &Path, body: serde_json::Value) {
    let path = token_file(dir);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body.to_string()).unwrap();
}

fn read_tokens(dir: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(token_file(dir)).unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_without_stored_token_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_settings(dir.path(), &server);

    run(&config, &["refresh"], None)
        .await
        .assert()
        .failure()
        .stdout(predicate::str::contains("Done!").not())
        .stderr(predicate::str::contains("No stored 'refresh_token'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_prints_marker_and_overwrites_file() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        200,
        json!({"access_token": "new-a", "refresh_token": "new-r", "expires_in": 1800}),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_settings(dir.path(), &server);
    seed_tokens(
        dir.path(),
        json!({"access_token": "old-a", "refresh_token": "old-r", "scope": "api"}),
    );

    run(&config, &["refresh"], None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Done!"));

    assert_eq!(
        read_tokens(dir.path()),
        json!({"access_token": "new-a", "refresh_token": "new-r", "expires_in": 1800})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_rejected_exits_nonzero() {
    let server = MockServer::start().await;
    mount_refresh(&server, 401, json!({"error": "invalid_grant"})).await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_settings(dir.path(), &server);
    let original = json!({"access_token": "old-a", "refresh_token": "old-r"});
    seed_tokens(dir.path(), original.clone());

    run(&config, &["refresh"], None)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("status 401"));

    assert_eq!(read_tokens(dir.path()), original);
}

#[tokio::test(flavor = "multi_thread")]
async fn account_prints_first_hash_value() {
    let server = MockServer::start().await;
    mount_account_numbers(
        &server,
        "stored-a",
        200,
        json!([
            {"accountNumber": "1", "hashValue": "H1"},
            {"accountNumber": "2", "hashValue": "H2"}
        ]),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_settings(dir.path(), &server);
    seed_tokens(
        dir.path(),
        json!({"access_token": "stored-a", "refresh_token": "r"}),
    );

    run(&config, &["account", "--json"], None)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hashValue\": \"H1\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn init_reads_pasted_url_from_stdin() {
    let server = MockServer::start().await;
    mount_code_exchange(
        &server,
        200,
        json!({"access_token": "init-a", "refresh_token": "init-r", "expires_in": 1800}),
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_settings(dir.path(), &server);

    run(
        &config,
        &["init", "--no-browser"],
        Some("https://127.0.0.1/?code=C0.xyz%40&session=abc\n"),
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("client_id=test-app-key"))
    .stdout(predicate::str::contains("Done!"));

    assert_eq!(read_tokens(dir.path())["refresh_token"], "init-r");
}

#[test]
fn missing_config_file_fails() {
    Command::cargo_bin("schwab-connect")
        .unwrap()
        .args(["--config", "/nonexistent/schwab-connect.json", "refresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}
