//! CLI integration tests.
//!
//! These tests exercise the CLI commands end-to-end.

use serde_json::json;
use std::path::Path;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEM: &str = "c31146ae5a7d4299a08dd4407526625d";

/// Get the path to the itemvault binary.
fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_itemvault")
}

/// A command isolated from the user's config and environment.
fn itemvault(work_dir: &Path) -> Command {
    let mut cmd = Command::new(binary_path());
    cmd.current_dir(work_dir)
        .env("HOME", work_dir)
        .env("XDG_CONFIG_HOME", work_dir.join(".config"))
        .env_remove("ITEMVAULT_USERNAME")
        .env_remove("ITEMVAULT_TOKEN")
        .env_remove("ITEMVAULT_PORTAL_URL")
        .env_remove("ITEMVAULT_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

async fn mount_item(server: &MockServer, title: &str, views: u64) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{ITEM}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": ITEM, "title": title, "numViews": views})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/sharing/rest/content/items/{ITEM}/data")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"layers": []})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_help_command() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = itemvault(dir.path())
        .arg("--help")
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Archive snapshots of remote items"));
    assert!(stdout.contains("archive"));
    assert!(stdout.contains("history"));
}

#[tokio::test]
async fn test_history_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = itemvault(dir.path())
        .args(["history", ITEM])
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("No snapshots archived for {ITEM}.")));
}

#[tokio::test]
async fn test_archive_requires_credentials() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = itemvault(dir.path())
        .args(["archive", ITEM])
        .output()
        .await
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ITEMVAULT_USERNAME"));
    assert!(!dir.path().join("archive").exists());
}

#[tokio::test]
async fn test_archive_rejects_invalid_item_id() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = itemvault(dir.path())
        .args(["archive", "../etc", "-u", "user", "-t", "token"])
        .args(["--portal", "http://127.0.0.1:9"])
        .output()
        .await
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid item ID"));
}

#[tokio::test]
async fn test_archive_then_no_updates_then_history() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    mount_item(&server, "Parcels", 10).await;
    let first = itemvault(dir.path())
        .args(["archive", ITEM, "-u", "user", "-t", "token"])
        .args(["--portal", &server.uri()])
        .output()
        .await
        .expect("Failed to execute command");
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Parcels completed:"));
    assert!(stdout.contains(&format!("archive/{ITEM}/")));

    // Only the view count changed
    mount_item(&server, "Parcels", 11).await;
    let second = itemvault(dir.path())
        .args(["archive", ITEM, "-u", "user", "-t", "token"])
        .args(["--portal", &server.uri()])
        .output()
        .await
        .expect("Failed to execute command");
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("No updates to Parcels."));

    let history = itemvault(dir.path())
        .args(["history", ITEM])
        .output()
        .await
        .expect("Failed to execute command");
    assert!(history.status.success());
    let stdout = String::from_utf8_lossy(&history.stdout);
    assert_eq!(stdout.matches(".json").count(), 1);
    assert!(!dir.path().join("archive/tmp").join(format!("{ITEM}.json")).exists());
}

#[tokio::test]
async fn test_archive_reads_credentials_from_project_config() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    mount_item(&server, "Roads", 1).await;

    std::fs::write(
        dir.path().join("itemvault.jsonc"),
        format!(
            "{{\n  // test portal\n  \"portal_url\": \"{}\",\n  \"username\": \"u\",\n  \"token\": \"t\"\n}}",
            server.uri()
        ),
    )
    .unwrap();

    let output = itemvault(dir.path())
        .args(["archive", ITEM])
        .output()
        .await
        .expect("Failed to execute command");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Roads completed:"));
}
