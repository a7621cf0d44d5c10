//! Helpers for driving the `warden` binary against a mock provider.

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an unsigned JWT expiring `lifetime_secs` from now.
pub fn jwt(lifetime_secs: i64, label: &str) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(json!({ "sub": label, "iat": now, "exp": now + lifetime_secs }).to_string());
    format!("{header}.{payload}.signature")
}

/// Run the CLI against `server`, keeping credentials under `store`.
pub async fn run_cli(args: &[&str], server: &MockServer, store: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_warden"))
        .args(args)
        .env("WARDEN_API_URL", server.uri())
        .env("WARDEN_STORE_DIR", store)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], server: &MockServer, store: &Path) -> String {
    let output = run_cli(args, server, store).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], server: &MockServer, store: &Path) -> String {
    let output = run_cli(args, server, store).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Mount a login endpoint accepting `validuser` / `secret12`.
pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(wiremock::matchers::body_partial_json(json!({
            "username": "validuser",
            "password": "secret12"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "username": "validuser",
            "email": "valid@example.com",
            "firstName": "Valid",
            "lastName": "User",
            "accessToken": access,
            "refreshToken": refresh
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .with_priority(10)
        .mount(server)
        .await;
}
