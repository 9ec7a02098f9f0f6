pub mod schwab_mock;

use std::path::Path;

use schwab_connect::config::SchwabSettings;
use schwab_connect::store::Document;
use schwab_connect::{CredentialPair, DocumentRef};
use wiremock::MockServer;

pub const APP_KEY: &str = "test-app-key";
pub const APP_SECRET: &str = "test-app-secret";

#[allow(dead_code)]
pub fn credentials() -> CredentialPair {
    CredentialPair {
        app_key: APP_KEY.into(),
        app_secret: APP_SECRET.into(),
    }
}

/// Schwab settings pointing every endpoint at the mock server.
#[allow(dead_code)]
pub fn schwab_settings(server: &MockServer) -> SchwabSettings {
    SchwabSettings {
        api_base_url: server.uri(),
        redirect_uri: "https://127.0.0.1".into(),
    }
}

#[allow(dead_code)]
pub fn token_doc() -> DocumentRef {
    DocumentRef::new("schwab-tokens", "schwab-tokens-auth")
}

/// Build a document body from a JSON object literal.
#[allow(dead_code)]
pub fn document(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("document must be a JSON object")
}

/// Write a settings file using the file store and env credentials.
#[allow(dead_code)]
pub fn write_settings(dir: &Path, server: &MockServer) -> std::path::PathBuf {
    let settings = serde_json::json!({
        "secrets": { "backend": "env" },
        "tokenStore": {
            "backend": "file",
            "directory": dir.join("store"),
        },
        "schwab": { "apiBaseUrl": server.uri() }
    });
    let path = dir.join("schwab-connect.json");
    std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
    path
}
