//! Application credentials from a secret vault.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::GcpSettings;
use crate::error::SchwabError;
use crate::gcp::AccessTokenSource;

pub type SecretMap = Map<String, Value>;

/// The Schwab application key and secret.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub app_key: String,
    pub app_secret: String,
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

impl CredentialPair {
    /// Build from a secret mapping holding `app-key` and `app-secret`.
    pub fn from_secret_map(secret_name: &str, map: &SecretMap) -> Result<Self, SchwabError> {
        let field = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| SchwabError::SecretMalformed {
                    name: secret_name.to_string(),
                    detail: format!("missing string entry '{key}'"),
                })
        };
        Ok(Self {
            app_key: field("app-key")?,
            app_secret: field("app-secret")?,
        })
    }
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch a secret version and parse its payload as a JSON object.
    async fn access_secret(
        &self,
        project_id: &str,
        secret_name: &str,
        version: &str,
    ) -> Result<SecretMap, SchwabError>;
}

/// Google Secret Manager over its REST API.
pub struct SecretManagerClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AccessTokenSource>,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: String,
}

impl SecretManagerClient {
    pub fn new(base_url: &str, auth: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn version_url(&self, project_id: &str, secret_name: &str, version: &str) -> String {
        format!(
            "{}/v1/projects/{project_id}/secrets/{secret_name}/versions/{version}:access",
            self.base_url
        )
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn access_secret(
        &self,
        project_id: &str,
        secret_name: &str,
        version: &str,
    ) -> Result<SecretMap, SchwabError> {
        let unavailable = |detail: String| SchwabError::SecretUnavailable {
            name: secret_name.to_string(),
            detail,
        };

        let token = self.auth.access_token().await?;
        let url = self.version_url(project_id, secret_name, version);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(unavailable(format!("status {status}: {body}")));
        }

        let version_resp: AccessSecretVersionResponse = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("unexpected response: {e}")))?;

        let secret = decode_payload(secret_name, &version_resp.payload.data)?;
        tracing::debug!("Retrieved {version} secret value for {secret_name}");
        Ok(secret)
    }
}

/// Decode a base64 secret payload into a JSON object.
fn decode_payload(secret_name: &str, data: &str) -> Result<SecretMap, SchwabError> {
    let malformed = |detail: String| SchwabError::SecretMalformed {
        name: secret_name.to_string(),
        detail,
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| malformed(format!("payload is not base64: {e}")))?;
    let text =
        String::from_utf8(bytes).map_err(|e| malformed(format!("payload is not UTF-8: {e}")))?;
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed("payload is not a JSON object".into())),
        Err(e) => Err(malformed(format!("payload is not JSON: {e}"))),
    }
}

/// Secrets held in process, keyed by secret name.
#[derive(Debug, Default, Clone)]
pub struct StaticSecretStore {
    secrets: HashMap<String, SecretMap>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: &str, secret: SecretMap) -> Self {
        self.secrets.insert(name.to_string(), secret);
        self
    }

    /// Expose `SCHWAB_APP_KEY` / `SCHWAB_APP_SECRET` under `secret_name`.
    pub fn from_env(secret_name: &str) -> Result<Self, SchwabError> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| SchwabError::SecretUnavailable {
                name: secret_name.to_string(),
                detail: format!("environment variable {var} is not set"),
            })
        };
        let mut map = SecretMap::new();
        map.insert("app-key".into(), Value::String(read("SCHWAB_APP_KEY")?));
        map.insert("app-secret".into(), Value::String(read("SCHWAB_APP_SECRET")?));
        Ok(Self::new().with_secret(secret_name, map))
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn access_secret(
        &self,
        _project_id: &str,
        secret_name: &str,
        _version: &str,
    ) -> Result<SecretMap, SchwabError> {
        self.secrets
            .get(secret_name)
            .cloned()
            .ok_or_else(|| SchwabError::SecretUnavailable {
                name: secret_name.to_string(),
                detail: "not found".into(),
            })
    }
}

/// Fetch the application credentials once, at startup.
pub async fn load_credentials(
    store: &dyn SecretStore,
    gcp: &GcpSettings,
) -> Result<CredentialPair, SchwabError> {
    let project_id = gcp.project_id.as_deref().unwrap_or_default();
    let secret = store
        .access_secret(project_id, &gcp.secret_name, &gcp.secret_version)
        .await?;
    CredentialPair::from_secret_map(&gcp.secret_name, &secret)
}
