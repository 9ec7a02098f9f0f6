use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.schwabapi.com";
pub const DEFAULT_REDIRECT_URI: &str = "https://127.0.0.1";
pub const DEFAULT_SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com";
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub gcp: GcpSettings,
    pub secrets: SecretSettings,
    pub token_store: TokenStoreSettings,
    pub schwab: SchwabSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GcpSettings {
    pub project_id: Option<String>,
    pub secret_name: String,
    pub secret_version: String,
    pub secret_manager_url: String,
    pub firestore_url: String,
    pub database: String,
}

impl Default for GcpSettings {
    fn default() -> Self {
        Self {
            project_id: None,
            secret_name: "cs-app-key".into(),
            secret_version: "latest".into(),
            secret_manager_url: DEFAULT_SECRET_MANAGER_URL.into(),
            firestore_url: DEFAULT_FIRESTORE_URL.into(),
            database: "(default)".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretBackend {
    #[default]
    SecretManager,
    Env,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecretSettings {
    pub backend: SecretBackend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    Firestore,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenStoreSettings {
    pub backend: StoreBackend,
    pub collection: String,
    pub document: String,
    /// Root directory for the file backend. Defaults to `~/.schwab-connect/store`.
    pub directory: Option<PathBuf>,
}

impl Default for TokenStoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Firestore,
            collection: "schwab-tokens".into(),
            document: "schwab-tokens-auth".into(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchwabSettings {
    pub api_base_url: String,
    pub redirect_uri: String,
}

impl Default for SchwabSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
        }
    }
}

impl SchwabSettings {
    fn base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/v1/oauth/authorize", self.base())
    }

    pub fn token_url(&self) -> String {
        format!("{}/v1/oauth/token", self.base())
    }

    pub fn trader_base_url(&self) -> String {
        format!("{}/trader/v1", self.base())
    }
}
