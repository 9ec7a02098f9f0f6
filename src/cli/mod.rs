pub mod account;
pub mod init;
pub mod refresh;
pub mod serve;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use crate::config::{SecretBackend, Settings, StoreBackend};
use crate::error::SchwabError;
use crate::gcp::default_token_source;
use crate::oauth::OAuthClient;
use crate::secrets::{load_credentials, SecretManagerClient, SecretStore, StaticSecretStore};
use crate::store::{file, DocumentRef, DocumentStore, FileStore, FirestoreStore};

/// Everything a command needs, built once per invocation from settings.
pub struct Context {
    pub settings: Settings,
    pub store: Arc<dyn DocumentStore>,
    pub document: DocumentRef,
}

impl Context {
    pub fn from_settings(settings: Settings) -> Result<Self, SchwabError> {
        let store = build_store(&settings)?;
        let document = DocumentRef::new(
            settings.token_store.collection.clone(),
            settings.token_store.document.clone(),
        );
        Ok(Self {
            settings,
            store,
            document,
        })
    }

    /// Fetch the application credentials and build the OAuth client.
    pub async fn oauth_client(&self) -> Result<OAuthClient, SchwabError> {
        let secrets = build_secret_store(&self.settings)?;
        let credentials = load_credentials(secrets.as_ref(), &self.settings.gcp).await?;
        Ok(OAuthClient::new(&self.settings.schwab, credentials))
    }
}

fn require_project_id(settings: &Settings) -> Result<&str, SchwabError> {
    settings
        .gcp
        .project_id
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| SchwabError::ConfigError {
            path: PathBuf::from("<settings>"),
            detail: "gcp.projectId is required (or set SCHWAB_CONNECT_PROJECT_ID)".into(),
        })
}

pub fn build_store(settings: &Settings) -> Result<Arc<dyn DocumentStore>, SchwabError> {
    match settings.token_store.backend {
        StoreBackend::Firestore => {
            let project_id = require_project_id(settings)?;
            Ok(Arc::new(FirestoreStore::new(
                &settings.gcp.firestore_url,
                project_id,
                &settings.gcp.database,
                default_token_source(),
            )))
        }
        StoreBackend::File => {
            let root = settings
                .token_store
                .directory
                .clone()
                .unwrap_or_else(file::default_root);
            Ok(Arc::new(FileStore::new(root)))
        }
    }
}

pub fn build_secret_store(settings: &Settings) -> Result<Box<dyn SecretStore>, SchwabError> {
    match settings.secrets.backend {
        SecretBackend::SecretManager => {
            require_project_id(settings)?;
            Ok(Box::new(SecretManagerClient::new(
                &settings.gcp.secret_manager_url,
                default_token_source(),
            )))
        }
        SecretBackend::Env => Ok(Box::new(StaticSecretStore::from_env(
            &settings.gcp.secret_name,
        )?)),
    }
}

pub(crate) fn label(text: &str) -> String {
    if std::io::stdout().is_terminal() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

pub(crate) fn success(text: &str) -> String {
    if std::io::stdout().is_terminal() {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}
