use std::path::PathBuf;

use crate::error::SchwabError;

use super::types::{SecretBackend, Settings, StoreBackend};

/// Apply `SCHWAB_CONNECT_*` environment overrides on top of file settings.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), SchwabError> {
    apply_overrides_with(settings, |name| std::env::var(name).ok())
}

/// Same as [`apply_env_overrides`], reading variables through `lookup`.
///
/// Empty values are treated as unset.
pub fn apply_overrides_with<F>(settings: &mut Settings, lookup: F) -> Result<(), SchwabError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(project) = get("SCHWAB_CONNECT_PROJECT_ID") {
        settings.gcp.project_id = Some(project);
    }
    if let Some(name) = get("SCHWAB_CONNECT_SECRET_NAME") {
        settings.gcp.secret_name = name;
    }
    if let Some(backend) = get("SCHWAB_CONNECT_SECRET_BACKEND") {
        settings.secrets.backend = parse_secret_backend(&backend)?;
    }
    if let Some(backend) = get("SCHWAB_CONNECT_STORE") {
        settings.token_store.backend = parse_store_backend(&backend)?;
    }
    if let Some(dir) = get("SCHWAB_CONNECT_STORE_DIR") {
        settings.token_store.directory = Some(PathBuf::from(dir));
    }
    if let Some(collection) = get("SCHWAB_CONNECT_COLLECTION") {
        settings.token_store.collection = collection;
    }
    if let Some(document) = get("SCHWAB_CONNECT_DOCUMENT") {
        settings.token_store.document = document;
    }
    if let Some(url) = get("SCHWAB_CONNECT_API_BASE_URL") {
        settings.schwab.api_base_url = url;
    }
    if let Some(uri) = get("SCHWAB_CONNECT_REDIRECT_URI") {
        settings.schwab.redirect_uri = uri;
    }
    Ok(())
}

fn parse_secret_backend(value: &str) -> Result<SecretBackend, SchwabError> {
    match value {
        "secret-manager" => Ok(SecretBackend::SecretManager),
        "env" => Ok(SecretBackend::Env),
        other => Err(env_error(&format!(
            "Unknown secret backend '{other}': expected 'secret-manager' or 'env'"
        ))),
    }
}

fn parse_store_backend(value: &str) -> Result<StoreBackend, SchwabError> {
    match value {
        "firestore" => Ok(StoreBackend::Firestore),
        "file" => Ok(StoreBackend::File),
        other => Err(env_error(&format!(
            "Unknown token store '{other}': expected 'firestore' or 'file'"
        ))),
    }
}

fn env_error(detail: &str) -> SchwabError {
    SchwabError::ConfigError {
        path: PathBuf::from("<env>"),
        detail: detail.to_string(),
    }
}
