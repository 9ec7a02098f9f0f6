use std::path::{Path, PathBuf};

use crate::error::SchwabError;

use super::env::apply_env_overrides;
use super::types::Settings;

/// Find the settings file to load, if any.
///
/// Precedence:
/// 1. `--config` CLI flag
/// 2. `SCHWAB_CONNECT_CONFIG` env var
/// 3. `./config/schwab-connect.json` (project-level)
/// 4. `~/.schwab-connect/config.json` (home-level)
pub fn discover_config_file(cli_config: Option<&str>) -> Result<Option<PathBuf>, SchwabError> {
    // An explicit path must exist.
    if let Some(path) = cli_config {
        let p = PathBuf::from(path);
        if !p.exists() {
            return Err(SchwabError::ConfigError {
                path: p,
                detail: "File does not exist".into(),
            });
        }
        return Ok(Some(p));
    }

    if let Ok(env_path) = std::env::var("SCHWAB_CONNECT_CONFIG") {
        let p = PathBuf::from(&env_path);
        if p.exists() {
            return Ok(Some(p));
        }
        tracing::warn!("SCHWAB_CONNECT_CONFIG points at missing file {}", p.display());
    }

    let project_config = PathBuf::from("./config/schwab-connect.json");
    if project_config.exists() {
        return Ok(Some(project_config));
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".schwab-connect").join("config.json");
        if home_config.exists() {
            return Ok(Some(home_config));
        }
    }

    Ok(None)
}

/// Parse a single settings file.
pub fn load_settings_file(path: &Path) -> Result<Settings, SchwabError> {
    let content = std::fs::read_to_string(path).map_err(|e| SchwabError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Cannot read file: {}", e),
    })?;

    serde_json::from_str::<Settings>(&content).map_err(|e| SchwabError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Invalid JSON: {}", e),
    })
}

/// Load settings from the discovered file (or defaults), then apply env overrides.
pub fn load_settings(cli_config: Option<&str>) -> Result<Settings, SchwabError> {
    let mut settings = match discover_config_file(cli_config)? {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            load_settings_file(&path)?
        }
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}
