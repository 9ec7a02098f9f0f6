use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SchwabError {
    #[error("Secret '{name}' is unavailable: {detail}")]
    SecretUnavailable { name: String, detail: String },

    #[error("Secret '{name}' is malformed: {detail}")]
    SecretMalformed { name: String, detail: String },

    #[error("Google Cloud authentication failed: {0}")]
    GcpAuth(String),

    #[error("No stored '{key}' in {collection}/{document}. Run: schwab-connect init")]
    NoStoredToken {
        collection: String,
        document: String,
        key: String,
    },

    #[error("Document store error for {collection}/{document}: {detail}")]
    StoreError {
        collection: String,
        document: String,
        detail: String,
    },

    #[error("Invalid redirect URL: {0}")]
    RedirectParse(String),

    #[error("Authorization code exchange failed with status {status}: {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("Token refresh failed with status {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("No accounts returned by the account numbers endpoint")]
    NoAccounts,

    #[error("Access token rejected with status {0}. Run: schwab-connect refresh")]
    AuthExpired(u16),

    #[error("Request to {url} failed: {detail}")]
    Http { url: String, detail: String },

    #[error("Error in config {}: {detail}", path.display())]
    ConfigError { path: PathBuf, detail: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SchwabError {
    /// Stable error code string, used by the trigger server logs.
    pub fn code(&self) -> &'static str {
        match self {
            SchwabError::SecretUnavailable { .. } => "secret_unavailable",
            SchwabError::SecretMalformed { .. } => "secret_malformed",
            SchwabError::GcpAuth(_) => "gcp_auth",
            SchwabError::NoStoredToken { .. } => "no_stored_token",
            SchwabError::StoreError { .. } => "store_error",
            SchwabError::RedirectParse(_) => "redirect_parse",
            SchwabError::ExchangeFailed { .. } => "exchange_failed",
            SchwabError::RefreshFailed { .. } => "refresh_failed",
            SchwabError::NoAccounts => "no_accounts",
            SchwabError::AuthExpired(_) => "auth_expired",
            SchwabError::Http { .. } => "http_error",
            SchwabError::ConfigError { .. } => "config_error",
            SchwabError::IoError(_) => "io_error",
        }
    }

    pub(crate) fn http(url: &str, detail: impl std::fmt::Display) -> Self {
        SchwabError::Http {
            url: url.to_string(),
            detail: detail.to_string(),
        }
    }
}
