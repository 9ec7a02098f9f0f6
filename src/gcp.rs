//! Access tokens for Google Cloud REST APIs (Secret Manager, Firestore).

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SchwabError;

/// Environment variable holding a pre-minted Google OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// Return a bearer token for the Google Cloud APIs.
    async fn access_token(&self) -> Result<String, SchwabError>;
}

/// A fixed token, typically from `gcloud auth print-access-token`.
pub struct StaticAccessToken(String);

impl StaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticAccessToken {
    async fn access_token(&self) -> Result<String, SchwabError> {
        Ok(self.0.clone())
    }
}

/// Service account token from the Compute / Cloud Functions metadata server.
pub struct MetadataServer {
    client: reqwest::Client,
    token_url: String,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

impl MetadataServer {
    /// `host` is `host[:port]`, as in `GCE_METADATA_HOST`.
    pub fn new(host: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: format!(
                "http://{host}/computeMetadata/v1/instance/service-accounts/default/token"
            ),
        }
    }
}

#[async_trait]
impl AccessTokenSource for MetadataServer {
    async fn access_token(&self) -> Result<String, SchwabError> {
        let resp = self
            .client
            .get(&self.token_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SchwabError::GcpAuth(format!("Metadata server unreachable: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SchwabError::GcpAuth(format!(
                "Metadata server returned status {status}: {body}"
            )));
        }

        let token: MetadataToken = resp.json().await.map_err(|e| {
            SchwabError::GcpAuth(format!("Failed to parse metadata token: {e}"))
        })?;
        Ok(token.access_token)
    }
}

/// Pick a token source from the environment: an explicit token if set,
/// otherwise the metadata server.
pub fn default_token_source() -> Arc<dyn AccessTokenSource> {
    match std::env::var(ACCESS_TOKEN_ENV) {
        Ok(token) if !token.is_empty() => Arc::new(StaticAccessToken::new(token)),
        _ => {
            let host = std::env::var("GCE_METADATA_HOST")
                .unwrap_or_else(|_| DEFAULT_METADATA_HOST.to_string());
            tracing::debug!("Using metadata server at {host} for Google credentials");
            Arc::new(MetadataServer::new(&host))
        }
    }
}
