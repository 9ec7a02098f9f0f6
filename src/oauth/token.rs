use base64::Engine;
use serde_json::Value;

use crate::config::SchwabSettings;
use crate::error::SchwabError;
use crate::secrets::CredentialPair;
use crate::store::Document;

/// Token response from the Schwab OAuth endpoint.
///
/// The response object is kept as received and is what gets persisted.
/// Only `access_token` and `refresh_token` are required, and both must be
/// strings; every other field passes through untouched, `null`s included.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    raw: Document,
}

impl TokenSet {
    pub fn from_document(raw: Document) -> Result<Self, String> {
        let access_token = required_string(&raw, "access_token")?;
        let refresh_token = required_string(&raw, "refresh_token")?;
        Ok(Self {
            access_token,
            refresh_token,
            raw,
        })
    }

    /// The document body to persist.
    pub fn to_document(&self) -> Document {
        self.raw.clone()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Lifetime of the access token in seconds, if the provider sent a number.
    pub fn expires_in(&self) -> Option<i64> {
        let value = self.raw.get("expires_in")?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs as i64))
    }

    /// When the access token expires, counting from `issued_at`.
    pub fn expires_at(
        &self,
        issued_at: chrono::DateTime<chrono::Utc>,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        self.expires_in()
            .map(|secs| issued_at + chrono::Duration::seconds(secs))
    }
}

fn required_string(raw: &Document, key: &str) -> Result<String, String> {
    match raw.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("'{key}' is not a string: {other}")),
        None => Err(format!("missing '{key}'")),
    }
}

/// Client for the two grants the Schwab token endpoint supports.
pub struct OAuthClient {
    client: reqwest::Client,
    token_url: String,
    redirect_uri: String,
    credentials: CredentialPair,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    pub fn new(schwab: &SchwabSettings, credentials: CredentialPair) -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: schwab.token_url(),
            redirect_uri: schwab.redirect_uri.clone(),
            credentials,
        }
    }

    pub fn app_key(&self) -> &str {
        &self.credentials.app_key
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// `Basic base64(app_key:app_secret)`
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.credentials.app_key, self.credentials.app_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<reqwest::Response, SchwabError> {
        self.client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_authorization())
            .form(form)
            .send()
            .await
            .map_err(|e| SchwabError::http(&self.token_url, e))
    }

    async fn parse_token_set(&self, resp: reqwest::Response) -> Result<TokenSet, SchwabError> {
        let raw = resp.json::<Document>().await.map_err(|e| {
            SchwabError::http(&self.token_url, format!("failed to parse token response: {e}"))
        })?;
        TokenSet::from_document(raw).map_err(|e| {
            SchwabError::http(&self.token_url, format!("invalid token response: {e}"))
        })
    }

    /// Exchange an authorization code (first-time login) for a token set.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, SchwabError> {
        let resp = self
            .post_token_form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SchwabError::ExchangeFailed { status, body });
        }

        self.parse_token_set(resp).await
    }

    /// Exchange a refresh token for a new token set. Only HTTP 200 is success.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, SchwabError> {
        let resp = self
            .post_token_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SchwabError::RefreshFailed { status, body });
        }

        self.parse_token_set(resp).await
    }
}
