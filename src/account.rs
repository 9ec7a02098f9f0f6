use serde::{Deserialize, Serialize};

use crate::error::SchwabError;
use crate::store::{read_required_string, DocumentRef, DocumentStore};

/// One entry of `GET /accounts/accountNumbers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountNumber {
    pub account_number: String,
    pub hash_value: String,
}

/// Authenticated trader API client bound to the first linked account.
pub struct AccountClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    account: AccountNumber,
}

impl std::fmt::Debug for AccountClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountClient")
            .field("base_url", &self.base_url)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl AccountClient {
    /// Load the stored access token and resolve the account hash value.
    ///
    /// The token is used as stored; an expired token surfaces as
    /// [`SchwabError::AuthExpired`] and must be renewed out of band.
    pub async fn connect(
        store: &dyn DocumentStore,
        document: &DocumentRef,
        trader_base_url: &str,
    ) -> Result<Self, SchwabError> {
        let access_token = read_required_string(store, document, "access_token").await?;
        let client = reqwest::Client::new();
        let base_url = trader_base_url.trim_end_matches('/').to_string();

        let accounts = fetch_account_numbers(&client, &base_url, &access_token).await?;
        if accounts.len() > 1 {
            // Multi-account holders get the first account only.
            tracing::warn!(
                "{} accounts linked; using the first one returned",
                accounts.len()
            );
        }
        let account = accounts.into_iter().next().ok_or(SchwabError::NoAccounts)?;
        tracing::debug!("Resolved account hash value for account {}", account.account_number);

        Ok(Self {
            client,
            base_url,
            access_token,
            account,
        })
    }

    pub fn account_hash_value(&self) -> &str {
        &self.account.hash_value
    }

    pub fn account_number(&self) -> &str {
        &self.account.account_number
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A Bearer-authorised request against the trader API, for account-scoped calls.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        self.client.request(method, url).bearer_auth(&self.access_token)
    }
}

async fn fetch_account_numbers(
    client: &reqwest::Client,
    base_url: &str,
    access_token: &str,
) -> Result<Vec<AccountNumber>, SchwabError> {
    let url = format!("{base_url}/accounts/accountNumbers");
    let resp = client
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| SchwabError::http(&url, e))?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(SchwabError::AuthExpired(status.as_u16()));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SchwabError::http(&url, format!("status {status}: {body}")));
    }

    resp.json::<Vec<AccountNumber>>()
        .await
        .map_err(|e| SchwabError::http(&url, format!("failed to parse account numbers: {e}")))
}
