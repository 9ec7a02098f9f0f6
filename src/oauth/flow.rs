use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::SchwabError;
use crate::oauth::redirect::{authorization_url, extract_authorization_code};
use crate::oauth::token::{OAuthClient, TokenSet};
use crate::store::{read_required_string, DocumentRef, DocumentStore};

/// Unattended renewal: stored refresh token in, new token set stored.
pub struct TokenRefresher {
    oauth: OAuthClient,
    store: Arc<dyn DocumentStore>,
    document: DocumentRef,
}

impl TokenRefresher {
    pub fn new(oauth: OAuthClient, store: Arc<dyn DocumentStore>, document: DocumentRef) -> Self {
        Self {
            oauth,
            store,
            document,
        }
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    /// Refresh the stored token set.
    ///
    /// The token document is only overwritten when the provider answers 200;
    /// on any failure the stored tokens are left as they were.
    pub async fn refresh(&self) -> Result<TokenSet, SchwabError> {
        tracing::info!("Refreshing tokens for {}", self.document);

        let refresh_token =
            read_required_string(self.store.as_ref(), &self.document, "refresh_token").await?;

        let tokens = match self.oauth.refresh(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!("Error refreshing access token: {e}");
                return Err(e);
            }
        };
        tracing::info!("Retrieved new tokens successfully using refresh token");

        self.store
            .write_document(&self.document, &tokens.to_document())
            .await?;
        tracing::info!("Token document {} refreshed", self.document);
        Ok(tokens)
    }
}

/// First-time login driven by an operator at a terminal.
///
/// Prints the authorization URL to `output`, optionally opens it in a
/// browser, then waits for the pasted redirect URL on `input`.
pub struct InteractiveSetup<R, W> {
    oauth: OAuthClient,
    store: Arc<dyn DocumentStore>,
    document: DocumentRef,
    authorize_endpoint: String,
    open_browser: bool,
    input: R,
    output: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> InteractiveSetup<R, W> {
    pub fn new(
        oauth: OAuthClient,
        store: Arc<dyn DocumentStore>,
        document: DocumentRef,
        authorize_endpoint: &str,
        input: R,
        output: W,
    ) -> Self {
        Self {
            oauth,
            store,
            document,
            authorize_endpoint: authorize_endpoint.to_string(),
            open_browser: true,
            input,
            output,
        }
    }

    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    pub fn authorization_url(&self) -> String {
        authorization_url(
            &self.authorize_endpoint,
            self.oauth.app_key(),
            self.oauth.redirect_uri(),
        )
    }

    pub async fn run(&mut self) -> Result<TokenSet, SchwabError> {
        let auth_url = self.authorization_url();
        writeln!(self.output, "Open this URL to authenticate:\n{auth_url}")?;

        if self.open_browser && webbrowser::open(&auth_url).is_err() {
            tracing::warn!("Could not open browser automatically");
        }

        writeln!(self.output, "Paste the returned URL:")?;
        self.output.flush()?;

        let mut returned_url = String::new();
        self.input.read_line(&mut returned_url).await?;
        let returned_url = returned_url.trim();
        if returned_url.is_empty() {
            return Err(SchwabError::RedirectParse("no URL was entered".into()));
        }

        let code = extract_authorization_code(returned_url)?;
        let tokens = self.oauth.exchange_code(&code).await?;

        self.store
            .write_document(&self.document, &tokens.to_document())
            .await?;
        tracing::info!("Stored initial tokens in {}", self.document);
        Ok(tokens)
    }
}
