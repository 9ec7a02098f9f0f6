pub mod account;
pub mod cli;
pub mod config;
pub mod error;
pub mod gcp;
pub mod oauth;
pub mod secrets;
pub mod store;
pub mod trigger;

pub use account::{AccountClient, AccountNumber};
pub use config::{load_settings, Settings};
pub use error::SchwabError;
pub use oauth::{InteractiveSetup, OAuthClient, TokenRefresher, TokenSet};
pub use secrets::{load_credentials, CredentialPair, SecretStore};
pub use store::{DocumentRef, DocumentStore};
