pub mod flow;
pub mod redirect;
pub mod token;

pub use flow::{InteractiveSetup, TokenRefresher};
pub use redirect::{authorization_url, extract_authorization_code};
pub use token::{OAuthClient, TokenSet};
