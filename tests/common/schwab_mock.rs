use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{APP_KEY, APP_SECRET};

#[allow(dead_code)]
pub const TOKEN_PATH: &str = "/v1/oauth/token";
#[allow(dead_code)]
pub const ACCOUNT_NUMBERS_PATH: &str = "/trader/v1/accounts/accountNumbers";

/// `Basic base64(test-app-key:test-app-secret)`
#[allow(dead_code)]
pub fn basic_header() -> String {
    use base64::Engine;
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{APP_KEY}:{APP_SECRET}"))
    )
}

/// Answer refresh-token grants with `status` and `body`.
#[allow(dead_code)]
pub async fn mount_refresh(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Authorization", basic_header().as_str()))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer authorization-code grants with `status` and `body`.
#[allow(dead_code)]
pub async fn mount_code_exchange(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("Authorization", basic_header().as_str()))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer the account-numbers endpoint for `access_token`.
#[allow(dead_code)]
pub async fn mount_account_numbers(
    server: &MockServer,
    access_token: &str,
    status: u16,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(ACCOUNT_NUMBERS_PATH))
        .and(header("Authorization", format!("Bearer {access_token}").as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
