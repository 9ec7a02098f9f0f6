use crate::error::SchwabError;

/// Build the URL the operator opens to start the authorization-code flow.
///
/// Parameters are appended verbatim; Schwab expects the redirect URI unencoded.
pub fn authorization_url(authorize_endpoint: &str, app_key: &str, redirect_uri: &str) -> String {
    format!("{authorize_endpoint}?client_id={app_key}&redirect_uri={redirect_uri}")
}

/// Extract the authorization code from the redirect URL pasted by the operator.
///
/// Schwab returns codes containing a literal `%40` where an `@` belongs. The
/// code is everything after the first `code=` up to the first `%40`, with
/// `@` appended. The URL is not percent-decoded.
pub fn extract_authorization_code(redirect_url: &str) -> Result<String, SchwabError> {
    let start = redirect_url
        .find("code=")
        .ok_or_else(|| SchwabError::RedirectParse("missing 'code=' parameter".into()))?
        + "code=".len();
    let end = redirect_url
        .find("%40")
        .ok_or_else(|| SchwabError::RedirectParse("missing '%40' terminator in code".into()))?;

    if end < start {
        return Err(SchwabError::RedirectParse(
            "'%40' appears before the 'code=' parameter".into(),
        ));
    }
    let code = &redirect_url[start..end];
    if code.is_empty() {
        return Err(SchwabError::RedirectParse("authorization code is empty".into()));
    }
    Ok(format!("{code}@"))
}
