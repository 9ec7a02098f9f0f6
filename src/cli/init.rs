use crate::cli::{label, success, Context};
use crate::error::SchwabError;
use crate::oauth::InteractiveSetup;
use crate::trigger::SUCCESS_MARKER;

/// Interactive first-time login. Needs an operator at the terminal.
pub async fn run_init(ctx: &Context, open_browser: bool) -> Result<(), SchwabError> {
    let oauth = ctx.oauth_client().await?;
    let mut setup = InteractiveSetup::new(
        oauth,
        ctx.store.clone(),
        ctx.document.clone(),
        &ctx.settings.schwab.authorize_url(),
        tokio::io::BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    )
    .open_browser(open_browser);

    let tokens = setup.run().await?;

    println!("{}", success(SUCCESS_MARKER));
    println!("  {}: {}", label("Stored in"), ctx.document);
    if let Some(expires_at) = tokens.expires_at(chrono::Utc::now()) {
        println!("  {}: {}", label("Access token expires"), expires_at.to_rfc3339());
    }
    Ok(())
}
