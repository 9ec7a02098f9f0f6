use crate::cli::Context;
use crate::error::SchwabError;
use crate::oauth::TokenRefresher;
use crate::trigger::SUCCESS_MARKER;

pub async fn build_refresher(ctx: &Context) -> Result<TokenRefresher, SchwabError> {
    let oauth = ctx.oauth_client().await?;
    Ok(TokenRefresher::new(
        oauth,
        ctx.store.clone(),
        ctx.document.clone(),
    ))
}

/// Unattended refresh; prints the success marker for schedulers.
pub async fn run_refresh(ctx: &Context) -> Result<(), SchwabError> {
    let refresher = build_refresher(ctx).await?;
    refresher.refresh().await?;
    println!("{SUCCESS_MARKER}");
    Ok(())
}
