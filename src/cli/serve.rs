use tokio::net::TcpListener;

use crate::cli::refresh::build_refresher;
use crate::cli::Context;
use crate::error::SchwabError;
use crate::trigger;

/// Run the HTTP refresh trigger. Credentials are fetched once at startup.
pub async fn run_serve(ctx: &Context, host: &str, port: u16) -> Result<(), SchwabError> {
    let refresher = build_refresher(ctx).await?;
    let listener = TcpListener::bind((host, port)).await?;
    trigger::serve(listener, &refresher).await
}
