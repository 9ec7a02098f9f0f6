use crate::account::AccountClient;
use crate::cli::Context;
use crate::error::SchwabError;

pub async fn run_account(ctx: &Context, json: bool) -> Result<(), SchwabError> {
    let client = AccountClient::connect(
        ctx.store.as_ref(),
        &ctx.document,
        &ctx.settings.schwab.trader_base_url(),
    )
    .await?;

    if json {
        let out = serde_json::json!({
            "accountNumber": client.account_number(),
            "hashValue": client.account_hash_value(),
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!("{}", client.account_hash_value());
        tracing::debug!("Resolved account {}", client.account_number());
    }
    Ok(())
}
