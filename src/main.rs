use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "schwab-connect", version, about = "Schwab API OAuth token lifecycle helper")]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// First-time login: open the authorization URL and paste back the redirect URL
    Init {
        /// Print the URL without opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Exchange the stored refresh token for a new token set
    Refresh,

    /// Print the hash value of the first linked account
    Account {
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Serve an HTTP endpoint that runs a refresh per request
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("SCHWAB_CONNECT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), schwab_connect::SchwabError> {
    let settings = schwab_connect::load_settings(cli.config.as_deref())?;
    let ctx = schwab_connect::cli::Context::from_settings(settings)?;

    match cli.command {
        Commands::Init { no_browser } => schwab_connect::cli::init::run_init(&ctx, !no_browser).await,
        Commands::Refresh => schwab_connect::cli::refresh::run_refresh(&ctx).await,
        Commands::Account { json } => schwab_connect::cli::account::run_account(&ctx, json).await,
        Commands::Serve { host, port } => {
            schwab_connect::cli::serve::run_serve(&ctx, &host, port).await
        }
    }
}
