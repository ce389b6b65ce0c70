//! Binary for the demo bot.

use anyhow::Result;
use clap::Parser;
use courier_bot::{load_config, run_poll, run_server, run_webhook_once, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Poll { token } => run_poll(load_config(token)?).await,
        Commands::Webhook { file, token } => {
            let outcome = run_webhook_once(load_config(token)?, file.as_deref()).await?;
            tracing::info!(?outcome, "Webhook payload processed");
            Ok(())
        }
        Commands::Serve { addr, token } => run_server(load_config(token)?, addr).await,
    }
}
