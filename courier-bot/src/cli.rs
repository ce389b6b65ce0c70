//! CLI parser and config loading.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::BotConfig;

#[derive(Parser)]
#[command(name = "courier-bot")]
#[command(about = "Demo bot on the courier SDK", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Long-poll getUpdates until Ctrl-C (token can override BOT_TOKEN).
    Poll {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Process one pushed update read from a file, or stdin when no file is given.
    Webhook {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Serve POST /webhook over HTTP until Ctrl-C (addr overrides WEBHOOK_ADDR).
    Serve {
        #[arg(short, long)]
        addr: Option<String>,
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Load BotConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<BotConfig> {
    BotConfig::load(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["courier-bot", "poll", "--token", "abc"]).unwrap();
        assert!(matches!(cli.command, Commands::Poll { token: Some(ref t) } if t == "abc"));

        let cli = Cli::try_parse_from(["courier-bot", "webhook", "-f", "update.json"]).unwrap();
        match cli.command {
            Commands::Webhook { file, token } => {
                assert_eq!(file, Some(PathBuf::from("update.json")));
                assert!(token.is_none());
            }
            _ => panic!("expected webhook"),
        }

        let cli = Cli::try_parse_from(["courier-bot", "serve", "--addr", "127.0.0.1:9999"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { addr: Some(ref a), .. } if a == "127.0.0.1:9999"));

        assert!(Cli::try_parse_from(["courier-bot"]).is_err());
    }
}
