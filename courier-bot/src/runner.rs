//! Wiring: config -> store -> bot -> dispatcher, and the three run modes.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use courier_core::{init_tracing, Bot};
use courier_telegram::{Dispatcher, WebhookOutcome};
use cursor_store::{CursorStore, FileStore, MemoryStore, SqliteStore};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::{BotConfig, StoreKind};
use crate::handlers::demo_chain;
use crate::server;

pub async fn build_store(config: &BotConfig) -> Result<Arc<dyn CursorStore>> {
    let store: Arc<dyn CursorStore> = match config.store_kind()? {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::File => Arc::new(FileStore::open(config.cursor_store_path.as_str()).await?),
        StoreKind::Sqlite => Arc::new(SqliteStore::open(&config.cursor_store_path).await?),
    };
    Ok(store)
}

/// Builds the dispatcher with the demo handler chain.
pub async fn build_dispatcher(config: &BotConfig) -> Result<Dispatcher> {
    let store = build_store(config).await?;
    let bot = Bot::with_token(config.bot_token.clone(), config.transport_config())?;
    let dispatcher =
        Dispatcher::new(bot, store, config.dispatcher_config()).with_chain(demo_chain()?);
    Ok(dispatcher)
}

fn prepare(config: &BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    info!(
        api_url = %config.telegram_api_url,
        cursor_store = %config.cursor_store,
        cursor_store_path = %config.cursor_store_path,
        "Initializing bot"
    );
    Ok(())
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
        }
        on_signal.cancel();
    });
    token
}

/// Polling mode. A long-poll in flight finishes before the loop notices Ctrl-C.
#[instrument(skip(config))]
pub async fn run_poll(config: BotConfig) -> Result<()> {
    prepare(&config)?;
    let dispatcher = build_dispatcher(&config).await?;
    dispatcher
        .run_polling_until(config.poll_limit, config.poll_timeout_secs, shutdown_token())
        .await;
    info!("Bot stopped");
    Ok(())
}

/// One pushed payload from `file`, or stdin.
#[instrument(skip(config))]
pub async fn run_webhook_once(config: BotConfig, file: Option<&Path>) -> Result<WebhookOutcome> {
    prepare(&config)?;
    let body = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read webhook payload from {}", path.display()))?,
        None => {
            let mut body = String::new();
            tokio::io::stdin().read_to_string(&mut body).await?;
            body
        }
    };
    let dispatcher = build_dispatcher(&config).await?;
    Ok(dispatcher.run_webhook(&body).await)
}

/// HTTP webhook mode until Ctrl-C.
#[instrument(skip(config))]
pub async fn run_server(config: BotConfig, addr: Option<String>) -> Result<()> {
    prepare(&config)?;
    let addr = addr.unwrap_or_else(|| config.webhook_addr.clone());
    let dispatcher = Arc::new(build_dispatcher(&config).await?);
    server::serve(dispatcher, &addr, shutdown_token()).await
}
