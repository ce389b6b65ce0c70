//! Dispatcher: polling loop, webhook entry and failure containment around the handler chain.

use std::sync::Arc;
use std::time::Duration;

use courier_core::{Bot, CourierError, Handler, Result, Update};
use cursor_store::CursorStore;
use handler_chain::HandlerChain;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::fetcher::PullFetcher;

/// Dispatcher settings.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Raise [`CourierError::NoHandlerMatched`] from [`Dispatcher::dispatch`] instead of returning quietly.
    pub throw_on_missed_handler: bool,
    /// Pause between polling rounds; zero means no pause. Keep it well below the long-poll timeout.
    pub polling_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            throw_on_missed_handler: false,
            polling_interval: Duration::from_secs(1),
        }
    }
}

/// What the webhook entry did with a pushed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Dispatched { update_id: i64 },
    /// Payload rejected before routing; the reason is also logged.
    Ignored(String),
}

/// Routes updates to the first matching handler, in polling or webhook mode.
pub struct Dispatcher {
    bot: Bot,
    chain: HandlerChain,
    store: Arc<dyn CursorStore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(bot: Bot, store: Arc<dyn CursorStore>, config: DispatcherConfig) -> Self {
        Self {
            bot,
            chain: HandlerChain::new(),
            store,
            config,
        }
    }

    /// Replaces the handler chain.
    pub fn with_chain(mut self, chain: HandlerChain) -> Self {
        self.chain = chain;
        self
    }

    /// Appends a handler (builder style); registration order decides overlapping matches.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.register_handler(handler);
        self
    }

    pub fn register_handler(&mut self, handler: Arc<dyn Handler>) {
        self.chain.push(handler);
    }

    pub fn handlers_len(&self) -> usize {
        self.chain.len()
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Runs the chain for one update. Handler failures propagate as [`CourierError::Handler`];
    /// an unmatched update is an error only when `throw_on_missed_handler` is set.
    #[instrument(skip(self, update), fields(update_id = update.id))]
    pub async fn dispatch(&self, update: &Update) -> Result<()> {
        route(&self.chain, &self.bot, self.config.throw_on_missed_handler, update).await
    }

    /// [`dispatch`](Self::dispatch) with containment: nothing propagates, including panics.
    /// The chain runs on its own task, awaited immediately, so routing stays sequential.
    pub async fn dispatch_safely(&self, update: &Update) {
        let chain = self.chain.clone();
        let bot = self.bot.clone();
        let throw = self.config.throw_on_missed_handler;
        let owned = update.clone();
        let task = tokio::spawn(async move { route(&chain, &bot, throw, &owned).await });

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                error!(update_id = update.id, error = %join_err, "Handler panicked");
                return;
            }
        };

        match outcome {
            Ok(()) => {}
            Err(e @ CourierError::NoHandlerMatched { .. }) => {
                warn!(update_id = update.id, "{}", e);
            }
            Err(CourierError::Handler { update_id, source }) => match source.downcast_ref::<CourierError>() {
                Some(CourierError::Api { code, description }) => {
                    error!(update_id, error_code = code, description = %description, "API error in handler");
                }
                _ => {
                    error!(update_id, error = %source, "Unexpected error in handler");
                }
            },
            Err(e) => {
                error!(update_id = update.id, error = %e, "Unexpected error in dispatch");
            }
        }
    }

    /// One FETCHING + ROUTING round. Returns how many updates were routed.
    pub async fn poll_once(&self, limit: u32, timeout: u32) -> Result<usize> {
        let fetcher = PullFetcher::new(self.store.clone(), limit, timeout);
        let batch = fetcher.fetch(&self.bot).await?;

        for rejected in &batch.rejected {
            error!(error = %rejected, "Skipping malformed update");
        }
        for update in &batch.updates {
            self.dispatch_safely(update).await;
        }
        Ok(batch.updates.len())
    }

    /// Polls forever. Never returns normally; stop the process to end it.
    pub async fn run_polling(&self, limit: u32, timeout: u32) {
        self.run_polling_until(limit, timeout, CancellationToken::new())
            .await
    }

    /// Polls until `cancel` fires. The token is checked before each fetch and during the
    /// pause, never in the middle of a batch.
    #[instrument(skip(self, cancel))]
    pub async fn run_polling_until(&self, limit: u32, timeout: u32, cancel: CancellationToken) {
        info!(
            limit,
            timeout,
            interval_ms = self.config.polling_interval.as_millis() as u64,
            handlers = self.chain.len(),
            "Starting polling"
        );

        loop {
            if cancel.is_cancelled() {
                info!("Polling stopped");
                return;
            }

            match self.poll_once(limit, timeout).await {
                Ok(routed) => debug!(routed, "Polling round finished"),
                Err(CourierError::Api { code, description }) => {
                    error!(error_code = code, description = %description, "API error during polling");
                }
                Err(e) => {
                    error!(error = %e, "Unexpected error during polling");
                }
            }

            if !self.config.polling_interval.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.config.polling_interval) => {}
                }
            }
        }
    }

    /// [`run_webhook`](Self::run_webhook) for a raw request body. Bytes that are not valid
    /// UTF-8 are undecodable JSON and are ignored, never lossily repaired.
    pub async fn run_webhook_bytes(&self, raw_body: &[u8]) -> WebhookOutcome {
        match std::str::from_utf8(raw_body) {
            Ok(text) => self.run_webhook(text).await,
            Err(e) => {
                error!(error = %e, "Failed to decode webhook JSON body");
                WebhookOutcome::Ignored(format!("invalid JSON: {}", e))
            }
        }
    }

    /// Handles one pushed payload. Fails closed (logs and returns) on an empty body,
    /// undecodable JSON, a missing `update_id` or a malformed payload. Never touches the cursor.
    #[instrument(skip(self, raw_body))]
    pub async fn run_webhook(&self, raw_body: &str) -> WebhookOutcome {
        info!("Processing incoming webhook request");

        if raw_body.trim().is_empty() {
            warn!("Empty webhook body received");
            return WebhookOutcome::Ignored("empty body".to_string());
        }

        let data: Value = match serde_json::from_str(raw_body) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "Failed to decode webhook JSON body");
                return WebhookOutcome::Ignored(format!("invalid JSON: {}", e));
            }
        };

        if data.get("update_id").and_then(|v| v.as_i64()).is_none() {
            warn!(data = %data, "Webhook payload does not contain update_id");
            return WebhookOutcome::Ignored("missing update_id".to_string());
        }

        let update = match Update::from_value(&data) {
            Ok(u) => u,
            Err(e) => {
                error!(error = %e, "Malformed webhook update");
                return WebhookOutcome::Ignored(e.to_string());
            }
        };

        self.dispatch_safely(&update).await;
        WebhookOutcome::Dispatched {
            update_id: update.id,
        }
    }
}

async fn route(chain: &HandlerChain, bot: &Bot, throw: bool, update: &Update) -> Result<()> {
    debug!(update_id = update.id, "Dispatching update");
    let handled = chain.route(update, bot).await?;
    if !handled && throw {
        return Err(CourierError::NoHandlerMatched {
            update_id: update.id,
        });
    }
    Ok(())
}
