//! # Handler chain
//!
//! Ordered list of handlers with first-match-wins routing, plus the built-in handler
//! families: [`CommandHandler`], [`TextHandler`], [`CallbackHandler`] and the closure-based
//! [`FnHandler`] for custom predicates.

mod callback;
mod command;
mod text;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{Bot, CourierError, Handler, Result, Update};
use tracing::{debug, instrument};

pub use callback::{CallbackContext, CallbackHandler, CallbackMatcher};
pub use command::{CommandContext, CommandHandler, CommandMatcher};
pub use text::{TextContext, TextHandler, TextMatcher};

/// Boxed future returned by handler actions.
pub type ActionFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Type-erased async action taking an owned context.
pub(crate) type Action<C> = Arc<dyn Fn(C) -> ActionFuture + Send + Sync>;

pub(crate) fn boxed_action<C, F, Fut>(f: F) -> Action<C>
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)) as ActionFuture)
}

/// Handlers tried in registration order; the first whose `supports` returns true handles the update.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler (builder style). Catch-all handlers belong last.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.push(handler);
        self
    }

    pub fn push(&mut self, handler: Arc<dyn Handler>) {
        debug!(handler = %handler.name(), "Handler registered");
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// First handler whose predicate accepts the update.
    pub fn find(&self, update: &Update) -> Option<&Arc<dyn Handler>> {
        self.handlers.iter().find(|h| h.supports(update))
    }

    /// Routes one update. Returns `Ok(true)` when a handler ran, `Ok(false)` when none matched,
    /// and [`CourierError::Handler`] when the matched handler failed.
    #[instrument(skip(self, update, bot), fields(update_id = update.id))]
    pub async fn route(&self, update: &Update, bot: &Bot) -> Result<bool> {
        let Some(handler) = self.find(update) else {
            debug!(update_id = update.id, "No handler matched for update");
            return Ok(false);
        };

        debug!(update_id = update.id, handler = %handler.name(), "Handler matched");
        handler
            .handle(update, bot)
            .await
            .map_err(|source| CourierError::Handler {
                update_id: update.id,
                source,
            })?;
        Ok(true)
    }
}

/// Handler built from a predicate closure and an async action; for routing rules the
/// built-in families do not cover.
pub struct FnHandler {
    name: String,
    predicate: Box<dyn Fn(&Update) -> bool + Send + Sync>,
    action: Action<(Update, Bot)>,
}

impl FnHandler {
    pub fn new<P, F, Fut>(name: impl Into<String>, predicate: P, action: F) -> Self
    where
        P: Fn(&Update) -> bool + Send + Sync + 'static,
        F: Fn(Update, Bot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            action: Arc::new(move |(update, bot)| Box::pin(action(update, bot)) as ActionFuture),
        }
    }
}

#[async_trait]
impl Handler for FnHandler {
    fn supports(&self, update: &Update) -> bool {
        (self.predicate)(update)
    }

    async fn handle(&self, update: &Update, bot: &Bot) -> anyhow::Result<()> {
        (self.action)((update.clone(), bot.clone())).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
