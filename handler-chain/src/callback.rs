//! Callback family: exact `data` token or `data` prefix.

use std::future::Future;

use async_trait::async_trait;
use courier_core::{Bot, CallbackQuery, Handler, Update};

use crate::{boxed_action, Action};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackMatcher {
    data: String,
    by_prefix: bool,
}

impl CallbackMatcher {
    pub fn exact(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            by_prefix: false,
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            data: prefix.into(),
            by_prefix: true,
        }
    }

    pub fn matches(&self, data: &str) -> bool {
        if self.by_prefix {
            data.starts_with(self.data.as_str())
        } else {
            data == self.data
        }
    }

    /// Suffix after the prefix in prefix mode; the whole data otherwise.
    pub fn payload(&self, data: &str) -> String {
        if self.by_prefix {
            data.strip_prefix(self.data.as_str())
                .unwrap_or_default()
                .to_string()
        } else {
            data.to_string()
        }
    }
}

/// What a callback action receives.
#[derive(Clone)]
pub struct CallbackContext {
    pub update: Update,
    pub bot: Bot,
    pub query: CallbackQuery,
    pub payload: String,
}

/// Handles a callback query whose `data` satisfies the matcher.
pub struct CallbackHandler {
    matcher: CallbackMatcher,
    name: String,
    action: Action<CallbackContext>,
}

impl CallbackHandler {
    pub fn new<F, Fut>(matcher: CallbackMatcher, action: F) -> Self
    where
        F: Fn(CallbackContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = if matcher.by_prefix {
            format!("callback {}*", matcher.data)
        } else {
            format!("callback {}", matcher.data)
        };
        Self {
            matcher,
            name,
            action: boxed_action(action),
        }
    }
}

#[async_trait]
impl Handler for CallbackHandler {
    fn supports(&self, update: &Update) -> bool {
        update
            .callback_query()
            .and_then(|q| q.data.as_deref())
            .is_some_and(|data| self.matcher.matches(data))
    }

    async fn handle(&self, update: &Update, bot: &Bot) -> anyhow::Result<()> {
        let query = update
            .callback_query()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("update #{} is not a callback query", update.id))?;
        let payload = self.matcher.payload(query.data.as_deref().unwrap_or_default());
        let ctx = CallbackContext {
            update: update.clone(),
            bot: bot.clone(),
            query,
            payload,
        };
        (self.action)(ctx).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
