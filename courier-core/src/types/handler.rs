//! Handler trait: a predicate plus an action.

use async_trait::async_trait;

use super::update::Update;
use crate::bot::Bot;

/// Claims and processes updates. Handlers are tried in registration order and the first
/// whose [`supports`](Handler::supports) returns true is the only one to run.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Pure predicate, re-evaluated from scratch for every update. Must not have side effects.
    fn supports(&self, update: &Update) -> bool;

    /// Processes a claimed update. May call back out through `bot`.
    async fn handle(&self, update: &Update, bot: &Bot) -> anyhow::Result<()>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
