//! # courier-telegram
//!
//! Update ingestion and dispatch: [`PullFetcher`] computes `getUpdates` parameters from the
//! stored cursor and folds each batch back into it; [`Dispatcher`] drives the polling loop and
//! the webhook entry point, routing every update through a [`HandlerChain`](handler_chain::HandlerChain)
//! with failure containment.

mod dispatcher;
mod fetcher;

pub use dispatcher::{Dispatcher, DispatcherConfig, WebhookOutcome};
pub use fetcher::{FetchedBatch, GetUpdatesParams, PullFetcher, DEFAULT_LIMIT, MAX_LIMIT};
