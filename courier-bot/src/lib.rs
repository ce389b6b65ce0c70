//! Demo bot on the courier SDK: env config, CLI, a small handler chain, and the polling,
//! one-shot webhook and HTTP webhook run modes.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod runner;
pub mod server;

pub use cli::{load_config, Cli, Commands};
pub use config::{BotConfig, StoreKind};
pub use handlers::demo_chain;
pub use runner::{build_dispatcher, build_store, run_poll, run_server, run_webhook_once};
