//! Update model: update, message, chat, user, callback query, media; plus the Handler trait.
//!
//! One file per main type. All entities are immutable values built once per update.

mod callback_query;
mod chat;
mod handler;
mod media;
mod message;
mod update;
mod user;

pub use callback_query::CallbackQuery;
pub use chat::Chat;
pub use handler::Handler;
pub use media::{Document, PhotoSize};
pub use message::Message;
pub use update::{Update, UpdateKind, MAX_REPLY_DEPTH};
pub use user::User;
