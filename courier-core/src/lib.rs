//! # courier-core
//!
//! Core types and traits for the bot SDK: the [`Update`] model parsed from raw JSON, the
//! [`Handler`] trait, the outbound [`Bot`] client over a pluggable [`Transport`], typed API
//! [`methods`], reply [`markup`], the error taxonomy and tracing initialization.

pub mod bot;
pub mod error;
pub mod logger;
pub mod markup;
pub mod methods;
pub mod types;

pub use bot::{Bot, HttpTransport, HttpTransportConfig, Transport, DEFAULT_API_URL};
pub use error::{CourierError, Result};
pub use logger::init_tracing;
pub use markup::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup,
};
pub use methods::{
    AnswerCallbackQuery, ChatTarget, DeleteMessage, EditMessageText, GetMe, Method, SendDocument,
    SendMessage, SendPhoto,
};
pub use types::{
    CallbackQuery, Chat, Document, Handler, Message, PhotoSize, Update, UpdateKind, User,
    MAX_REPLY_DEPTH,
};
