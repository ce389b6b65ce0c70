use serde::Serialize;
use serde_json::Value;

use super::{ChatTarget, Method};
use crate::markup::ReplyMarkup;

/// `editMessageText`. Target either `chat_id` + `message_id` or `inline_message_id`.
/// The result is the edited message, or `true` for inline messages, so it stays raw.
#[derive(Debug, Clone, Serialize)]
pub struct EditMessageText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
}

impl EditMessageText {
    fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            chat_id: None,
            message_id: None,
            inline_message_id: None,
            parse_mode: None,
            reply_markup: None,
            disable_web_page_preview: None,
        }
    }

    pub fn new(chat_id: impl Into<ChatTarget>, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            message_id: Some(message_id),
            ..Self::with_text(text)
        }
    }

    pub fn inline(inline_message_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            inline_message_id: Some(inline_message_id.into()),
            ..Self::with_text(text)
        }
    }

    pub fn parse_mode(mut self, mode: impl Into<String>) -> Self {
        self.parse_mode = Some(mode.into());
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

impl Method for EditMessageText {
    const NAME: &'static str = "editMessageText";
    type Output = Value;
}

/// `deleteMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteMessage {
    pub chat_id: ChatTarget,
    pub message_id: i64,
}

impl DeleteMessage {
    pub fn new(chat_id: impl Into<ChatTarget>, message_id: i64) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id,
        }
    }
}

impl Method for DeleteMessage {
    const NAME: &'static str = "deleteMessage";
    type Output = bool;
}
