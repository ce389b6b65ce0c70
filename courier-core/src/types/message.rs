//! Message payload.

use serde::{Deserialize, Serialize};

use super::{
    chat::Chat,
    media::{Document, PhotoSize},
    user::User,
};

/// An incoming (or sent) message. `reply_to_message` nests another full message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    /// Unix timestamp.
    pub date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Absent for messages posted to channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    /// Size variants, ascending by resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Message {
    pub fn has_photo(&self) -> bool {
        self.photo.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Largest photo variant (the platform sends sizes ascending, so the last one).
    pub fn best_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref().and_then(|p| p.last())
    }
}
