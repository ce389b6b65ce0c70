//! Callback query payload (inline button press).

use serde::{Deserialize, Serialize};

use super::{message::Message, user::User};

/// Sent when a user presses an inline keyboard button carrying `callback_data`.
/// Must be answered with `answerCallbackQuery` or the client keeps showing a spinner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Up to 64 bytes by protocol contract; not checked locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Message the button was attached to; absent for old or inline messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_short_name: Option<String>,
}
