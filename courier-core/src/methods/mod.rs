//! API method mappings. Each method is a plain struct serialised into the call parameters;
//! unset optional parameters are omitted.

mod callback;
mod edit;
mod send;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::types::User;

pub use callback::AnswerCallbackQuery;
pub use edit::{DeleteMessage, EditMessageText};
pub use send::{SendDocument, SendMessage, SendPhoto};

/// One API method: name, parameters and the decoded `result` type.
pub trait Method: Serialize + Send + Sync {
    const NAME: &'static str;
    type Output: DeserializeOwned;

    fn params(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Target chat: numeric id or `@channelusername`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl From<i64> for ChatTarget {
    fn from(id: i64) -> Self {
        ChatTarget::Id(id)
    }
}

impl From<&str> for ChatTarget {
    fn from(username: &str) -> Self {
        ChatTarget::Username(username.to_string())
    }
}

impl From<String> for ChatTarget {
    fn from(username: String) -> Self {
        ChatTarget::Username(username)
    }
}

/// `getMe`: the bot's own user.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetMe;

impl Method for GetMe {
    const NAME: &'static str = "getMe";
    type Output = User;

    fn params(&self) -> Result<Value> {
        Ok(Value::Object(Default::default()))
    }
}
