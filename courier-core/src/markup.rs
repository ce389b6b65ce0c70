//! Reply markup: inline keyboards (buttons under a message) and reply keyboards (custom input keyboard).

use serde::Serialize;

/// One inline button. Exactly one of the optional actions should be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay: Option<bool>,
}

impl InlineKeyboardButton {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: None,
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
            pay: None,
        }
    }

    /// Button that sends `data` back as a callback query.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Self::plain(text)
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::plain(text)
        }
    }

    pub fn switch_inline_query(text: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            switch_inline_query: Some(query.into()),
            ..Self::plain(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }

    /// All buttons in one row.
    pub fn single_row(buttons: impl IntoIterator<Item = InlineKeyboardButton>) -> Self {
        Self::new(vec![buttons.into_iter().collect()])
    }

    /// One button per row.
    pub fn column(buttons: impl IntoIterator<Item = InlineKeyboardButton>) -> Self {
        Self::new(buttons.into_iter().map(|b| vec![b]).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: None,
            request_location: None,
        }
    }

    pub fn request_contact(text: impl Into<String>) -> Self {
        Self {
            request_contact: Some(true),
            ..Self::new(text)
        }
    }

    pub fn request_location(text: impl Into<String>) -> Self {
        Self {
            request_location: Some(true),
            ..Self::new(text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_keyboard: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_time_keyboard: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_persistent: Option<bool>,
}

impl ReplyKeyboardMarkup {
    /// Keyboard with `resize_keyboard` on.
    pub fn new(rows: Vec<Vec<KeyboardButton>>) -> Self {
        Self {
            keyboard: rows,
            resize_keyboard: Some(true),
            one_time_keyboard: None,
            input_field_placeholder: None,
            selective: None,
            is_persistent: None,
        }
    }

    pub fn single_row(buttons: impl IntoIterator<Item = KeyboardButton>) -> Self {
        Self::new(vec![buttons.into_iter().collect()])
    }

    pub fn column(buttons: impl IntoIterator<Item = KeyboardButton>) -> Self {
        Self::new(buttons.into_iter().map(|b| vec![b]).collect())
    }

    /// Keyboard hidden by the client after first use.
    pub fn one_time(rows: Vec<Vec<KeyboardButton>>) -> Self {
        Self {
            one_time_keyboard: Some(true),
            ..Self::new(rows)
        }
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.input_field_placeholder = Some(text.into());
        self
    }

    pub fn selective(mut self, selective: bool) -> Self {
        self.selective = Some(selective);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.is_persistent = Some(persistent);
        self
    }
}

/// Any markup accepted by the `reply_markup` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Keyboard(ReplyKeyboardMarkup),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        ReplyMarkup::Inline(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        ReplyMarkup::Keyboard(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_column_layout() {
        let markup = InlineKeyboardMarkup::column([
            InlineKeyboardButton::callback("One", "item:1"),
            InlineKeyboardButton::url("Site", "https://example.org"),
        ]);
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "inline_keyboard": [
                    [{ "text": "One", "callback_data": "item:1" }],
                    [{ "text": "Site", "url": "https://example.org" }]
                ]
            })
        );
    }

    #[test]
    fn test_reply_keyboard_defaults_to_resize() {
        let markup = ReplyKeyboardMarkup::one_time(vec![vec![KeyboardButton::request_contact(
            "Share phone",
        )]])
        .placeholder("Pick one");
        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "keyboard": [[{ "text": "Share phone", "request_contact": true }]],
                "resize_keyboard": true,
                "one_time_keyboard": true,
                "input_field_placeholder": "Pick one"
            })
        );
    }
}
