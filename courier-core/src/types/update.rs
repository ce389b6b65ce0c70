//! Update: the unit of dispatch, parsed from a loosely-typed JSON tree.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{callback_query::CallbackQuery, message::Message};
use crate::error::{CourierError, Result};

/// Deepest `reply_to_message` chain accepted before parsing fails closed.
pub const MAX_REPLY_DEPTH: usize = 50;

/// Payload carried by an update. New kinds are added as new variants; predicates
/// match on the variant they care about, so existing handlers keep working.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    CallbackQuery(CallbackQuery),
    /// None of the supported kinds was populated. `kind` is the alphabetically first other
    /// top-level key with a non-null value, if any.
    Unsupported { kind: Option<String> },
}

/// One event delivered to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Monotonic per-bot id; ordering key for the polling cursor.
    pub id: i64,
    pub kind: UpdateKind,
}

impl Update {
    /// Parses one update object. Unknown fields are ignored; an absent payload kind is
    /// not an error, but a present payload missing its own required fields is.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CourierError::malformed("update", "expected a JSON object"))?;

        let id = obj
            .get("update_id")
            .ok_or_else(|| CourierError::malformed("update.update_id", "missing required field"))?
            .as_i64()
            .ok_or_else(|| CourierError::malformed("update.update_id", "expected an integer"))?;

        let present = |key: &str| obj.get(key).filter(|v| !v.is_null());

        let kind = if let Some(v) = present("message") {
            UpdateKind::Message(parse_message_payload(v, "update.message")?)
        } else if let Some(v) = present("edited_message") {
            UpdateKind::EditedMessage(parse_message_payload(v, "update.edited_message")?)
        } else if let Some(v) = present("callback_query") {
            if let Some(message) = v.get("message") {
                check_reply_depth(message, "update.callback_query.message")?;
            }
            UpdateKind::CallbackQuery(parse_entity(v, "update.callback_query")?)
        } else {
            UpdateKind::Unsupported {
                kind: obj
                    .iter()
                    .find(|(k, v)| k.as_str() != "update_id" && !v.is_null())
                    .map(|(k, _)| k.clone()),
            }
        };

        Ok(Self { id, kind })
    }

    /// Parses an update from raw JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn is_message(&self) -> bool {
        matches!(self.kind, UpdateKind::Message(_))
    }

    pub fn is_edited_message(&self) -> bool {
        matches!(self.kind, UpdateKind::EditedMessage(_))
    }

    pub fn is_callback_query(&self) -> bool {
        matches!(self.kind, UpdateKind::CallbackQuery(_))
    }

    /// The `message` payload (new messages only; edits are not included).
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn edited_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::EditedMessage(m) => Some(m),
            _ => None,
        }
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    /// Text of the `message` payload, if any.
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(|m| m.text.as_deref())
    }

    /// Chat id resolved in priority order: message, edited message, callback query's message.
    pub fn chat_id(&self) -> Option<i64> {
        self.message()
            .or_else(|| self.edited_message())
            .or_else(|| self.callback_query().and_then(|q| q.message.as_ref()))
            .map(|m| m.chat.id)
    }
}

impl TryFrom<&Value> for Update {
    type Error = CourierError;

    fn try_from(value: &Value) -> Result<Self> {
        Update::from_value(value)
    }
}

fn parse_message_payload(value: &Value, path: &str) -> Result<Message> {
    check_reply_depth(value, path)?;
    parse_entity(value, path)
}

fn parse_entity<T: DeserializeOwned>(value: &Value, path: &str) -> Result<T> {
    T::deserialize(value).map_err(|e| CourierError::malformed(path, e.to_string()))
}

/// Walks the `reply_to_message` chain without recursion and rejects it past [`MAX_REPLY_DEPTH`].
fn check_reply_depth(value: &Value, path: &str) -> Result<()> {
    let mut depth = 0;
    let mut current = value.get("reply_to_message");
    while let Some(next) = current.filter(|v| !v.is_null()) {
        depth += 1;
        if depth > MAX_REPLY_DEPTH {
            return Err(CourierError::malformed(
                path,
                format!("reply_to_message nesting exceeds {}", MAX_REPLY_DEPTH),
            ));
        }
        current = next.get("reply_to_message");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_json(chat_id: i64, text: &str) -> Value {
        json!({
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": { "id": chat_id, "type": "private", "first_name": "Ann" },
            "from": { "id": 10, "is_bot": false, "first_name": "Ann" },
            "text": text
        })
    }

    #[test]
    fn test_parse_message_update() {
        let update = Update::from_value(&json!({
            "update_id": 5,
            "message": message_json(42, "hello")
        }))
        .unwrap();

        assert_eq!(update.id, 5);
        assert!(update.is_message());
        assert!(!update.is_edited_message());
        assert!(!update.is_callback_query());
        assert_eq!(update.text(), Some("hello"));
        assert_eq!(update.chat_id(), Some(42));
        let message = update.message().unwrap();
        assert_eq!(message.chat.chat_type, "private");
        assert_eq!(message.from.as_ref().map(|u| u.id), Some(10));
    }

    #[test]
    fn test_parse_edited_message_update() {
        let update = Update::from_value(&json!({
            "update_id": 6,
            "edited_message": message_json(43, "edited")
        }))
        .unwrap();

        assert!(update.is_edited_message());
        assert!(update.message().is_none());
        assert_eq!(update.text(), None);
        assert_eq!(update.chat_id(), Some(43));
    }

    #[test]
    fn test_parse_callback_query_update() {
        let update = Update::from_value(&json!({
            "update_id": 7,
            "callback_query": {
                "id": "cb-1",
                "from": { "id": 11, "is_bot": false, "first_name": "Bob" },
                "data": "item:42",
                "chat_instance": "ci",
                "message": message_json(44, "menu")
            }
        }))
        .unwrap();

        assert!(update.is_callback_query());
        let query = update.callback_query().unwrap();
        assert_eq!(query.id, "cb-1");
        assert_eq!(query.from.first_name, "Bob");
        assert_eq!(query.data.as_deref(), Some("item:42"));
        assert_eq!(update.chat_id(), Some(44));
    }

    #[test]
    fn test_update_with_only_id_parses() {
        let update = Update::from_value(&json!({ "update_id": 8 })).unwrap();
        assert!(!update.is_message());
        assert!(!update.is_edited_message());
        assert!(!update.is_callback_query());
        assert_eq!(update.chat_id(), None);
        assert_eq!(update.kind, UpdateKind::Unsupported { kind: None });
    }

    #[test]
    fn test_unsupported_kind_is_recorded() {
        let update = Update::from_value(&json!({
            "update_id": 9,
            "poll": { "id": "p" }
        }))
        .unwrap();
        assert_eq!(
            update.kind,
            UpdateKind::Unsupported {
                kind: Some("poll".to_string())
            }
        );
    }

    #[test]
    fn test_unsupported_kind_skips_null_keys() {
        let update = Update::from_value(&json!({
            "update_id": 10,
            "message": null,
            "callback_query": null,
            "poll": { "id": "p" }
        }))
        .unwrap();
        assert_eq!(
            update.kind,
            UpdateKind::Unsupported {
                kind: Some("poll".to_string())
            }
        );

        let update = Update::from_value(&json!({ "update_id": 11, "message": null })).unwrap();
        assert_eq!(update.kind, UpdateKind::Unsupported { kind: None });
    }

    #[test]
    fn test_missing_update_id_is_malformed() {
        let err = Update::from_value(&json!({ "message": message_json(1, "x") })).unwrap_err();
        assert!(matches!(err, CourierError::MalformedUpdate { ref path, .. } if path == "update.update_id"));
    }

    #[test]
    fn test_message_without_chat_is_malformed() {
        let err = Update::from_value(&json!({
            "update_id": 1,
            "message": { "message_id": 1, "date": 0, "text": "x" }
        }))
        .unwrap_err();
        match err {
            CourierError::MalformedUpdate { path, reason } => {
                assert_eq!(path, "update.message");
                assert!(reason.contains("chat"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reply_chain_and_photos() {
        let mut inner = message_json(1, "original");
        inner["photo"] = json!([
            { "file_id": "s", "file_unique_id": "us", "width": 90, "height": 90 },
            { "file_id": "l", "file_unique_id": "ul", "width": 1280, "height": 960, "file_size": 1024 }
        ]);
        let mut outer = message_json(1, "reply");
        outer["reply_to_message"] = inner;

        let update = Update::from_value(&json!({ "update_id": 2, "message": outer })).unwrap();
        let reply = update.message().unwrap().reply_to_message.as_ref().unwrap();
        assert!(reply.has_photo());
        assert!(!reply.has_document());
        assert_eq!(reply.best_photo().map(|p| p.file_id.as_str()), Some("l"));
    }

    #[test]
    fn test_reply_depth_ceiling_fails_closed() {
        let mut msg = message_json(1, "leaf");
        for _ in 0..(MAX_REPLY_DEPTH + 1) {
            let mut parent = message_json(1, "p");
            parent["reply_to_message"] = msg;
            msg = parent;
        }
        let err = Update::from_value(&json!({ "update_id": 3, "message": msg })).unwrap_err();
        assert!(matches!(err, CourierError::MalformedUpdate { .. }));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let raw = json!({ "update_id": 4, "message": message_json(9, "same") });
        assert_eq!(Update::from_value(&raw).unwrap(), Update::from_value(&raw).unwrap());
    }
}
