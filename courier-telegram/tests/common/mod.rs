//! Shared fakes for dispatcher tests: a scripted transport and update builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use courier_core::{Bot, CourierError, Transport};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Transport answering `getUpdates` from a script, echoing `sendMessage`, and acknowledging
/// everything else with `ok: true`.
/// Records every call; can cancel a token once the script is exhausted.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<courier_core::Result<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
    cancel_when_exhausted: Mutex<Option<CancellationToken>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_batch(&self, updates: Vec<Value>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(json!({ "ok": true, "result": updates })));
    }

    pub fn push_envelope(&self, envelope: Value) {
        self.script.lock().unwrap().push_back(Ok(envelope));
    }

    pub fn push_transport_error(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(CourierError::Transport(message.to_string())));
    }

    pub fn cancel_when_exhausted(&self, token: CancellationToken) {
        *self.cancel_when_exhausted.lock().unwrap() = Some(token);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p)
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, method: &str, params: &Value) -> courier_core::Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        match method {
            "getUpdates" => {}
            "sendMessage" => {
                return Ok(json!({
                    "ok": true,
                    "result": {
                        "message_id": 1,
                        "date": 0,
                        "chat": { "id": params["chat_id"].clone(), "type": "private" },
                        "text": params["text"].clone()
                    }
                }))
            }
            _ => return Ok(json!({ "ok": true, "result": true })),
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => {
                if let Some(token) = self.cancel_when_exhausted.lock().unwrap().as_ref() {
                    token.cancel();
                }
                Ok(json!({ "ok": true, "result": [] }))
            }
        }
    }
}

pub fn bot_with(transport: Arc<ScriptedTransport>) -> Bot {
    Bot::new(transport)
}

pub fn text_update(id: i64, text: &str) -> Value {
    json!({
        "update_id": id,
        "message": {
            "message_id": id * 10,
            "date": 1_700_000_000,
            "chat": { "id": 500, "type": "private" },
            "from": { "id": 7, "is_bot": false, "first_name": "Ann" },
            "text": text
        }
    })
}

pub fn callback_update(id: i64, data: &str) -> Value {
    json!({
        "update_id": id,
        "callback_query": {
            "id": format!("cb-{id}"),
            "from": { "id": 7, "is_bot": false, "first_name": "Ann" },
            "data": data,
            "message": {
                "message_id": 1,
                "date": 0,
                "chat": { "id": 500, "type": "private" }
            }
        }
    })
}
