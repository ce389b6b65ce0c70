//! Outbound client: [`Transport`] sends one API call and returns the decoded envelope;
//! [`Bot`] checks the envelope and maps results into typed outputs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::error::{CourierError, Result};
use crate::methods::Method;

/// Default public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Sends an API method with JSON parameters and returns the decoded response envelope
/// (`{ "ok": bool, "result"?: ..., "error_code"?: ..., "description"?: ... }`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, method: &str, params: &Value) -> Result<Value>;
}

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// API base URL without trailing slash, e.g. `https://api.telegram.org`.
    pub api_url: String,
    /// Base request timeout; a `timeout` request parameter (long polling) is added on top.
    pub request_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-based [`Transport`]: `POST {api_url}/bot{token}/{method}` with a JSON body.
pub struct HttpTransport {
    client: reqwest::Client,
    token: String,
    config: HttpTransportConfig,
}

impl HttpTransport {
    pub fn new(token: impl Into<String>, config: HttpTransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| CourierError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            token: token.into(),
            config,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    fn timeout_for(&self, params: &Value) -> Duration {
        let long_poll = params.get("timeout").and_then(|v| v.as_u64()).unwrap_or(0);
        self.config.request_timeout + Duration::from_secs(long_poll)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, params))]
    async fn call(&self, method: &str, params: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.method_url(method))
            .timeout(self.timeout_for(params))
            .json(params)
            .send()
            .await
            .map_err(|e| {
                error!(method = %method, error = %e, "HTTP error while calling API");
                CourierError::Transport(e.to_string())
            })?;

        let status = response.status();
        // Error envelopes arrive with 4xx statuses; the body is still the envelope.
        let body = response
            .text()
            .await
            .map_err(|e| CourierError::Transport(e.to_string()))?;
        serde_json::from_str::<Value>(&body).map_err(|e| {
            error!(method = %method, status = %status, error = %e, "Failed to decode API response");
            CourierError::Transport(format!(
                "undecodable response (HTTP {}): {}",
                status, e
            ))
        })
    }
}

/// Cheaply cloneable client handed to handlers for replies.
#[derive(Clone)]
pub struct Bot {
    transport: Arc<dyn Transport>,
}

impl Bot {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Bot talking HTTP to `config.api_url` with the given token.
    pub fn with_token(token: impl Into<String>, config: HttpTransportConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(token, config)?)))
    }

    /// Calls a raw API method. `ok: false` becomes [`CourierError::Api`]; on success the
    /// `result` field is returned (`null` when absent).
    #[instrument(skip(self, params))]
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!(method = %method, params = %params, "Sending request to API");
        let envelope = self.transport.call(method, &params).await?;

        let ok = envelope.get("ok").and_then(|v| v.as_bool()).ok_or_else(|| {
            CourierError::Transport(format!("response to {} has no boolean `ok`", method))
        })?;
        if !ok {
            let err = CourierError::from_envelope(&envelope);
            error!(method = %method, error = %err, "API returned an error");
            return Err(err);
        }

        debug!(method = %method, "Received successful response from API");
        Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Sends a typed [`Method`] and decodes its result.
    pub async fn send<M: Method>(&self, method: &M) -> Result<M::Output> {
        let result = self.call(M::NAME, method.params()?).await?;
        Ok(serde_json::from_value(result)?)
    }
}
