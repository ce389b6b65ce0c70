//! Webhook HTTP server: `POST /webhook` feeds the raw body to [`Dispatcher::run_webhook_bytes`].

use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use courier_telegram::{Dispatcher, WebhookOutcome};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .with_state(dispatcher)
}

/// Always 200: a rejected payload is logged, never redelivered.
pub(crate) async fn webhook(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> StatusCode {
    match dispatcher.run_webhook_bytes(&body).await {
        WebhookOutcome::Dispatched { update_id } => debug!(update_id, "Webhook update dispatched"),
        WebhookOutcome::Ignored(reason) => debug!(reason = %reason, "Webhook payload ignored"),
    }
    StatusCode::OK
}

/// Serves until `shutdown` is cancelled.
pub async fn serve(dispatcher: Arc<Dispatcher>, addr: &str, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Webhook server listening");

    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Webhook server shutdown complete");
    Ok(())
}
