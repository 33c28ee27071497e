//! Webhook endpoint for the command workflow.
//!
//! The bot platform retries any update that is not acknowledged with a 2xx,
//! so every POST answers `200 OK` whatever happened while handling it.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::instrument;

use crate::error::Result;
use crate::models::ServerConfig;
use crate::pipeline::CommandHandler;

/// Inbound update; only plain messages are acted on.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

const LIVENESS: &str = "Notice bot webhook is running.";

/// Routes for the webhook path.
pub fn router(handler: Arc<CommandHandler>, path: &str) -> Router {
    Router::new()
        .route(path, post(receive_update).get(liveness))
        .with_state(handler)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &ServerConfig, handler: Arc<CommandHandler>) -> Result<()> {
    let listener = TcpListener::bind(&config.bind).await.map_err(|e| {
        tracing::error!(error = %e, address = %config.bind, "Failed to bind to address");
        e
    })?;
    tracing::info!(address = %config.bind, path = %config.path, "Webhook listening");

    axum::serve(listener, router(handler, &config.path))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Webhook shutdown complete");
    Ok(())
}

fn acknowledge() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

async fn liveness() -> &'static str {
    LIVENESS
}

#[instrument(skip_all, fields(bytes = body.len()))]
async fn receive_update(
    State(handler): State<Arc<CommandHandler>>,
    body: Bytes,
) -> impl IntoResponse {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed update");
            return acknowledge();
        }
    };

    let Some(IncomingMessage {
        chat,
        text: Some(text),
    }) = update.message
    else {
        tracing::debug!("Update carries no text message");
        return acknowledge();
    };

    let chat_id = chat.id.to_string();
    match handler.dispatch(&chat_id, &text).await {
        Some(true) => tracing::info!(chat_id = %chat_id, "Reply delivered"),
        Some(false) => tracing::warn!(chat_id = %chat_id, "Reply not delivered"),
        None => tracing::debug!(chat_id = %chat_id, "Not a command"),
    }
    acknowledge()
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;
    use crate::test_support::{RecordingNotifier, StaticPage, item_page, spawn_server};

    async fn start(page: StaticPage) -> (String, Arc<RecordingNotifier>) {
        let config = Config::default();
        let notifier = Arc::new(RecordingNotifier::new());
        let handler =
            CommandHandler::new(&config, Arc::new(page), notifier.clone()).unwrap();
        let base = spawn_server(router(Arc::new(handler), &config.server.path)).await;
        (format!("{base}{}", config.server.path), notifier)
    }

    async fn post_body(url: &str, body: &'static str) -> (u16, String, String) {
        let response = reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (status, content_type, response.text().await.unwrap())
    }

    #[tokio::test]
    async fn test_command_is_answered() {
        let (url, notifier) = start(StaticPage::new(item_page(&["Exam routine"]))).await;

        let (status, content_type, body) =
            post_body(&url, r#"{"message": {"chat": {"id": -100123}, "text": "/latest"}}"#)
                .await;

        assert_eq!(status, 200);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, "OK");
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "-100123");
        assert!(sent[0].1.text.contains("Exam routine"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_acknowledged() {
        let (url, notifier) = start(StaticPage::new("")).await;

        let (status, _, body) = post_body(&url, "{not json").await;
        assert_eq!(status, 200);
        assert_eq!(body, "OK");
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_updates_without_text_are_acknowledged() {
        let (url, notifier) = start(StaticPage::new("")).await;

        let (status, _, _) = post_body(&url, r#"{"update_id": 1}"#).await;
        assert_eq!(status, 200);
        let (status, _, _) =
            post_body(&url, r#"{"message": {"chat": {"id": 5}, "sticker": {}}}"#).await;
        assert_eq!(status, 200);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_still_acknowledged_and_replied() {
        let (url, notifier) = start(StaticPage::failing()).await;

        let (status, _, _) =
            post_body(&url, r#"{"message": {"chat": {"id": 9}, "text": "/notice"}}"#).await;

        assert_eq!(status, 200);
        assert!(notifier.texts()[0].starts_with("⚠️ Error"));
    }

    #[tokio::test]
    async fn test_get_returns_liveness() {
        let (url, _) = start(StaticPage::new("")).await;

        let body = reqwest::get(&url).await.unwrap().text().await.unwrap();
        assert_eq!(body, LIVENESS);
    }
}
