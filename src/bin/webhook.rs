//! Webhook entry point for the notice bot
//!
//! Point the bot's webhook at `http://<bind>/<server.path>`. Replies go back
//! to the chat each command came from, so only `BOT_TOKEN` is required.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use notice_bot::{
    error::Result,
    models::{Config, Credentials},
    pipeline::CommandHandler,
    server,
    services::{HttpFetcher, TelegramNotifier},
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the webhook server.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Notice bot webhook starting...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Webhook failed");
            if e.is_config() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> Result<()> {
    let storage_dir = std::env::var_os("STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("storage"));

    let mut config = Config::load_or_default(storage_dir.join("config.toml"));
    config.apply_env_overrides();
    config.validate()?;

    let bot_token = Credentials::bot_token_from_env()?;

    let handler = CommandHandler::new(
        &config,
        Arc::new(HttpFetcher::new(&config.http)?),
        Arc::new(TelegramNotifier::new(&config.telegram, &bot_token)?),
    )?;

    server::serve(&config.server, Arc::new(handler)).await
}
