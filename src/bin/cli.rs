//! Notice bot CLI
//!
//! Local entry point for the poll workflow. Schedule `notice-bot poll` with
//! cron or any other periodic trigger. The webhook lives in
//! `notice-bot-webhook`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use notice_bot::{
    error::Result,
    models::{Config, Credentials},
    pipeline::{self, CommandHandler, PollContext, PollOutcome},
    services::{Formatter, HttpFetcher, NoticeExtractor, TelegramNotifier},
    storage::{FileStateStore, StateStore},
};

/// Notice bot - relays new notices to a Telegram chat
#[derive(Parser, Debug)]
#[command(name = "notice-bot", version, about = "University notice relay bot")]
struct Cli {
    /// Path to storage directory containing config.toml and the state file
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the notices page and announce anything new
    Poll,

    /// Remember every notice currently on the page without announcing it
    Prime,

    /// Run one bot command and deliver the reply
    Command {
        /// Message text, e.g. "/search exam"
        text: String,

        /// Destination chat (default: CHAT_ID)
        #[arg(long)]
        chat: Option<String>,
    },

    /// Validate configuration
    Validate,

    /// Show state file info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_config() => {
            log::error!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    config.apply_env_overrides();
    config.validate()?;

    let store = FileStateStore::new(config.state_path(&cli.storage_dir), config.state.max_saved);

    match cli.command {
        Command::Poll => {
            // Credentials first: nothing touches the network without them.
            let credentials = Credentials::from_env()?;
            log::debug!("Using {:?}", credentials);

            let fetcher = HttpFetcher::new(&config.http)?;
            let notifier = TelegramNotifier::new(&config.telegram, &credentials.bot_token)?;
            let extractor = NoticeExtractor::from_config(&config)?;
            let formatter = Formatter::from_config(&config);

            let ctx = PollContext {
                config: &config,
                source: &fetcher,
                extractor: &extractor,
                formatter: &formatter,
                notifier: &notifier,
                store: &store,
            };

            match pipeline::run_poll(&ctx, &credentials.chat_id).await? {
                PollOutcome::PageStructureChanged => {
                    log::warn!("Nothing extracted; check the selectors in {}", config_path.display());
                }
                PollOutcome::NoNewNotices => log::info!("No new notices"),
                PollOutcome::Delivered { count, state_saved } => {
                    log::info!("Delivered {} notice(s)", count);
                    if !state_saved {
                        log::warn!("State was not saved; the next run may repeat these notices");
                    }
                }
                PollOutcome::PartialFailure { failed, attempted } => {
                    log::warn!("{}/{} deliveries failed; will retry next run", failed, attempted);
                }
            }
        }

        Command::Prime => {
            let fetcher = HttpFetcher::new(&config.http)?;
            let extractor = NoticeExtractor::from_config(&config)?;

            let fresh = pipeline::run_prime(&config, &fetcher, &extractor, &store).await?;
            log::info!("Recorded {} title(s) as seen", fresh);
        }

        Command::Command { text, chat } => {
            let (bot_token, chat_id) = match chat {
                Some(chat) => (Credentials::bot_token_from_env()?, chat),
                None => {
                    let credentials = Credentials::from_env()?;
                    (credentials.bot_token, credentials.chat_id)
                }
            };

            let handler = CommandHandler::new(
                &config,
                Arc::new(HttpFetcher::new(&config.http)?),
                Arc::new(TelegramNotifier::new(&config.telegram, &bot_token)?),
            )?;

            match handler.dispatch(&chat_id, &text).await {
                Some(true) => log::info!("Reply delivered to {}", chat_id),
                Some(false) => log::warn!("Reply to {} was not delivered", chat_id),
                None => log::info!("'{}' is not a command; nothing sent", text),
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK ({})", config_path.display());
            log::info!("Source: {} ({})", config.source.name, config.source.url);
            match Credentials::from_env() {
                Ok(_) => log::info!("✓ BOT_TOKEN and CHAT_ID are set"),
                Err(e) => log::warn!("{}", e),
            }
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("State file: {}", store.location());
            let state = store.load().await;
            log::info!("Remembered titles: {} (cap {})", state.len(), config.state.max_saved);
            if let Some(newest) = state.iter().last() {
                log::info!("Newest: {}", newest);
            }
        }
    }

    Ok(())
}
