// src/pipeline/commands.rs

//! Command-response workflow.
//!
//! Stateless: every command fetches the page on demand and never touches the
//! seen-state. Every recognised command gets a reply, including when the
//! fetch fails.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{CommandsConfig, Config, DeveloperInfo, Notice, OutgoingMessage};
use crate::services::{Formatter, Notifier, NoticeExtractor, PageSource, Template};

/// A bot command recognised in an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/notice`
    ListRecent,
    /// `/latest`
    ShowLatest,
    /// `/search <keyword>`; the keyword may be empty
    Search(String),
    /// `/start` and `/help`
    Help,
    /// `/devInfo`
    DeveloperInfo,
}

impl Command {
    /// Route message text to a command.
    ///
    /// The first token decides. A `@botname` suffix is accepted when it names
    /// `bot_username` (case-insensitive) or when no username is known. Plain
    /// text, unknown commands and commands addressed to another bot yield
    /// `None`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        if !head.starts_with('/') {
            return None;
        }
        let name = match head.split_once('@') {
            Some((name, mention)) => {
                if bot_username.is_some_and(|own| !own.eq_ignore_ascii_case(mention)) {
                    return None;
                }
                name
            }
            None => head,
        };

        match name {
            "/notice" => Some(Self::ListRecent),
            "/latest" => Some(Self::ShowLatest),
            "/search" => Some(Self::Search(rest.to_string())),
            "/start" | "/help" => Some(Self::Help),
            "/devInfo" => Some(Self::DeveloperInfo),
            _ => None,
        }
    }
}

/// Answers commands against the live notices page.
pub struct CommandHandler {
    source: Arc<dyn PageSource>,
    notifier: Arc<dyn Notifier>,
    extractor: NoticeExtractor,
    formatter: Formatter,
    url: String,
    username: Option<String>,
    limits: CommandsConfig,
    developer: Option<DeveloperInfo>,
}

impl CommandHandler {
    pub fn new(
        config: &Config,
        source: Arc<dyn PageSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            source,
            notifier,
            extractor: NoticeExtractor::from_config(config)?,
            formatter: Formatter::from_config(config),
            url: config.source.url.clone(),
            username: config
                .bot
                .username
                .as_deref()
                .map(|name| name.trim_start_matches('@').to_string()),
            limits: config.commands.clone(),
            developer: config.bot.developer.clone(),
        })
    }

    /// Parse `text`, build the reply and send it to `chat_id`.
    ///
    /// Returns `None` when the text is not a command, otherwise whether the
    /// reply was delivered.
    pub async fn dispatch(&self, chat_id: &str, text: &str) -> Option<bool> {
        let command = Command::parse(text, self.username.as_deref())?;
        log::info!("Handling {:?} for chat {}", command, chat_id);

        let reply = self.respond(&command).await;
        let delivered = self.notifier.send(chat_id, &reply).await;
        if !delivered {
            log::warn!("Reply to chat {} was not delivered", chat_id);
        }
        Some(delivered)
    }

    /// Build the reply for a command. Failures become an error reply.
    pub async fn respond(&self, command: &Command) -> OutgoingMessage {
        match self.try_respond(command).await {
            Ok(message) => message,
            Err(e) => {
                log::error!("Command {:?} failed: {}", command, e);
                OutgoingMessage::text(self.formatter.render(Template::Error(&e.to_string())))
            }
        }
    }

    async fn try_respond(&self, command: &Command) -> Result<OutgoingMessage> {
        let text = match command {
            Command::ListRecent => {
                let notices = self.notices(self.limits.list_limit).await?;
                if notices.is_empty() {
                    self.formatter.render(Template::NoNotices)
                } else {
                    self.formatter.render(Template::Digest(&notices))
                }
            }
            Command::ShowLatest => {
                let notices = self.notices(1).await?;
                return Ok(match notices.first() {
                    Some(notice) => {
                        OutgoingMessage::with_preview(self.formatter.render(Template::Latest(notice)))
                    }
                    None => OutgoingMessage::text(self.formatter.render(Template::NoNotices)),
                });
            }
            Command::Search(query) if query.is_empty() => {
                self.formatter.render(Template::SearchUsage)
            }
            Command::Search(query) => {
                let matches: Vec<Notice> = self
                    .notices(self.limits.search_pool)
                    .await?
                    .into_iter()
                    .filter(|n| n.matches(query))
                    .collect();
                if matches.is_empty() {
                    self.formatter.render(Template::NoMatches { query })
                } else {
                    self.formatter.render(Template::SearchDigest {
                        query,
                        matches: &matches,
                        top_k: self.limits.search_top_k,
                    })
                }
            }
            Command::Help => self.formatter.render(Template::Welcome),
            Command::DeveloperInfo => match &self.developer {
                Some(info) => self.formatter.render(Template::DeveloperInfo(info)),
                None => self.formatter.render(Template::Welcome),
            },
        };
        Ok(OutgoingMessage::text(text))
    }

    async fn notices(&self, limit: usize) -> Result<Vec<Notice>> {
        let html = self.source.fetch(&self.url).await?;
        Ok(self.extractor.extract(&html, Some(limit)))
    }
}
