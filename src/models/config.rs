//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::NoticeSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where notices are published
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP behavior for fetching the notices page
    #[serde(default)]
    pub http: HttpConfig,

    /// Telegram Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Seen-state persistence
    #[serde(default)]
    pub state: StateConfig,

    /// Limits for the command interface
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Scraping selectors
    #[serde(default)]
    pub selectors: NoticeSelectors,

    /// Texts shown by the bot
    #[serde(default)]
    pub bot: BotConfig,

    /// Webhook server settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("NOTICES_URL") {
            self.source.url = url;
        }

        if let Some(file) = lookup("STATE_FILE") {
            self.state.file = file;
        }

        if let Some(max) = lookup("MAX_SAVED_NOTICES") {
            if let Ok(n) = max.parse() {
                self.state.max_saved = n;
            }
        }

        if let Some(timeout) = lookup("REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.http.timeout_secs = secs;
            }
        }

        if let Some(bind) = lookup("WEBHOOK_BIND") {
            self.server.bind = bind;
        }
    }

    /// Resolve the state file path against the storage directory.
    pub fn state_path(&self, storage_dir: &Path) -> PathBuf {
        let file = Path::new(&self.state.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            storage_dir.join(file)
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.telegram.timeout_secs == 0 {
            return Err(AppError::validation("telegram.timeout_secs must be > 0"));
        }
        if self.state.file.trim().is_empty() {
            return Err(AppError::validation("state.file is empty"));
        }
        if self.state.max_saved == 0 {
            return Err(AppError::validation("state.max_saved must be > 0"));
        }
        if self.source.poll_limit == 0 {
            return Err(AppError::validation("source.poll_limit must be > 0"));
        }
        if self.commands.list_limit == 0 || self.commands.search_pool == 0 {
            return Err(AppError::validation(
                "commands.list_limit and commands.search_pool must be > 0",
            ));
        }
        if self.state.max_saved < self.source.poll_limit {
            return Err(AppError::validation(format!(
                "state.max_saved ({}) must be at least source.poll_limit ({})",
                self.state.max_saved, self.source.poll_limit
            )));
        }
        if self.commands.search_top_k == 0 {
            return Err(AppError::validation("commands.search_top_k must be > 0"));
        }
        if !self.server.path.starts_with('/') {
            return Err(AppError::validation("server.path must start with '/'"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is invalid: {e}")))?;
        Ok(())
    }
}

/// The notices page and how much of it to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short institution name used in message headers
    #[serde(default = "defaults::source_name")]
    pub name: String,

    /// URL of the notices page
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Origin relative links are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Maximum notices read per poll
    #[serde(default = "defaults::poll_limit")]
    pub poll_limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: defaults::source_name(),
            url: defaults::source_url(),
            base_url: defaults::base_url(),
            poll_limit: defaults::poll_limit(),
        }
    }
}

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Pause between attempts in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub delay_ms: u64,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay_ms: 0,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            delay_ms: defaults::retry_delay(),
        }
    }
}

/// HTTP client settings for fetching the notices page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API origin, without trailing slash
    #[serde(default = "defaults::telegram_api")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::telegram_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::telegram_api(),
            timeout_secs: defaults::telegram_timeout(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Seen-state file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State file, relative to the storage directory unless absolute
    #[serde(default = "defaults::state_file")]
    pub file: String,

    /// Maximum number of titles kept
    #[serde(default = "defaults::max_saved")]
    pub max_saved: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            file: defaults::state_file(),
            max_saved: defaults::max_saved(),
        }
    }
}

/// Limits for command replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Notices listed by `/notice`
    #[serde(default = "defaults::list_limit")]
    pub list_limit: usize,

    /// Notices scanned by `/search`
    #[serde(default = "defaults::search_pool")]
    pub search_pool: usize,

    /// Matches listed by `/search`
    #[serde(default = "defaults::search_top_k")]
    pub search_top_k: usize,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            list_limit: defaults::list_limit(),
            search_pool: defaults::search_pool(),
            search_top_k: defaults::search_top_k(),
        }
    }
}

/// Bot texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name used in the welcome message
    #[serde(default = "defaults::bot_name")]
    pub name: String,

    /// Bot username without `@`. When set, commands addressed to another
    /// bot (`/notice@OtherBot`) are ignored.
    #[serde(default)]
    pub username: Option<String>,

    /// Shown by `/devInfo`; the command falls back to help when unset
    #[serde(default)]
    pub developer: Option<DeveloperInfo>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: defaults::bot_name(),
            username: None,
            developer: None,
        }
    }
}

/// Developer contact card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeveloperInfo {
    pub name: String,

    /// Label and URL pairs, rendered in order
    #[serde(default)]
    pub links: Vec<ContactLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactLink {
    pub label: String,
    pub url: String,
}

/// Webhook server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// Route receiving Telegram updates
    #[serde(default = "defaults::webhook_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            path: defaults::webhook_path(),
        }
    }
}

/// Secrets read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Credentials {
    pub const BOT_TOKEN: &'static str = "BOT_TOKEN";
    pub const CHAT_ID: &'static str = "CHAT_ID";

    /// Read both credentials from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read both credentials from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = required(&lookup, Self::BOT_TOKEN)?;
        let chat_id = required(&lookup, Self::CHAT_ID)?;
        Ok(Self { bot_token, chat_id })
    }

    /// Read only the bot token; the webhook replies to whoever wrote.
    pub fn bot_token_from_env() -> Result<String> {
        required(&|key: &str| std::env::var(key).ok(), Self::BOT_TOKEN)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::config(format!("{key} is not set")))
}

mod defaults {
    pub fn source_name() -> String {
        "AIUB".into()
    }
    pub fn source_url() -> String {
        "https://www.aiub.edu/category/notices".into()
    }
    pub fn base_url() -> String {
        "https://www.aiub.edu".into()
    }
    pub fn poll_limit() -> usize {
        10
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; AIUBNoticeBot/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        2000
    }

    pub fn telegram_api() -> String {
        "https://api.telegram.org".into()
    }
    pub fn telegram_timeout() -> u64 {
        10
    }

    pub fn state_file() -> String {
        "seen_notices.txt".into()
    }
    pub fn max_saved() -> usize {
        200
    }

    pub fn list_limit() -> usize {
        5
    }
    pub fn search_pool() -> usize {
        20
    }
    pub fn search_top_k() -> usize {
        5
    }

    pub fn bot_name() -> String {
        "AIUB Notice Bot".into()
    }

    pub fn bind() -> String {
        "0.0.0.0:8080".into()
    }
    pub fn webhook_path() -> String {
        "/api/webhook".into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_cap() {
        let mut config = Config::default();
        config.state.max_saved = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.source.poll_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.commands.search_pool = 0;
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn validate_rejects_cap_below_poll_limit() {
        let mut config = Config::default();
        config.source.poll_limit = 10;
        config.state.max_saved = 3;
        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("state.max_saved"));

        config.state.max_saved = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = Config::default();
        config.source.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [state]
            max_saved = 50

            [http.retry]
            max_retries = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.state.max_saved, 50);
        assert_eq!(config.state.file, "seen_notices.txt");
        assert_eq!(config.http.retry.max_retries, 1);
        assert_eq!(config.http.retry.delay_ms, 2000);
        assert_eq!(config.commands.search_top_k, 5);
    }

    #[test]
    fn developer_card_parses() {
        let config: Config = toml::from_str(
            r#"
            [bot.developer]
            name = "Jane Doe"
            links = [{ label = "GitHub", url = "https://github.com/jane-doe" }]
            "#,
        )
        .unwrap();

        let dev = config.bot.developer.unwrap();
        assert_eq!(dev.name, "Jane Doe");
        assert_eq!(dev.links[0].label, "GitHub");
    }

    #[test]
    fn overrides_apply() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("NOTICES_URL", "https://example.com/notices"),
            ("MAX_SAVED_NOTICES", "42"),
            ("REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]));

        assert_eq!(config.source.url, "https://example.com/notices");
        assert_eq!(config.state.max_saved, 42);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn state_path_is_relative_to_storage_dir() {
        let config = Config::default();
        assert_eq!(
            config.state_path(Path::new("storage")),
            PathBuf::from("storage/seen_notices.txt")
        );
    }

    #[test]
    fn credentials_require_both_values() {
        let creds = Credentials::from_lookup(lookup(&[("BOT_TOKEN", "123:abc"), ("CHAT_ID", "-100")]))
            .unwrap();
        assert_eq!(creds.chat_id, "-100");

        let err = Credentials::from_lookup(lookup(&[("BOT_TOKEN", "123:abc")])).unwrap_err();
        assert!(err.is_config());

        let err = Credentials::from_lookup(lookup(&[("BOT_TOKEN", " "), ("CHAT_ID", "1")]))
            .unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn credentials_debug_hides_token() {
        let creds = Credentials {
            bot_token: "secret-token".into(),
            chat_id: "42".into(),
        };
        assert!(!format!("{creds:?}").contains("secret-token"));
    }

    #[test]
    fn retry_policy_attempts() {
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), 4);
    }
}
