// src/models/mod.rs

//! Domain models for the notice bot.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod delivery;
mod notice;
mod seen;
mod selectors;

// Re-export all public types
pub use config::{
    BotConfig, CommandsConfig, Config, ContactLink, Credentials, DeveloperInfo, HttpConfig,
    RetryPolicy, ServerConfig, SourceConfig, StateConfig, TelegramConfig,
};
pub use delivery::{DeliveryOutcome, DeliveryReport, OutgoingMessage};
pub use notice::Notice;
pub use seen::SeenState;
pub use selectors::NoticeSelectors;
