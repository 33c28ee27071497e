//! Service layer for the notice bot.
//!
//! This module contains the building blocks of both workflows:
//! - Page fetching with retry (`HttpFetcher`)
//! - Notice extraction with strategy fallback (`NoticeExtractor`)
//! - MarkdownV2 message rendering (`Formatter`)
//! - Message delivery (`TelegramNotifier`)

mod extractor;
mod fetcher;
mod formatter;
mod notifier;

pub use extractor::{ExtractStrategy, HeadingStrategy, ItemStrategy, LinkContext, NoticeExtractor};
pub use fetcher::{HttpFetcher, PageSource};
pub use formatter::{Formatter, RESERVED, Template, escape_markdown_v2};
pub use notifier::{Notifier, TelegramNotifier};
