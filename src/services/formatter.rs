// src/services/formatter.rs

//! Message rendering for Telegram's MarkdownV2 mode.
//!
//! Every piece of scraped or user-supplied text goes through
//! [`escape_markdown_v2`] before it is placed in a template. Markup the
//! templates add themselves (emphasis, list numbering, links) is written
//! pre-escaped.

use crate::models::{Config, DeveloperInfo, Notice};

/// Characters MarkdownV2 treats as markup.
pub const RESERVED: &str = "_*[]()~`>#+-=|{}.!\\";

/// Escape text for MarkdownV2 by prefixing reserved characters with `\`.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// The kinds of message the bot sends.
#[derive(Debug, Clone, Copy)]
pub enum Template<'a> {
    /// New notice announcement from the poll workflow
    Alert(&'a Notice),
    /// Reply to `/latest`
    Latest(&'a Notice),
    /// Reply to `/notice`
    Digest(&'a [Notice]),
    /// Reply to `/search`, truncated to `top_k`
    SearchDigest {
        query: &'a str,
        matches: &'a [Notice],
        top_k: usize,
    },
    NoMatches { query: &'a str },
    NoNotices,
    SearchUsage,
    Error(&'a str),
    /// Reply to `/start` and `/help`
    Welcome,
    DeveloperInfo(&'a DeveloperInfo),
}

/// Renders templates with the configured names.
#[derive(Debug, Clone)]
pub struct Formatter {
    source_name: String,
    bot_name: String,
}

impl Formatter {
    pub fn new(source_name: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            bot_name: bot_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.source.name, &config.bot.name)
    }

    pub fn render(&self, template: Template<'_>) -> String {
        match template {
            Template::Alert(notice) => self.alert(notice),
            Template::Latest(notice) => latest(notice),
            Template::Digest(notices) => self.digest(notices),
            Template::SearchDigest {
                query,
                matches,
                top_k,
            } => search_digest(query, matches, top_k),
            Template::NoMatches { query } => format!(
                "No notices found matching \"{}\"",
                escape_markdown_v2(query)
            ),
            Template::NoNotices => "No notices found\\.".to_string(),
            Template::SearchUsage => "Usage: /search \\<keyword\\>\nExample: /search exam".to_string(),
            Template::Error(message) => format!("⚠️ Error: {}", escape_markdown_v2(message)),
            Template::Welcome => self.welcome(),
            Template::DeveloperInfo(info) => developer_info(info),
        }
    }

    fn alert(&self, notice: &Notice) -> String {
        let date = notice
            .date
            .as_deref()
            .map(|d| format!("📅 {}\n\n", escape_markdown_v2(d)))
            .unwrap_or_default();
        format!(
            "🚨 *New {} Notice\\!*\n\n{}*{}*\n\n[Click to Read]({})",
            escape_markdown_v2(&self.source_name),
            date,
            escape_markdown_v2(&notice.title),
            escape_markdown_v2(&notice.link)
        )
    }

    fn digest(&self, notices: &[Notice]) -> String {
        let mut lines = vec![format!(
            "📋 *Latest {} Notices*\n",
            escape_markdown_v2(&self.source_name)
        )];
        lines.extend(numbered(notices));
        lines.join("\n")
    }

    fn welcome(&self) -> String {
        format!(
            "👋 *Welcome to {}\\!*\n\n\
             Available commands:\n\
             /notice \\- Show latest notices\n\
             /latest \\- Show the most recent notice\n\
             /search \\<keyword\\> \\- Search notices\n\
             /devInfo \\- Show developer info\n\
             /help \\- Show this message",
            escape_markdown_v2(&self.bot_name)
        )
    }
}

fn latest(notice: &Notice) -> String {
    let date = notice
        .date
        .as_deref()
        .map(|d| format!("📅 {}\n\n", escape_markdown_v2(d)))
        .unwrap_or_default();
    format!(
        "🔔 *Latest Notice*\n\n{}_{}_\n\n[Click to Read]({})",
        date,
        escape_markdown_v2(&notice.title),
        escape_markdown_v2(&notice.link)
    )
}

fn search_digest(query: &str, matches: &[Notice], top_k: usize) -> String {
    let shown = &matches[..matches.len().min(top_k)];
    let mut lines = vec![format!(
        "🔍 *Search results for \"{}\"*\n",
        escape_markdown_v2(query)
    )];
    lines.extend(numbered(shown));

    let hidden = matches.len() - shown.len();
    if hidden > 0 {
        lines.push(format!("\n_\\+{hidden} more results_"));
    }
    lines.join("\n")
}

fn developer_info(info: &DeveloperInfo) -> String {
    let mut text = format!(
        "👨‍💻 *Developer Information*\n\n*Name:* {}",
        escape_markdown_v2(&info.name)
    );
    if !info.links.is_empty() {
        text.push_str("\n\n🔗 *Connect with me:*");
        for link in &info.links {
            text.push_str(&format!(
                "\n[{}]({})",
                escape_markdown_v2(&link.label),
                escape_markdown_v2(&link.url)
            ));
        }
    }
    text
}

/// `1\. [title](link) \(date\)` lines, each followed by a blank line.
fn numbered(notices: &[Notice]) -> impl Iterator<Item = String> + '_ {
    notices.iter().enumerate().map(|(i, notice)| {
        let date = notice
            .date
            .as_deref()
            .map(|d| format!(" \\({}\\)", escape_markdown_v2(d)))
            .unwrap_or_default();
        format!(
            "{}\\. [{}]({}){}\n",
            i + 1,
            escape_markdown_v2(&notice.title),
            escape_markdown_v2(&notice.link),
            date
        )
    })
}
