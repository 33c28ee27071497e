// src/models/selectors.rs

//! CSS selectors for scraping the notices page.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping the notices page.
///
/// `item_*` selectors drive the primary strategy, `heading_selector` drives
/// the fallback used when the page no longer wraps notices in items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeSelectors {
    /// Selector for each notice item in the list
    #[serde(default = "defaults::item")]
    pub item_selector: String,

    /// Selector for the title element within an item
    #[serde(default = "defaults::title")]
    pub title_selector: String,

    /// Selector for a link inside the item, used when the title is not wrapped in one
    #[serde(default = "defaults::link")]
    pub link_selector: String,

    /// Selector for the date element within an item
    #[serde(default = "defaults::date")]
    pub date_selector: String,

    /// Selector for bare notice headings anywhere on the page
    #[serde(default = "defaults::title")]
    pub heading_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::attr_name")]
    pub attr_name: String,
}

impl Default for NoticeSelectors {
    fn default() -> Self {
        Self {
            item_selector: defaults::item(),
            title_selector: defaults::title(),
            link_selector: defaults::link(),
            date_selector: defaults::date(),
            heading_selector: defaults::title(),
            attr_name: defaults::attr_name(),
        }
    }
}

mod defaults {
    pub fn item() -> String {
        ".event-item, .notice-item, article".into()
    }
    pub fn title() -> String {
        "h2.title".into()
    }
    pub fn link() -> String {
        "a[href]".into()
    }
    pub fn date() -> String {
        ".date, time, .event-date".into()
    }
    pub fn attr_name() -> String {
        "href".into()
    }
}
