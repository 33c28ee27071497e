// src/services/extractor.rs

//! Notice extraction from the notices page markup.
//!
//! Extraction is a chain of [`ExtractStrategy`] implementations tried in
//! order. The first strategy that yields at least one notice wins, so a
//! markup change that breaks the item layout degrades to the looser
//! heading scan instead of producing nothing.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, Notice, NoticeSelectors};
use crate::utils::{normalize_whitespace, resolve_url};

/// Where links on the page point to.
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// Origin relative hrefs are resolved against
    pub base: Url,
    /// Used when a notice carries no link at all
    pub page_url: String,
    /// Attribute holding the link (usually "href")
    pub attr_name: String,
}

impl LinkContext {
    fn resolve(&self, href: Option<&str>) -> String {
        match href.map(str::trim).filter(|h| !h.is_empty()) {
            Some(href) => resolve_url(&self.base, href, &self.page_url),
            None => self.page_url.clone(),
        }
    }
}

/// One way of reading notices out of a document.
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Collect notices in page order, stopping at `limit`.
    fn extract(&self, document: &Html, links: &LinkContext, limit: Option<usize>) -> Vec<Notice>;
}

/// Primary strategy: notices wrapped in item containers.
pub struct ItemStrategy {
    item: Selector,
    title: Selector,
    link: Selector,
    date: Selector,
}

impl ItemStrategy {
    pub fn new(selectors: &NoticeSelectors) -> Result<Self> {
        Ok(Self {
            item: parse_selector(&selectors.item_selector)?,
            title: parse_selector(&selectors.title_selector)?,
            link: parse_selector(&selectors.link_selector)?,
            date: parse_selector(&selectors.date_selector)?,
        })
    }
}

impl ExtractStrategy for ItemStrategy {
    fn name(&self) -> &'static str {
        "item"
    }

    fn extract(&self, document: &Html, links: &LinkContext, limit: Option<usize>) -> Vec<Notice> {
        let mut collector = Collector::new(limit);

        for item in document.select(&self.item) {
            let Some(title_elem) = item.select(&self.title).next() else {
                continue;
            };

            let href = ancestor_link(title_elem, &links.attr_name).or_else(|| {
                item.select(&self.link)
                    .next()
                    .and_then(|a| a.value().attr(&links.attr_name))
            });
            let date = item
                .select(&self.date)
                .next()
                .map(|el| normalize_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();

            if collector.push(title_elem, links.resolve(href), date) {
                break;
            }
        }

        collector.finish()
    }
}

/// Fallback strategy: bare headings anywhere in the document.
pub struct HeadingStrategy {
    heading: Selector,
}

impl HeadingStrategy {
    pub fn new(selectors: &NoticeSelectors) -> Result<Self> {
        Ok(Self {
            heading: parse_selector(&selectors.heading_selector)?,
        })
    }
}

impl ExtractStrategy for HeadingStrategy {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn extract(&self, document: &Html, links: &LinkContext, limit: Option<usize>) -> Vec<Notice> {
        let mut collector = Collector::new(limit);

        for heading in document.select(&self.heading) {
            let href = ancestor_link(heading, &links.attr_name);
            if collector.push(heading, links.resolve(href), String::new()) {
                break;
            }
        }

        collector.finish()
    }
}

/// Runs strategies in order until one produces notices.
pub struct NoticeExtractor {
    strategies: Vec<Box<dyn ExtractStrategy>>,
    links: LinkContext,
}

impl NoticeExtractor {
    /// Item strategy first, heading strategy as fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let links = LinkContext {
            base: Url::parse(&config.source.base_url)?,
            page_url: config.source.url.clone(),
            attr_name: config.selectors.attr_name.clone(),
        };

        Ok(Self::with_strategies(
            vec![
                Box::new(ItemStrategy::new(&config.selectors)?),
                Box::new(HeadingStrategy::new(&config.selectors)?),
            ],
            links,
        ))
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractStrategy>>, links: LinkContext) -> Self {
        Self { strategies, links }
    }

    /// Extract notices, most recent first as they appear on the page.
    ///
    /// Returns an empty list when no strategy recognises the markup.
    pub fn extract(&self, html: &str, limit: Option<usize>) -> Vec<Notice> {
        if limit == Some(0) {
            return Vec::new();
        }
        let document = Html::parse_document(html);

        for (position, strategy) in self.strategies.iter().enumerate() {
            let notices = strategy.extract(&document, &self.links, limit);
            if notices.is_empty() {
                log::debug!("Strategy '{}' found no notices", strategy.name());
                continue;
            }

            if position > 0 {
                log::warn!(
                    "Primary markup not found; '{}' strategy recovered {} notice(s)",
                    strategy.name(),
                    notices.len()
                );
            } else {
                log::debug!(
                    "Strategy '{}' found {} notice(s)",
                    strategy.name(),
                    notices.len()
                );
            }
            return notices;
        }

        Vec::new()
    }
}

/// Accumulates notices, skipping blank and repeated titles.
struct Collector {
    notices: Vec<Notice>,
    titles: HashSet<String>,
    limit: Option<usize>,
}

impl Collector {
    fn new(limit: Option<usize>) -> Self {
        Self {
            notices: Vec::new(),
            titles: HashSet::new(),
            limit,
        }
    }

    /// Returns true once the limit is reached.
    fn push(&mut self, title_elem: ElementRef<'_>, link: String, date: String) -> bool {
        let title = normalize_whitespace(&title_elem.text().collect::<String>());
        if !title.is_empty() && self.titles.insert(title.clone()) {
            self.notices.push(Notice::new(title, link).with_date(date));
        }
        self.limit.is_some_and(|limit| self.notices.len() >= limit)
    }

    fn finish(self) -> Vec<Notice> {
        self.notices
    }
}

/// The link of the nearest enclosing `<a>`.
fn ancestor_link<'a>(elem: ElementRef<'a>, attr_name: &str) -> Option<&'a str> {
    elem.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr(attr_name))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
