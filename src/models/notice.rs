//! Notice data structure.

use serde::{Deserialize, Serialize};

/// A notice extracted from the notices page.
///
/// The title is the identity key: two notices with the same title are the
/// same notice, whatever their link or date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    /// Notice title (never empty)
    pub title: String,

    /// Absolute URL to the notice
    pub link: String,

    /// Publication date as printed on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Notice {
    /// Create a notice without a date.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            date: None,
        }
    }

    /// Attach a publication date. Blank dates are dropped.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.date = if date.trim().is_empty() {
            None
        } else {
            Some(date)
        };
        self
    }

    /// Case-insensitive keyword match on the title.
    pub fn matches(&self, keyword: &str) -> bool {
        self.title
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }
}
