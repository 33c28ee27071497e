// src/models/seen.rs

//! The set of notice titles that were already relayed.

use std::collections::HashSet;

/// Insertion-ordered set of seen titles, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenState {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a title was already seen.
    pub fn contains(&self, title: &str) -> bool {
        self.index.contains(title)
    }

    /// Record a title as the most recent entry.
    ///
    /// A title that is already present moves to the newest position, so
    /// notices still visible on the page are the last to be evicted.
    pub fn touch(&mut self, title: impl Into<String>) {
        let title = title.into();
        if !self.index.insert(title.clone()) {
            self.order.retain(|t| t != &title);
        }
        self.order.push(title);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Titles oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The newest `cap` titles, oldest first.
    pub fn newest(&self, cap: usize) -> &[String] {
        let start = self.order.len().saturating_sub(cap);
        &self.order[start..]
    }
}

impl<S: Into<String>> FromIterator<S> for SeenState {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut state = SeenState::new();
        for title in iter {
            let title = title.into();
            if !state.contains(&title) {
                state.touch(title);
            }
        }
        state
    }
}
