// src/models/delivery.rs

//! Outgoing messages and per-message delivery outcomes.

use serde::Serialize;

/// A rendered message ready to hand to a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// MarkdownV2 body, already escaped
    pub text: String,

    /// Let the channel render a preview of the first link
    pub link_preview: bool,
}

impl OutgoingMessage {
    /// A message without link preview.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link_preview: false,
        }
    }

    /// A message that asks for a link preview.
    pub fn with_preview(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link_preview: true,
        }
    }
}

/// Outcome of delivering one notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub title: String,
    pub succeeded: bool,
}

/// Outcomes for a whole batch, in delivery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DeliveryReport {
    pub fn record(&mut self, title: impl Into<String>, succeeded: bool) {
        self.outcomes.push(DeliveryOutcome {
            title: title.into(),
            succeeded,
        });
    }

    /// Every recorded outcome is one delivery attempt.
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded).count()
    }

    /// The commit gate: true only when every message went through.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.succeeded)
    }
}
