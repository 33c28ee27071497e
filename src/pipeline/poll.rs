// src/pipeline/poll.rs

//! Poll-and-notify workflow.
//!
//! One run loads the seen-state, fetches and extracts the notices page,
//! announces every unseen notice oldest first and commits the new state only
//! when every announcement went through. A failed delivery leaves the stored
//! state untouched so the whole batch is retried on the next run.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Config, DeliveryReport, Notice, OutgoingMessage, SeenState};
use crate::pipeline::diff::diff;
use crate::services::{Formatter, Notifier, NoticeExtractor, PageSource, Template};
use crate::storage::StateStore;

/// Everything one poll run needs, built once at process start.
pub struct PollContext<'a> {
    pub config: &'a Config,
    pub source: &'a dyn PageSource,
    pub extractor: &'a NoticeExtractor,
    pub formatter: &'a Formatter,
    pub notifier: &'a dyn Notifier,
    pub store: &'a dyn StateStore,
}

/// How a poll run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// The page yielded no notices at all; state was left alone.
    PageStructureChanged,
    /// Every notice on the page was already relayed.
    NoNewNotices,
    /// Every new notice went out. `state_saved` is false when the commit failed.
    Delivered { count: usize, state_saved: bool },
    /// At least one delivery failed, so nothing was committed.
    PartialFailure { failed: usize, attempted: usize },
}

/// Run the poll workflow once, delivering to `chat_id`.
pub async fn run_poll(ctx: &PollContext<'_>, chat_id: &str) -> Result<PollOutcome> {
    let start_time = Utc::now();
    let seen = ctx.store.load().await;
    log::info!(
        "Polling {} ({} title(s) remembered)",
        ctx.config.source.url,
        seen.len()
    );

    let Some(extracted) = fetch_notices(ctx.config, ctx.source, ctx.extractor).await? else {
        return Ok(PollOutcome::PageStructureChanged);
    };

    let new = diff(&extracted, &seen);
    if new.is_empty() {
        log::info!("No new notices among {} on the page", extracted.len());
        return Ok(PollOutcome::NoNewNotices);
    }
    log::info!("Found {} new notice(s)", new.len());

    // The page lists newest first; announce in publication order.
    let mut report = DeliveryReport::default();
    for notice in new.iter().rev() {
        let message = OutgoingMessage::text(ctx.formatter.render(Template::Alert(notice)));
        let ok = ctx.notifier.send(chat_id, &message).await;
        if !ok {
            log::warn!("Failed to deliver '{}' via {}", notice.title, ctx.notifier.name());
        }
        report.record(&notice.title, ok);
    }

    if !report.all_succeeded() {
        log::warn!(
            "{} of {} deliveries failed; state not updated, batch will be retried",
            report.failed(),
            report.attempted()
        );
        return Ok(PollOutcome::PartialFailure {
            failed: report.failed(),
            attempted: report.attempted(),
        });
    }

    let next = commit(&seen, &extracted);
    let state_saved = match ctx.store.save(&next).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("Failed to save state to {}: {}", ctx.store.location(), e);
            false
        }
    };

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Delivered {} notice(s) in {}ms",
        report.attempted(),
        elapsed.num_milliseconds()
    );

    Ok(PollOutcome::Delivered {
        count: report.attempted(),
        state_saved,
    })
}

/// Record every notice currently on the page as seen without announcing it.
///
/// Returns how many titles were not remembered before.
pub async fn run_prime(
    config: &Config,
    source: &dyn PageSource,
    extractor: &NoticeExtractor,
    store: &dyn StateStore,
) -> Result<usize> {
    let seen = store.load().await;

    let Some(extracted) = fetch_notices(config, source, extractor).await? else {
        return Ok(0);
    };

    let fresh = diff(&extracted, &seen).len();
    store.save(&commit(&seen, &extracted)).await?;
    log::info!(
        "Primed {}: {} new title(s) recorded, nothing sent",
        store.location(),
        fresh
    );
    Ok(fresh)
}

/// Fetch and extract the page; `None` when the page yields nothing.
async fn fetch_notices(
    config: &Config,
    source: &dyn PageSource,
    extractor: &NoticeExtractor,
) -> Result<Option<Vec<Notice>>> {
    let html = source.fetch(&config.source.url).await?;
    let extracted = extractor.extract(&html, Some(config.source.poll_limit));

    if extracted.is_empty() {
        log::warn!(
            "No notices extracted from {}; the page structure may have changed",
            config.source.url
        );
        return Ok(None);
    }
    Ok(Some(extracted))
}

/// Previously seen titles plus everything on the page, newest entries last.
fn commit(seen: &SeenState, extracted: &[Notice]) -> SeenState {
    let mut next = seen.clone();
    for notice in extracted.iter().rev() {
        next.touch(notice.title.as_str());
    }
    next
}
