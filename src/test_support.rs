//! Shared fixtures and in-memory fakes for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;

use crate::error::{AppError, Result};
use crate::models::{OutgoingMessage, SeenState};
use crate::services::{Notifier, PageSource};
use crate::storage::StateStore;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A page in the current layout: one `.notice-item` per title, newest first.
pub fn item_page(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                r#"<div class="notice-item"><a href="/notices/{i}"><h2 class="title">{t}</h2></a><span class="date">Day {i}</span></div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"notices\">{items}</div></body></html>")
}

/// A page in the legacy layout: bare linked headings, no item wrappers.
pub fn heading_page(titles: &[&str]) -> String {
    let headings: String = titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!(r#"<a href="/legacy/{i}"><h2 class="title">{t}</h2></a>"#))
        .collect();
    format!("<html><body><div class=\"content\">{headings}</div></body></html>")
}

/// Serves fixed markup and counts requests.
#[derive(Default)]
pub struct StaticPage {
    html: Mutex<String>,
    fail: Mutex<bool>,
    fetches: AtomicUsize,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: Mutex::new(html.into()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let page = Self::default();
        *page.fail.lock().unwrap() = true;
        page
    }

    pub fn set_html(&self, html: impl Into<String>) {
        *self.html.lock().unwrap() = html.into();
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for StaticPage {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if *self.fail.lock().unwrap() {
            return Err(AppError::network(url, 4, "connection refused"));
        }
        Ok(self.html.lock().unwrap().clone())
    }
}

/// Records every message and rejects those containing a marker.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, OutgoingMessage)>>,
    reject_containing: Mutex<Option<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(marker: &str) -> Self {
        let notifier = Self::default();
        *notifier.reject_containing.lock().unwrap() = Some(marker.to_string());
        notifier
    }

    pub fn accept_all(&self) {
        *self.reject_containing.lock().unwrap() = None;
    }

    /// Every attempted message, in send order.
    pub fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, m)| m.text).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: &str, message: &OutgoingMessage) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), message.clone()));
        match self.reject_containing.lock().unwrap().as_deref() {
            Some(marker) => !message.text.contains(marker),
            None => true,
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Seen-state held in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<SeenState>,
    saves: AtomicUsize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            state: Mutex::new(titles.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> SeenState {
        self.state.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> SeenState {
        self.snapshot()
    }

    async fn save(&self, state: &SeenState) -> Result<()> {
        if self.fail_saves {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
