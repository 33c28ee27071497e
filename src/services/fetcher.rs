// src/services/fetcher.rs

//! Notices page fetcher.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, RetryPolicy};
use crate::utils::http::{create_client, fetch_text};
use crate::utils::retry::with_retry;

/// Anything that can hand back the raw markup of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page at `url`, failing with `AppError::Network` once
    /// retries are exhausted.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP, retrying transient failures.
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Create a fetcher with the given HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(create_client(config)?, config.retry))
    }

    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let label = format!("GET {url}");
        let (attempts, result) =
            with_retry(&self.retry, &label, || fetch_text(&self.client, url)).await;

        match result {
            Ok(text) => {
                log::debug!("Fetched {} ({} bytes, attempt {})", url, text.len(), attempts);
                Ok(text)
            }
            Err(error) => Err(AppError::network(url, attempts, error)),
        }
    }
}
