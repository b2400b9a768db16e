use crate::errors::FetchError;
use crate::fetchers::Fetch;
use crate::utils::lock;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
enum Response {
    Page(String),
    Status(u16),
    Unreachable,
}

/// Serves pages from memory.
///
/// Useful for tests and offline replays: each URL answers with fixed
/// markup, a failing status, or a transport error, optionally after a
/// delay. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Response>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<Url>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `markup`
    pub fn with_page(mut self, url: &str, markup: impl Into<String>) -> Self {
        self.responses
            .insert(url.to_string(), Response::Page(markup.into()));
        self
    }

    /// Answer `url` with a non-success status
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), Response::Status(status));
        self
    }

    /// Fail `url` at the transport level
    pub fn with_unreachable(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Response::Unreachable);
        self
    }

    /// Hold the answer for `url` back by `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<Url> {
        lock(&self.requests).clone()
    }

    fn record(&self, url: &Url) {
        lock(&self.requests).push(url.clone());
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.record(url);

        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(url.as_str()) {
            Some(Response::Page(markup)) => Ok(markup.clone()),
            Some(Response::Status(status)) => Err(FetchError::Status {
                url: url.clone(),
                status: *status,
            }),
            Some(Response::Unreachable) => Err(FetchError::Transport {
                url: url.clone(),
                message: "connection refused".to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.clone(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_responses() {
        let fetcher = StaticFetcher::new()
            .with_page("https://example.com/about", "<title>About</title>")
            .with_status("https://example.com/broken", 500)
            .with_unreachable("https://example.com/down");

        let about = Url::parse("https://example.com/about").unwrap();
        assert_eq!(fetcher.fetch(&about).await.unwrap(), "<title>About</title>");

        let broken = Url::parse("https://example.com/broken").unwrap();
        assert!(matches!(
            fetcher.fetch(&broken).await,
            Err(FetchError::Status { status: 500, .. })
        ));

        let down = Url::parse("https://example.com/down").unwrap();
        assert!(matches!(
            fetcher.fetch(&down).await,
            Err(FetchError::Transport { .. })
        ));

        let missing = Url::parse("https://example.com/missing").unwrap();
        assert!(matches!(
            fetcher.fetch(&missing).await,
            Err(FetchError::Status { status: 404, .. })
        ));

        assert_eq!(fetcher.requests().len(), 4);
    }
}
