pub mod http;
pub mod static_pages;
pub mod webdriver;

pub use http::HttpFetcher;
pub use static_pages::StaticFetcher;
pub use webdriver::WebDriverFetcher;

use crate::errors::FetchError;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Retrieves the raw markup of a page.
///
/// Transport failures and non-success statuses must both surface as errors;
/// the navigator treats any error as a reason to fall back to a full
/// navigation.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;

    /// Release whatever the fetcher holds open
    async fn shutdown(&self) {}
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Box<F> {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}
