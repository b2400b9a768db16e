//! History-aware in-page navigation.
//!
//! A [`Navigator`] takes over a loaded page, turns link activations into
//! fetch-extract-render cycles, and keeps a [`NavigationStack`] in step with
//! what the [`LiveDocument`] shows, so that back and forward always land on
//! a state that can be rendered again.

pub mod config;
pub mod document;
pub mod errors;
pub mod fetchers;
pub mod filter;
pub mod history;
pub mod navigator;
pub mod parsers;
pub mod session;
pub mod state;
pub mod transition;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{NavigatorConfig, RegionSelectors};
pub use document::LiveDocument;
pub use errors::{ConfigError, FetchError};
pub use fetchers::Fetch;
pub use history::{NavigationStack, SessionHistory};
pub use navigator::{LinkActivation, NavigationOutcome, Navigator, Phase};
pub use parsers::StateExtractor;
pub use state::PageState;
pub use transition::{RenderMode, ViewTransitioner};

use std::error::Error;
use std::path::Path;
use url::Url;

/// Ways of retrieving pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherType {
    /// Plain HTTP requests
    Http,
    /// A browser driven over WebDriver
    WebDriver,
}

/// Builder that loads a start page and hands it to a navigator
pub struct Launch {
    start_url: String,
    fetcher_type: FetcherType,
    config: NavigatorConfig,
}

impl Launch {
    /// Create a new launch for the given start page
    pub fn new(start_url: impl Into<String>, fetcher_type: FetcherType) -> Self {
        Self {
            start_url: start_url.into(),
            fetcher_type,
            config: NavigatorConfig::default(),
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = NavigatorConfig::from_file(path)?;
        config.validate()?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, ConfigError> {
        let config = NavigatorConfig::from_json(json)?;
        config.validate()?;
        Ok(self.with_config(config))
    }

    /// Override the render mode
    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.config.render_mode = mode;
        self
    }

    /// Fetch the start page and take it over with a fresh in-memory history
    pub async fn open(
        mut self,
    ) -> Result<Navigator<Box<dyn Fetch>, SessionHistory>, Box<dyn Error>> {
        let url = Url::parse(&self.start_url)?;
        self.config.validate()?;

        // Override the WebDriver URL with an environment variable if provided
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.config.webdriver_url = webdriver_url;
            }
        }

        let fetcher: Box<dyn Fetch> = match self.fetcher_type {
            FetcherType::Http => Box::new(fetchers::HttpFetcher::new(self.config.fetch_timeout())?),
            FetcherType::WebDriver => Box::new(fetchers::WebDriverFetcher::new(
                self.config.webdriver_url.clone(),
                self.config.fetch_timeout(),
            )),
        };

        ::log::info!("Loading start page {}", url);
        let markup = fetcher.fetch(&url).await?;

        let history = SessionHistory::new(url.clone());
        let navigator = Navigator::start(&markup, url, &self.config, fetcher, history)?;
        Ok(navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_str_with_bad_selector() {
        let json = r#"{ "regions": { "content": "div[" } }"#;

        match Launch::new("https://example.com/", FetcherType::Http).with_config_str(json) {
            Err(ConfigError::Selector { selector, .. }) => assert_eq!(selector, "div["),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("bad selector accepted"),
        }
    }

    #[test]
    fn test_config_str_with_bad_pattern() {
        let json = r#"{ "links": { "exclude_patterns": ["("] } }"#;

        let result = Launch::new("https://example.com/", FetcherType::Http).with_config_str(json);
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_bad_config_before_fetching() {
        let mut config = NavigatorConfig::default();
        config.regions.title = ":::".to_string();

        // Nothing listens here; validation has to fail first
        let result = Launch::new("http://127.0.0.1:9/", FetcherType::Http)
            .with_config(config)
            .open()
            .await;

        let err = match result {
            Err(e) => e,
            Ok(_) => panic!("bad selector accepted"),
        };
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Selector { .. })
        ));
    }
}
