use crate::errors::ConfigError;
use crate::filter::{LinkFilter, LinkFilterConfig};
use crate::parsers::StateExtractor;
use crate::transition::RenderMode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Where the document regions live, as CSS selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSelectors {
    /// Element whose text is the page title
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Content region; its inner markup becomes the state's content
    #[serde(default = "default_content_selector")]
    pub content: String,

    /// Optional media region
    #[serde(default = "default_media_selector")]
    pub media: String,

    /// Attribute of the media region holding its reference
    #[serde(default = "default_media_attr")]
    pub media_attr: String,
}

impl Default for RegionSelectors {
    fn default() -> Self {
        Self {
            title: default_title_selector(),
            content: default_content_selector(),
            media: default_media_selector(),
            media_attr: default_media_attr(),
        }
    }
}

/// Configuration for the navigator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// How states are applied to the document
    #[serde(default)]
    pub render_mode: RenderMode,

    /// Delay before the entering container settles
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Upper bound on waiting for the leaving container's transition end
    #[serde(default = "default_transition_timeout_ms")]
    pub transition_timeout_ms: u64,

    /// Upper bound on a single page fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Document region selectors
    #[serde(default)]
    pub regions: RegionSelectors,

    /// Rules for which links are handled in-page
    #[serde(default)]
    pub links: LinkFilterConfig,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            settle_delay_ms: default_settle_delay_ms(),
            transition_timeout_ms: default_transition_timeout_ms(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            regions: RegionSelectors::default(),
            links: LinkFilterConfig::default(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl NavigatorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Check that the region selectors and link patterns compile
    pub fn validate(&self) -> Result<(), ConfigError> {
        StateExtractor::new(&self.regions)?;
        LinkFilter::new(self.links.clone())?;
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn default_title_selector() -> String {
    "title".to_string()
}

fn default_content_selector() -> String {
    ".content".to_string()
}

fn default_media_selector() -> String {
    ".photo".to_string()
}

fn default_media_attr() -> String {
    "src".to_string()
}

/// Default value for settle_delay_ms
fn default_settle_delay_ms() -> u64 {
    200
}

/// Default value for transition_timeout_ms
fn default_transition_timeout_ms() -> u64 {
    1000
}

/// Default value for fetch_timeout_secs
fn default_fetch_timeout_secs() -> u64 {
    30
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
