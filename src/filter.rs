use crate::errors::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for deciding which activated links are handled in-page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Whether links to other origins are fetched in-page too
    #[serde(default = "default_allow_external")]
    pub allow_external: bool,

    /// Regex patterns for URLs to intercept (if empty, all URLs are intercepted unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs left to the browser (these take precedence over include patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Default value for allow_external field (false for safety)
fn default_allow_external() -> bool {
    false
}

fn default_exclude_patterns() -> Vec<String> {
    // Downloads and assets are never rendered into the content region
    vec![r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$".to_string()]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            allow_external: default_allow_external(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Decides whether a link activation is turned into an in-page navigation
/// or left to the browser's native handling.
#[derive(Debug)]
pub struct LinkFilter {
    config: LinkFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Result<Self, ConfigError> {
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if navigating from `current` to `target` should happen in-page
    pub fn should_intercept(&self, target: &Url, current: &Url) -> bool {
        if !matches!(target.scheme(), "http" | "https") {
            return false;
        }

        if !self.config.allow_external && target.origin() != current.origin() {
            return false;
        }

        // Same-document fragment links only scroll
        if target.fragment().is_some() && strip_fragment(target) == strip_fragment(current) {
            return false;
        }

        let url_str = target.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }

        if !self.include_regexes.is_empty() {
            return self.include_regexes.iter().any(|r| r.is_match(url_str));
        }

        true
    }
}

fn strip_fragment(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_filter() {
        let filter = LinkFilter::default();
        let current = url("https://example.com/");

        assert!(filter.should_intercept(&url("https://example.com/about"), &current));

        // Assets and other origins go to the browser
        assert!(!filter.should_intercept(&url("https://example.com/photo.jpg"), &current));
        assert!(!filter.should_intercept(&url("https://other.com/about"), &current));
        assert!(!filter.should_intercept(&url("http://example.com/about"), &current));
    }

    #[test]
    fn test_non_http_schemes() {
        let filter = LinkFilter::default();
        let current = url("https://example.com/");

        assert!(!filter.should_intercept(&url("mailto:me@example.com"), &current));
        assert!(!filter.should_intercept(&url("javascript:void(0)"), &current));
    }

    #[test]
    fn test_fragment_links() {
        let filter = LinkFilter::default();
        let current = url("https://example.com/guide");

        assert!(!filter.should_intercept(&url("https://example.com/guide#setup"), &current));
        assert!(filter.should_intercept(&url("https://example.com/faq#setup"), &current));
    }

    #[test]
    fn test_allow_external() {
        let config = LinkFilterConfig {
            allow_external: true,
            ..LinkFilterConfig::default()
        };
        let filter = LinkFilter::new(config).unwrap();
        let current = url("https://example.com/");

        assert!(filter.should_intercept(&url("https://other.com/about"), &current));
    }

    #[test]
    fn test_regex_patterns() {
        let config = LinkFilterConfig {
            allow_external: false,
            include_patterns: vec![r"/docs/".to_string()],
            exclude_patterns: vec![r"/docs/draft/".to_string()],
        };
        let filter = LinkFilter::new(config).unwrap();
        let current = url("https://example.com/docs/");

        assert!(filter.should_intercept(&url("https://example.com/docs/page"), &current));
        assert!(!filter.should_intercept(&url("https://example.com/blog/post"), &current));
        assert!(!filter.should_intercept(&url("https://example.com/docs/draft/page"), &current));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = LinkFilterConfig {
            include_patterns: vec!["(".to_string()],
            ..LinkFilterConfig::default()
        };
        assert!(matches!(LinkFilter::new(config), Err(ConfigError::Pattern(_))));
    }
}
