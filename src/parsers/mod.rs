pub mod html;

#[cfg(test)]
mod tests;

use crate::config::RegionSelectors;
use crate::errors::ConfigError;
use crate::state::PageState;
use scraper::Selector;

/// Turns page markup into a [`PageState`].
///
/// The same extractor handles the page the browser loaded directly and
/// every page fetched afterwards, so what counts as "state" never depends
/// on how a page arrived.
#[derive(Debug, Clone)]
pub struct StateExtractor {
    title: Selector,
    content: Selector,
    media: Selector,
    media_attr: String,
}

impl Default for StateExtractor {
    fn default() -> Self {
        Self::new(&RegionSelectors::default()).expect("Default selectors should be valid")
    }
}

impl StateExtractor {
    /// Compile the region selectors once
    pub fn new(regions: &RegionSelectors) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile(&regions.title)?,
            content: compile(&regions.content)?,
            media: compile(&regions.media)?,
            media_attr: regions.media_attr.clone(),
        })
    }

    /// Extract the page state from markup.
    ///
    /// Never fails: a missing content region yields empty content, a missing
    /// title an empty title, and a missing media region (or reference
    /// attribute) an absent image.
    pub fn extract(&self, markup: &str) -> PageState {
        let doc = html::parse(markup);

        let title = html::text(&doc, &self.title).unwrap_or_default();
        let content = html::inner_html(&doc, &self.content).unwrap_or_else(|| {
            ::log::debug!("Markup has no content region, using empty content");
            String::new()
        });
        let image = html::attr(&doc, &self.media, &self.media_attr);

        ::log::trace!(
            "Extracted state {:?} ({} bytes of content, image: {:?})",
            title,
            content.len(),
            image
        );

        PageState::new(title, content, image)
    }

    /// Link targets inside a state's content region
    pub fn links(&self, state: &PageState) -> Vec<String> {
        html::parse_links_only(state.content())
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
