use crate::state::PageState;
use serde::Serialize;
use url::Url;

/// One entry of the navigation stack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Opaque state object; `None` for entries that predate state tracking
    pub state: Option<serde_json::Value>,
    pub title: String,
    pub url: Url,
}

/// What the traversal signal delivers for the newly current entry
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub state: Option<PageState>,
    pub url: Url,
}

/// The browser-style navigation stack the navigator keeps in sync with the
/// document.
pub trait NavigationStack: Send {
    /// Whether state-carrying entries are supported at all.
    ///
    /// When this is false the navigator stays inert and every link is left
    /// to native navigation.
    fn is_supported(&self) -> bool {
        true
    }

    /// Add an entry after the current one, discarding any forward entries
    fn push(&mut self, state: &PageState, title: &str, url: &Url);

    /// Overwrite the current entry
    fn replace(&mut self, state: &PageState, title: &str, url: &Url);

    /// Move by `delta` entries; `None` if that leaves the stack
    fn go(&mut self, delta: isize) -> Option<Traversal>;

    fn current(&self) -> Option<&HistoryEntry>;
}

/// In-memory navigation stack with browser semantics
#[derive(Debug, Clone, Serialize)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
    #[serde(skip)]
    supported: bool,
}

impl SessionHistory {
    /// A stack holding the entry for the page as loaded, without state
    pub fn new(url: Url) -> Self {
        Self {
            entries: vec![HistoryEntry {
                state: None,
                title: String::new(),
                url,
            }],
            index: 0,
            supported: true,
        }
    }

    /// A stack that reports itself unsupported, like a browser without pushState
    pub fn unsupported(url: Url) -> Self {
        Self {
            supported: false,
            ..Self::new(url)
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decoded state of the current entry
    pub fn current_state(&self) -> Option<PageState> {
        self.current()
            .and_then(|e| e.state.as_ref())
            .and_then(PageState::from_value)
    }
}

impl NavigationStack for SessionHistory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn push(&mut self, state: &PageState, title: &str, url: &Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry {
            state: Some(state.to_value()),
            title: title.to_string(),
            url: url.clone(),
        });
        self.index = self.entries.len() - 1;
        ::log::debug!("History push {} ({} entries)", url, self.entries.len());
    }

    fn replace(&mut self, state: &PageState, title: &str, url: &Url) {
        let entry = HistoryEntry {
            state: Some(state.to_value()),
            title: title.to_string(),
            url: url.clone(),
        };
        match self.entries.get_mut(self.index) {
            Some(current) => *current = entry,
            None => {
                self.entries.push(entry);
                self.index = self.entries.len() - 1;
            }
        }
        ::log::debug!("History replace {}", url);
    }

    fn go(&mut self, delta: isize) -> Option<Traversal> {
        if delta == 0 {
            return None;
        }
        let target = self.index.checked_add_signed(delta)?;
        let entry = self.entries.get(target)?;
        self.index = target;

        ::log::debug!("History traversal by {} to {}", delta, entry.url);
        Some(Traversal {
            state: entry.state.as_ref().and_then(PageState::from_value),
            url: entry.url.clone(),
        })
    }

    fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    fn state(title: &str) -> PageState {
        PageState::new(title, format!("<p>{}</p>", title), None)
    }

    #[test]
    fn test_initial_entry_has_no_state() {
        let history = SessionHistory::new(url("/"));

        assert_eq!(history.len(), 1);
        assert_eq!(history.current_state(), None);
        assert!(history.is_supported());
        assert!(!SessionHistory::unsupported(url("/")).is_supported());
    }

    #[test]
    fn test_replace_then_push() {
        let mut history = SessionHistory::new(url("/"));
        history.replace(&state("Home"), "Home", &url("/"));
        history.push(&state("About"), "About", &url("/about"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.index(), 1);
        assert_eq!(history.current_state(), Some(state("About")));
        assert_eq!(history.entries()[0].title, "Home");
    }

    #[test]
    fn test_traversal_yields_stored_state() {
        let mut history = SessionHistory::new(url("/"));
        history.replace(&state("Home"), "Home", &url("/"));
        history.push(&state("About"), "About", &url("/about"));

        let back = history.go(-1).unwrap();
        assert_eq!(back.state, Some(state("Home")));
        assert_eq!(back.url, url("/"));

        let forward = history.go(1).unwrap();
        assert_eq!(forward.state, Some(state("About")));
    }

    #[test]
    fn test_traversal_out_of_range() {
        let mut history = SessionHistory::new(url("/"));

        assert_eq!(history.go(-1), None);
        assert_eq!(history.go(1), None);
        assert_eq!(history.go(0), None);
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut history = SessionHistory::new(url("/"));
        history.push(&state("A"), "A", &url("/a"));
        history.push(&state("B"), "B", &url("/b"));
        history.go(-2).unwrap();
        history.push(&state("C"), "C", &url("/c"));

        let urls: Vec<_> = history.entries().iter().map(|e| e.url.path()).collect();
        assert_eq!(urls, vec!["/", "/c"]);
    }

    #[test]
    fn test_traversal_to_untracked_entry() {
        let mut history = SessionHistory::new(url("/"));
        history.push(&state("A"), "A", &url("/a"));

        let back = history.go(-1).unwrap();
        assert_eq!(back.state, None);
    }
}
