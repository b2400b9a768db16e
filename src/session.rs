use crate::history::{NavigationStack, Traversal};
use crate::state::PageState;
use crate::transition::ViewTransitioner;
use std::sync::Arc;
use url::Url;

/// Owns the pairing between what is on screen and what the navigation
/// stack remembers.
///
/// The three `seed_initial`, `apply_forward` and `apply_traversal` methods
/// are the only places either side changes, and each changes both (or, for
/// seeding, records what the browser already shows). The stack is always
/// written after the render has applied the new state to the document.
pub struct NavigationSession<H> {
    history: H,
    transitioner: Arc<ViewTransitioner>,
    current: Option<PageState>,
    location: Url,
}

impl<H: NavigationStack> NavigationSession<H> {
    pub fn new(history: H, transitioner: Arc<ViewTransitioner>, location: Url) -> Self {
        Self {
            history,
            transitioner,
            current: None,
            location,
        }
    }

    /// Record the state of the page as loaded in the current stack entry.
    /// Nothing is rendered; the document already shows this state.
    pub fn seed_initial(&mut self, state: PageState, url: &Url) {
        self.history.replace(&state, state.title(), url);
        ::log::info!("Seeded history with {:?} at {}", state.title(), url);
        self.location = url.clone();
        self.current = Some(state);
    }

    /// Show a freshly fetched state and push it as a new stack entry
    pub async fn apply_forward(&mut self, state: PageState, url: &Url) {
        self.transitioner.render(Some(&state), false).await;
        self.history.push(&state, state.title(), url);
        ::log::info!("Navigated to {:?} at {}", state.title(), url);
        self.location = url.clone();
        self.current = Some(state);
    }

    /// Move along the stack by `delta` and show the entry's state in reverse.
    ///
    /// Returns `None` when the stack has no entry there. An entry without
    /// state moves the location but leaves the document as it is.
    pub async fn apply_traversal(&mut self, delta: isize) -> Option<Traversal> {
        let traversal = self.history.go(delta)?;
        self.transitioner.render(traversal.state.as_ref(), true).await;

        self.location = traversal.url.clone();
        match &traversal.state {
            Some(state) => {
                ::log::info!("Traversed to {:?} at {}", state.title(), traversal.url);
                self.current = Some(state.clone());
            }
            None => {
                ::log::warn!("Traversed to {} which carries no state", traversal.url);
            }
        }
        Some(traversal)
    }

    /// The state currently on screen, once seeded
    pub fn current(&self) -> Option<&PageState> {
        self.current.as_ref()
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn history(&self) -> &H {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::LiveDocument;
    use crate::history::SessionHistory;
    use crate::transition::RenderMode;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    fn session() -> (NavigationSession<SessionHistory>, Arc<Mutex<LiveDocument>>) {
        let home = PageState::new("Home", "<p>hi</p>", None);
        let document = Arc::new(Mutex::new(LiveDocument::from_state(&home)));
        let transitioner = Arc::new(ViewTransitioner::new(
            Arc::clone(&document),
            RenderMode::Direct,
            Duration::ZERO,
            Duration::ZERO,
        ));
        let mut session = NavigationSession::new(SessionHistory::new(url("/")), transitioner, url("/"));
        session.seed_initial(home, &url("/"));
        (session, document)
    }

    #[tokio::test]
    async fn test_forward_pairs_document_and_stack() {
        let (mut session, document) = session();
        let about = PageState::new("About", "<p>bio</p>", None);

        session.apply_forward(about.clone(), &url("/about")).await;

        assert_eq!(session.history().current_state(), Some(about.clone()));
        assert_eq!(session.current(), Some(&about));
        assert_eq!(session.location(), &url("/about"));
        assert_eq!(document.lock().await.live().content(), "<p>bio</p>");
    }

    #[tokio::test]
    async fn test_traversal_out_of_range_changes_nothing() {
        let (mut session, document) = session();
        let before = document.lock().await.snapshot();

        assert!(session.apply_traversal(-1).await.is_none());
        assert_eq!(document.lock().await.snapshot(), before);
        assert_eq!(session.location(), &url("/"));
    }

    #[tokio::test]
    async fn test_traversal_to_stateless_entry_keeps_document() {
        let home = PageState::new("Home", "<p>hi</p>", None);
        let document = Arc::new(Mutex::new(LiveDocument::from_state(&home)));
        let transitioner = Arc::new(ViewTransitioner::new(
            Arc::clone(&document),
            RenderMode::Direct,
            Duration::ZERO,
            Duration::ZERO,
        ));
        // Never seeded, so the first entry predates state tracking
        let mut session = NavigationSession::new(SessionHistory::new(url("/")), transitioner, url("/"));
        session
            .apply_forward(PageState::new("About", "<p>bio</p>", None), &url("/about"))
            .await;

        let traversal = session.apply_traversal(-1).await.unwrap();

        assert_eq!(traversal.state, None);
        assert_eq!(session.location(), &url("/"));
        assert_eq!(document.lock().await.live().content(), "<p>bio</p>");
    }
}
