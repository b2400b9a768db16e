use crate::config::NavigatorConfig;
use crate::document::{DocumentSnapshot, LiveDocument};
use crate::errors::ConfigError;
use crate::fetchers::Fetch;
use crate::filter::LinkFilter;
use crate::history::NavigationStack;
use crate::parsers::StateExtractor;
use crate::session::NavigationSession;
use crate::state::PageState;
use crate::transition::{HandoffEnd, SharedDocument, ViewTransitioner};
use crate::utils::{lock, resolve_link};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Where the navigator stands with respect to the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The document matches the stack's current entry
    Idle,
    /// A link was activated and its page is being fetched
    Fetching,
    /// A fetch failed and the host was told to navigate natively
    ExternalNavigation,
    /// The stack cannot carry state; the browser handles every link
    Inert,
}

impl Phase {
    fn intercepts(self) -> bool {
        matches!(self, Phase::Idle | Phase::Fetching)
    }
}

/// An activated anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkActivation {
    pub href: String,
}

impl LinkActivation {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// What happened in response to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The default action was not suppressed; the browser follows the link
    Passthrough { href: String },
    /// The page was fetched, rendered and pushed onto the stack
    Rendered { url: Url },
    /// Fetching failed; the host must perform a full navigation to `url`
    FullNavigation { url: Url },
    /// A later navigation or traversal took over before this one finished
    Superseded { url: Url },
    /// The stack moved to `url`; `rendered` is false for entries without state
    Traversed { url: Url, rendered: bool },
    /// Nothing to do
    Ignored,
}

struct Attempt {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Attempts {
    next_id: u64,
    inflight: Option<Attempt>,
}

/// Turns link activations and stack traversals into in-page navigations.
///
/// Only one navigation attempt is live at a time: activating a link or
/// traversing the stack cancels whatever attempt is still fetching, so a
/// slow response can never overwrite a newer page.
pub struct Navigator<F, H> {
    fetcher: F,
    extractor: StateExtractor,
    filter: LinkFilter,
    fetch_timeout: Duration,
    document: SharedDocument,
    transitioner: Arc<ViewTransitioner>,
    session: Mutex<NavigationSession<H>>,
    phase: std::sync::Mutex<Phase>,
    attempts: std::sync::Mutex<Attempts>,
}

impl<F: Fetch, H: NavigationStack> Navigator<F, H> {
    /// Take over a loaded page.
    ///
    /// The live document is built from `markup` as the browser shows it and
    /// the stack's current entry is replaced with the extracted state. No
    /// render happens. When `history` is unsupported the navigator is inert.
    pub fn start(
        markup: &str,
        url: Url,
        config: &NavigatorConfig,
        fetcher: F,
        history: H,
    ) -> Result<Self, ConfigError> {
        let extractor = StateExtractor::new(&config.regions)?;
        let filter = LinkFilter::new(config.links.clone())?;

        let state = extractor.extract(markup);
        let document: SharedDocument = Arc::new(Mutex::new(LiveDocument::from_state(&state)));
        let transitioner = Arc::new(ViewTransitioner::from_config(
            Arc::clone(&document),
            config,
        ));

        let supported = history.is_supported();
        let mut session = NavigationSession::new(history, Arc::clone(&transitioner), url.clone());
        let phase = if supported {
            session.seed_initial(state, &url);
            Phase::Idle
        } else {
            ::log::info!("Navigation stack unsupported, leaving links to the browser");
            Phase::Inert
        };

        Ok(Self {
            fetcher,
            extractor,
            filter,
            fetch_timeout: config.fetch_timeout(),
            document,
            transitioner,
            session: Mutex::new(session),
            phase: std::sync::Mutex::new(phase),
            attempts: std::sync::Mutex::new(Attempts::default()),
        })
    }

    /// Handle an activated link
    pub async fn activate_link(&self, activation: &LinkActivation) -> NavigationOutcome {
        let passthrough = || NavigationOutcome::Passthrough {
            href: activation.href.clone(),
        };

        if !self.phase().intercepts() {
            return passthrough();
        }

        let base = self.session.lock().await.location().clone();
        let Some(url) = resolve_link(&base, &activation.href) else {
            return passthrough();
        };
        if !self.filter.should_intercept(&url, &base) {
            ::log::debug!("Leaving {} to the browser", url);
            return passthrough();
        }

        let (attempt, token) = self.begin_attempt();
        ::log::info!("Fetching {}", url);

        let fetched = tokio::select! {
            _ = token.cancelled() => None,
            fetched = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&url)) => Some(fetched),
        };
        let fetched = match fetched {
            Some(fetched) if !token.is_cancelled() => fetched,
            _ => {
                ::log::info!("Navigation to {} superseded", url);
                return NavigationOutcome::Superseded { url };
            }
        };

        let markup = match fetched {
            Ok(Ok(markup)) => markup,
            Ok(Err(e)) => {
                ::log::warn!("Fetch failed ({}), falling back to full navigation", e);
                return self.fall_back(attempt, url);
            }
            Err(_) => {
                ::log::warn!(
                    "Fetching {} took longer than {:?}, falling back to full navigation",
                    url,
                    self.fetch_timeout
                );
                return self.fall_back(attempt, url);
            }
        };

        let state = self.extractor.extract(&markup);

        let mut session = self.session.lock().await;
        if token.is_cancelled() {
            ::log::info!("Navigation to {} superseded", url);
            return NavigationOutcome::Superseded { url };
        }
        session.apply_forward(state, &url).await;
        drop(session);

        self.end_attempt(attempt, Phase::Idle);
        NavigationOutcome::Rendered { url }
    }

    /// Handle a traversal of `delta` entries along the stack
    pub async fn traverse(&self, delta: isize) -> NavigationOutcome {
        if !self.phase().intercepts() {
            return NavigationOutcome::Ignored;
        }
        self.cancel_inflight();

        let mut session = self.session.lock().await;
        match session.apply_traversal(delta).await {
            Some(traversal) => NavigationOutcome::Traversed {
                rendered: traversal.state.is_some(),
                url: traversal.url,
            },
            None => {
                ::log::debug!("No history entry {} away", delta);
                NavigationOutcome::Ignored
            }
        }
    }

    pub async fn back(&self) -> NavigationOutcome {
        self.traverse(-1).await
    }

    pub async fn forward(&self) -> NavigationOutcome {
        self.traverse(1).await
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    /// The live document, for platform signals such as transition ends
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub async fn snapshot(&self) -> DocumentSnapshot {
        self.document.lock().await.snapshot()
    }

    /// Wait for a running animated handoff to finish
    pub async fn settled(&self) -> Option<HandoffEnd> {
        self.transitioner.settled().await
    }

    pub async fn current_state(&self) -> Option<PageState> {
        self.session.lock().await.current().cloned()
    }

    pub async fn location(&self) -> Url {
        self.session.lock().await.location().clone()
    }

    /// Link targets in the content currently on screen
    pub async fn links(&self) -> Vec<String> {
        match self.session.lock().await.current() {
            Some(state) => self.extractor.links(state),
            None => Vec::new(),
        }
    }

    /// Read access to the session, e.g. to look at the stack
    pub async fn inspect<R>(&self, f: impl FnOnce(&NavigationSession<H>) -> R) -> R {
        f(&*self.session.lock().await)
    }

    fn set_phase(&self, phase: Phase) {
        let mut current = lock(&self.phase);
        if *current != phase {
            ::log::debug!("Phase {:?} -> {:?}", *current, phase);
            *current = phase;
        }
    }

    /// Start a new attempt, cancelling the one in flight
    fn begin_attempt(&self) -> (u64, CancellationToken) {
        let mut attempts = lock(&self.attempts);
        if let Some(previous) = attempts.inflight.take() {
            previous.token.cancel();
        }
        let id = attempts.next_id;
        attempts.next_id += 1;
        let token = CancellationToken::new();
        attempts.inflight = Some(Attempt {
            id,
            token: token.clone(),
        });
        drop(attempts);

        self.set_phase(Phase::Fetching);
        (id, token)
    }

    /// Retire `attempt` if it is still the live one
    fn end_attempt(&self, attempt: u64, phase: Phase) {
        let mut attempts = lock(&self.attempts);
        if attempts.inflight.as_ref().is_some_and(|a| a.id == attempt) {
            attempts.inflight = None;
            drop(attempts);
            self.set_phase(phase);
        }
    }

    fn cancel_inflight(&self) {
        let previous = lock(&self.attempts).inflight.take();
        if let Some(previous) = previous {
            previous.token.cancel();
            self.set_phase(Phase::Idle);
        }
    }

    fn fall_back(&self, attempt: u64, url: Url) -> NavigationOutcome {
        self.end_attempt(attempt, Phase::ExternalNavigation);
        NavigationOutcome::FullNavigation { url }
    }
}
