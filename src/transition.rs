use crate::config::NavigatorConfig;
use crate::document::{ContainerId, LiveDocument};
use crate::state::PageState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Class marking a container that animates into view
pub const TRANSITION_IN: &str = "transition-in";

/// Class marking a container that animates out of view
pub const TRANSITION_OUT: &str = "transition-out";

/// The live document shared between the transitioner and its handoff tasks
pub type SharedDocument = Arc<Mutex<LiveDocument>>;

/// How a state is applied to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Overwrite the live regions in place
    Direct,
    /// Hand off from a leaving container to an entering duplicate
    #[default]
    Animated,
}

/// How an animated handoff finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffEnd {
    /// The leaving container reported the end of its transition
    Signalled,
    /// No transition end arrived in time; the leaving container was removed anyway
    TimedOut,
    /// A newer render settled this handoff early
    Superseded,
}

struct PendingHandoff {
    cancel: CancellationToken,
    task: JoinHandle<HandoffEnd>,
}

/// Applies page states to the live document.
///
/// Knows nothing about history: it is handed a state and a direction and
/// only touches the document and its own timers. A render that starts while
/// a previous handoff is still pending first settles that handoff, so the
/// document never holds more than one leaving container.
pub struct ViewTransitioner {
    document: SharedDocument,
    mode: RenderMode,
    settle_delay: Duration,
    end_timeout: Duration,
    pending: Mutex<Option<PendingHandoff>>,
}

impl ViewTransitioner {
    pub fn new(
        document: SharedDocument,
        mode: RenderMode,
        settle_delay: Duration,
        end_timeout: Duration,
    ) -> Self {
        Self {
            document,
            mode,
            settle_delay,
            end_timeout,
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(document: SharedDocument, config: &NavigatorConfig) -> Self {
        Self::new(
            document,
            config.render_mode,
            config.settle_delay(),
            config.transition_timeout(),
        )
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Show `state`, animating backwards when `reverse` is set.
    ///
    /// `None` is ignored; platforms emit a traversal without state before
    /// any state was recorded. Returns once the document shows the new
    /// state; an animated handoff keeps running in the background.
    pub async fn render(&self, state: Option<&PageState>, reverse: bool) {
        let Some(state) = state else {
            ::log::debug!("Traversal without state, nothing to render");
            return;
        };

        self.settle_pending().await;

        match self.mode {
            RenderMode::Direct => self.replace(state).await,
            RenderMode::Animated => self.hand_off(state, reverse).await,
        }
    }

    /// Wait for the pending handoff, if any, to finish
    pub async fn settled(&self) -> Option<HandoffEnd> {
        let pending = self.pending.lock().await.take()?;
        join(pending.task).await
    }

    async fn settle_pending(&self) {
        let pending = self.pending.lock().await.take();
        if let Some(pending) = pending {
            pending.cancel.cancel();
            if let Some(end) = join(pending.task).await {
                ::log::debug!("Previous handoff settled early ({:?})", end);
            }
        }
    }

    async fn replace(&self, state: &PageState) {
        let mut doc = self.document.lock().await;
        doc.set_title(state.title());
        let live = doc.live().id();
        doc.set_regions(live, state.content(), state.image());
        ::log::debug!("Rendered {:?} in place", state.title());
    }

    async fn hand_off(&self, state: &PageState, reverse: bool) {
        let (leaving_class, entering_class) = if reverse {
            (TRANSITION_IN, TRANSITION_OUT)
        } else {
            (TRANSITION_OUT, TRANSITION_IN)
        };

        let (leaving, entering, signal) = {
            let mut doc = self.document.lock().await;
            doc.set_title(state.title());

            let leaving = doc.live().id();
            let Some(entering) = doc.duplicate(leaving) else {
                ::log::warn!("Live container vanished, rendering in place");
                drop(doc);
                return self.replace(state).await;
            };
            doc.set_regions(entering, state.content(), state.image());
            doc.add_class(leaving, leaving_class);
            doc.add_class(entering, entering_class);
            // Ends seen by the leaving container before this point are stale
            let signal = doc.arm_transition(leaving);
            (leaving, entering, signal)
        };

        ::log::debug!(
            "Handing off {:?} -> {:?} for {:?} (reverse: {})",
            leaving,
            entering,
            state.title(),
            reverse
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_handoff(
            Arc::clone(&self.document),
            leaving,
            entering,
            entering_class,
            signal,
            self.settle_delay,
            self.end_timeout,
            cancel.clone(),
        ));

        *self.pending.lock().await = Some(PendingHandoff { cancel, task });
    }
}

/// Settle the entering container after the delay, then detach the leaving
/// container on its transition end or when the timeout runs out
async fn run_handoff(
    document: SharedDocument,
    leaving: ContainerId,
    entering: ContainerId,
    entering_class: &'static str,
    signal: Arc<Notify>,
    settle_delay: Duration,
    end_timeout: Duration,
    cancel: CancellationToken,
) -> HandoffEnd {
    let superseded = tokio::select! {
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep(settle_delay) => false,
    };

    document.lock().await.remove_class(entering, entering_class);

    let end = if superseded {
        HandoffEnd::Superseded
    } else {
        tokio::select! {
            _ = cancel.cancelled() => HandoffEnd::Superseded,
            waited = tokio::time::timeout(end_timeout, signal.notified()) => match waited {
                Ok(()) => HandoffEnd::Signalled,
                Err(_) => {
                    ::log::warn!(
                        "No transition end for {:?} after {:?}, removing it",
                        leaving,
                        end_timeout
                    );
                    HandoffEnd::TimedOut
                }
            },
        }
    };

    document.lock().await.remove_container(leaving);
    ::log::trace!("Handoff from {:?} finished: {:?}", leaving, end);
    end
}

async fn join(task: JoinHandle<HandoffEnd>) -> Option<HandoffEnd> {
    match task.await {
        Ok(end) => Some(end),
        Err(e) => {
            ::log::error!("Handoff task failed: {}", e);
            None
        }
    }
}
