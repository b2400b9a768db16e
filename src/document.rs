use crate::state::PageState;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Notify;

/// Identity of a wrapper container, stable across clones of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

/// A visual wrapper holding one content region and one media region
#[derive(Debug, Clone)]
pub struct Container {
    id: ContainerId,
    classes: BTreeSet<String>,
    content: String,
    image: Option<String>,
}

impl Container {
    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

/// The live document as seen by the navigator: a title and the wrapper
/// containers in document order.
///
/// Outside of an animated handoff there is exactly one container. During a
/// handoff the leaving container precedes the entering one, and the last
/// container is always the live one.
#[derive(Debug)]
pub struct LiveDocument {
    title: String,
    containers: Vec<Container>,
    next_id: u64,
    signals: HashMap<ContainerId, Arc<Notify>>,
}

impl LiveDocument {
    /// The document as the browser loaded it
    pub fn from_state(state: &PageState) -> Self {
        Self {
            title: state.title().to_string(),
            containers: vec![Container {
                id: ContainerId(0),
                classes: BTreeSet::new(),
                content: state.content().to_string(),
                image: state.image().map(str::to_string),
            }],
            next_id: 1,
            signals: HashMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    /// The container currently showing the page
    pub fn live(&self) -> &Container {
        self.containers
            .last()
            .expect("document always keeps one container")
    }

    /// Replace a container's content markup and media reference
    pub fn set_regions(&mut self, id: ContainerId, content: &str, image: Option<&str>) -> bool {
        match self.container_mut(id) {
            Some(container) => {
                container.content = content.to_string();
                container.image = image.map(str::to_string);
                true
            }
            None => false,
        }
    }

    /// Clone a container and insert the clone right after it
    pub fn duplicate(&mut self, id: ContainerId) -> Option<ContainerId> {
        let position = self.containers.iter().position(|c| c.id == id)?;
        let mut clone = self.containers[position].clone();
        clone.id = ContainerId(self.next_id);
        self.next_id += 1;

        let clone_id = clone.id;
        self.containers.insert(position + 1, clone);
        Some(clone_id)
    }

    pub fn add_class(&mut self, id: ContainerId, class: &str) -> bool {
        self.container_mut(id)
            .map(|c| c.classes.insert(class.to_string()))
            .unwrap_or(false)
    }

    pub fn remove_class(&mut self, id: ContainerId, class: &str) -> bool {
        self.container_mut(id)
            .map(|c| c.classes.remove(class))
            .unwrap_or(false)
    }

    /// Detach a container. The last remaining container is never removed.
    pub fn remove_container(&mut self, id: ContainerId) -> bool {
        if self.containers.len() <= 1 {
            return false;
        }
        let before = self.containers.len();
        self.containers.retain(|c| c.id != id);
        self.signals.remove(&id);
        self.containers.len() != before
    }

    /// Start listening for the container's next transition end.
    ///
    /// Any earlier signal for the container is dropped along with the
    /// notifications it collected.
    pub fn arm_transition(&mut self, id: ContainerId) -> Arc<Notify> {
        let signal = Arc::new(Notify::new());
        self.signals.insert(id, Arc::clone(&signal));
        signal
    }

    /// The armed signal of a container, if any
    pub fn transition_signal(&self, id: ContainerId) -> Option<Arc<Notify>> {
        self.signals.get(&id).cloned()
    }

    /// Platform notification that a container finished its transition.
    ///
    /// Only armed containers take notice. A notification that arrives after
    /// arming but before anyone waits is kept until the wait.
    pub fn transition_end(&mut self, id: ContainerId) {
        match self.signals.get(&id) {
            Some(signal) => signal.notify_one(),
            None => ::log::trace!("Ignoring transition end for unarmed container {:?}", id),
        }
    }

    /// Observable state of the document, without container identities
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            title: self.title.clone(),
            regions: self
                .containers
                .iter()
                .map(|c| RegionSnapshot {
                    classes: c.classes.iter().cloned().collect(),
                    content: c.content.clone(),
                    image: c.image.clone(),
                })
                .collect(),
        }
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSnapshot {
    pub title: String,
    pub regions: Vec<RegionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSnapshot {
    pub classes: Vec<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn home() -> LiveDocument {
        LiveDocument::from_state(&PageState::new("Home", "<p>hi</p>", None))
    }

    #[test]
    fn test_loaded_document_has_one_container() {
        let doc = home();

        assert_eq!(doc.title(), "Home");
        assert_eq!(doc.containers().len(), 1);
        assert_eq!(doc.live().content(), "<p>hi</p>");
        assert_eq!(doc.live().image(), None);
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let mut doc = home();
        let original = doc.live().id();
        let clone = doc.duplicate(original).unwrap();

        assert_ne!(clone, original);
        assert_eq!(doc.containers()[0].id(), original);
        assert_eq!(doc.live().id(), clone);
        assert_eq!(doc.live().content(), "<p>hi</p>");
    }

    #[test]
    fn test_last_container_is_never_removed() {
        let mut doc = home();
        let original = doc.live().id();
        let clone = doc.duplicate(original).unwrap();

        assert!(doc.remove_container(original));
        assert!(!doc.remove_container(clone));
        assert_eq!(doc.live().id(), clone);
    }

    #[test]
    fn test_classes_and_regions() {
        let mut doc = home();
        let id = doc.live().id();

        assert!(doc.add_class(id, "transition-in"));
        assert!(doc.live().has_class("transition-in"));
        assert!(doc.remove_class(id, "transition-in"));
        assert!(!doc.remove_class(id, "transition-in"));

        assert!(doc.set_regions(id, "<p>bio</p>", Some("/img.jpg")));
        let snapshot = doc.snapshot();
        assert_eq!(snapshot.regions[0].content, "<p>bio</p>");
        assert_eq!(snapshot.regions[0].image.as_deref(), Some("/img.jpg"));
    }

    #[tokio::test]
    async fn test_early_transition_end_is_kept_once_armed() {
        let mut doc = home();
        let id = doc.live().id();
        let signal = doc.arm_transition(id);
        doc.transition_end(id);

        let waited = tokio::time::timeout(Duration::from_millis(100), signal.notified()).await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn test_transition_end_before_arming_is_ignored() {
        let mut doc = home();
        let id = doc.live().id();
        doc.transition_end(id);
        assert!(doc.transition_signal(id).is_none());

        let signal = doc.arm_transition(id);
        let waited = tokio::time::timeout(Duration::from_millis(50), signal.notified()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_rearming_drops_earlier_notifications() {
        let mut doc = home();
        let id = doc.live().id();
        doc.arm_transition(id);
        doc.transition_end(id);

        let signal = doc.arm_transition(id);
        let waited = tokio::time::timeout(Duration::from_millis(50), signal.notified()).await;
        assert!(waited.is_err());
    }
}
