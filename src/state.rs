use serde::{Deserialize, Serialize};

/// The renderable essentials of a page: its title, the markup of its
/// content region and the reference of its media region.
///
/// Fields are private so a state cannot change after extraction; the
/// navigation stack stores exactly what was rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    title: String,

    content: String,

    /// Absent stays absent through serialization, it never becomes `""`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl PageState {
    /// Create a new page state
    pub fn new(title: impl Into<String>, content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Encode as the opaque value a history entry carries
    pub fn to_value(&self) -> serde_json::Value {
        // Serializing a struct of strings cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Decode a history entry's value, `None` if it is not a page state
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(state) => Some(state),
            Err(e) => {
                ::log::debug!("History entry does not hold a page state: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_image_is_not_serialized() {
        let state = PageState::new("Home", "<p>hi</p>", None);
        let value = state.to_value();

        assert_eq!(value, json!({ "title": "Home", "content": "<p>hi</p>" }));
        assert_eq!(PageState::from_value(&value), Some(state));
    }

    #[test]
    fn test_null_image_decodes_as_absent() {
        let value = json!({ "title": "About", "content": "", "image": null });
        let state = PageState::from_value(&value).unwrap();
        assert_eq!(state.image(), None);
    }

    #[test]
    fn test_empty_image_stays_present() {
        let state = PageState::new("About", "", Some(String::new()));
        let decoded = PageState::from_value(&state.to_value()).unwrap();
        assert_eq!(decoded.image(), Some(""));
    }

    #[test]
    fn test_foreign_value_is_not_a_state() {
        assert_eq!(PageState::from_value(&json!({ "scroll": 120 })), None);
        assert_eq!(PageState::from_value(&serde_json::Value::Null), None);
    }
}
