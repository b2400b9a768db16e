use crate::config::RegionSelectors;
use crate::parsers::StateExtractor;

#[cfg(test)]
mod tests {
    use super::*;

    const ABOUT: &str = r#"<!DOCTYPE html>
<html>
<head><title>About</title></head>
<body>
  <div class="wrapper">
    <img class="photo" src="/img.jpg">
    <div class="content"><p>bio</p></div>
  </div>
</body>
</html>"#;

    #[test]
    fn test_extract_all_regions() {
        let state = StateExtractor::default().extract(ABOUT);

        assert_eq!(state.title(), "About");
        assert_eq!(state.content(), "<p>bio</p>");
        assert_eq!(state.image(), Some("/img.jpg"));
    }

    #[test]
    fn test_missing_media_is_absent() {
        let markup = "<html><head><title>Home</title></head><body><div class=\"content\"><p>hi</p></div></body></html>";
        let state = StateExtractor::default().extract(markup);

        assert_eq!(state.title(), "Home");
        assert_eq!(state.content(), "<p>hi</p>");
        assert_eq!(state.image(), None);
    }

    #[test]
    fn test_media_without_reference_is_absent() {
        let markup = "<title>T</title><img class=\"photo\"><div class=\"content\"></div>";
        let state = StateExtractor::default().extract(markup);
        assert_eq!(state.image(), None);
    }

    #[test]
    fn test_missing_content_degrades_to_empty() {
        let state = StateExtractor::default().extract("<title>Broken</title><p>stray</p>");

        assert_eq!(state.title(), "Broken");
        assert_eq!(state.content(), "");
    }

    #[test]
    fn test_garbage_input_never_fails() {
        let state = StateExtractor::default().extract("<<<not html at all");

        assert_eq!(state.title(), "");
        assert_eq!(state.content(), "");
        assert_eq!(state.image(), None);
    }

    #[test]
    fn test_first_content_region_wins() {
        let markup = "<title>T</title><div class=\"content\">one</div><div class=\"content\">two</div>";
        let state = StateExtractor::default().extract(markup);
        assert_eq!(state.content(), "one");
    }

    #[test]
    fn test_custom_regions() {
        let regions = RegionSelectors {
            content: "main#body".to_string(),
            media: "video.hero".to_string(),
            media_attr: "poster".to_string(),
            ..RegionSelectors::default()
        };
        let extractor = StateExtractor::new(&regions).unwrap();
        let markup = "<title>Clip</title><video class=\"hero\" poster=\"/p.png\"></video><main id=\"body\"><em>x</em></main>";
        let state = extractor.extract(markup);

        assert_eq!(state.content(), "<em>x</em>");
        assert_eq!(state.image(), Some("/p.png"));
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let regions = RegionSelectors {
            content: "div[".to_string(),
            ..RegionSelectors::default()
        };
        assert!(StateExtractor::new(&regions).is_err());
    }
}
