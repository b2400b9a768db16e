use scraper::{ElementRef, Html, Selector};

/// Parses markup as a document; fragments are wrapped by the parser
pub fn parse(markup: &str) -> Html {
    Html::parse_document(markup)
}

/// Returns the first element matching `selector`
pub fn first<'a>(doc: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    doc.select(selector).next()
}

/// Serialized children of the first match, without the element's own tag
pub fn inner_html(doc: &Html, selector: &Selector) -> Option<String> {
    first(doc, selector).map(|e| e.inner_html())
}

/// Value of `name` on the first match
pub fn attr(doc: &Html, selector: &Selector, name: &str) -> Option<String> {
    first(doc, selector)
        .and_then(|e| e.value().attr(name))
        .map(|s| s.to_string())
}

/// Text of the first match with runs of whitespace collapsed and the ends
/// trimmed, which is how browsers compute `document.title`
pub fn text(doc: &Html, selector: &Selector) -> Option<String> {
    first(doc, selector).map(|e| {
        e.text()
            .collect::<Vec<_>>()
            .join("")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    })
}

/// Parses a markup fragment and only extracts link targets
pub fn parse_links_only(fragment: &str) -> Vec<String> {
    let doc = Html::parse_fragment(fragment);

    let link_selector = Selector::parse("a[href]").unwrap();
    let links = doc
        .select(&link_selector)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.to_string())
        .collect::<Vec<String>>();

    ::log::trace!("Found {} links in fragment", links.len());
    links
}
