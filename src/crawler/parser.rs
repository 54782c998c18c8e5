//! HTML parser for extracting mirrorable references
//!
//! Four element classes are scanned, in this order:
//! - `<a href="...">`
//! - `<link rel="stylesheet" href="...">`
//! - `<script src="...">`
//! - `<img src="...">`
//!
//! References are returned raw (possibly relative) in document order per
//! class. Duplicates are kept; deduplication happens when they are resolved
//! and enqueued. Inline frames, CSS and JS bodies are never inspected.

use scraper::{Html, Selector};

/// Selector and attribute pairs scanned by [`extract_links`], in scan order
const LINK_SOURCES: &[(&str, &str)] = &[
    ("a[href]", "href"),
    (r#"link[rel~="stylesheet"][href]"#, "href"),
    ("script[src]", "src"),
    ("img[src]", "src"),
];

/// Parses an HTML document
pub fn parse_html(html: &str) -> Html {
    Html::parse_document(html)
}

/// Extracts raw link references from a parsed document
///
/// Elements missing the relevant attribute are skipped and blank values
/// are dropped.
///
/// # Example
///
/// ```
/// use site_mirror::crawler::{extract_links, parse_html};
///
/// let document = parse_html(r#"<a href="/next">Next</a><img src="cover.jpg">"#);
/// assert_eq!(extract_links(&document), vec!["/next", "cover.jpg"]);
/// ```
pub fn extract_links(document: &Html) -> Vec<String> {
    let mut links = Vec::new();

    for (selector, attribute) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            tracing::error!("Invalid built-in selector: {}", selector);
            continue;
        };

        links.extend(
            document
                .select(&selector)
                .filter_map(|element| element.value().attr(attribute))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        );
    }

    links
}

/// Convenience function parsing `html` and returning its link references
pub fn extract_links_from_html(html: &str) -> Vec<String> {
    extract_links(&parse_html(html))
}
