//! HTML scanner for a page title and link-like attribute values
//!
//! Links are returned exactly as written: resolving them needs the referring
//! page's URL, and deduplicating them needs the crawl's tables, so both are
//! left to the coordinator.

use scraper::{ElementRef, Html, Selector};

/// Attributes whose values are treated as references
const LINK_ATTRIBUTES: &[&str] = &["src", "href", "xhref"];

/// Title and raw links scanned from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Trimmed text of the first `<title>`, empty if there is none
    pub title: String,

    /// Every `src`, `href` and `xhref` value in document order
    pub links: Vec<String>,
}

/// Extracts the title and raw links from HTML text
///
/// Attribute names are matched case-insensitively (the HTML parser folds them
/// to lowercase). Empty values are skipped; nothing else is filtered.
///
/// # Example
///
/// ```
/// use sitegraph::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Extracts every link-like attribute value in document order
fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("[src], [href], [xhref]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .flat_map(link_values)
        .collect()
}

/// Link values of one element, in the order its attributes are written
fn link_values(element: ElementRef<'_>) -> Vec<String> {
    element
        .value()
        .attrs()
        .filter(|(name, _)| LINK_ATTRIBUTES.contains(name))
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(_, value)| value.to_string())
        .collect()
}
