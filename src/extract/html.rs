//! Markup stripping

use scraper::{Html, Node};

/// Elements whose text never reaches the reader
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text of an HTML document: every visible text node, trimmed and
/// joined with single spaces
pub fn html_to_text(content: &str) -> String {
    let document = Html::parse_document(content);

    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .map_or(false, |name| SKIPPED_ELEMENTS.contains(&name));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    normalize_whitespace(&parts.join(" "))
}
