//! Visible-text extraction from HTML pages

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::domain::DomainError;

static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<sup\b[^>]*>.*?</sup>").unwrap());

const SKIPPED: &[&str] = &["script", "style", "noscript", "head", "sup"];

const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "h1", "h2", "h3", "h4", "h5", "h6", "br", "li", "tr",
    "td", "th", "dd", "dt",
];

pub fn parse_selector(selector: &str) -> Result<Selector, DomainError> {
    Selector::parse(selector)
        .map_err(|e| DomainError::configuration(format!("Invalid CSS selector '{}': {:?}", selector, e)))
}

/// Text of every element matching `selector`, footnote markers removed
///
/// Returns `None` when nothing matches, and the body text is then the
/// caller's fallback.
pub fn select_text(html: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(&FOOTNOTE.replace_all(html, ""));

    let parts: Vec<String> = document
        .select(selector)
        .map(|el| tidy(&element_text(&el)))
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Text of the whole `<body>`
pub fn body_text(html: &str) -> String {
    let document = Html::parse_document(&FOOTNOTE.replace_all(html, ""));
    let text = match Selector::parse("body").ok().and_then(|s| document.select(&s).next()) {
        Some(body) => element_text(&body),
        None => document.root_element().text().collect(),
    };
    tidy(&text)
}

fn element_text(element: &ElementRef) -> String {
    let mut text = String::new();

    for node in element.children() {
        if let Some(el) = ElementRef::wrap(node) {
            let tag = el.value().name();
            if SKIPPED.contains(&tag) {
                continue;
            }

            let block = BLOCKS.contains(&tag);
            if block && !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&element_text(&el));
            if block {
                text.push('\n');
            }
        } else if let Some(t) = node.value().as_text() {
            text.push_str(t);
        }
    }

    text
}

/// Trim lines, collapse inner whitespace and drop empty lines
fn tidy(text: &str) -> String {
    text.lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
