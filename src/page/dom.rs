//! CSS selector resolution over page markup.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::types::Element;

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(selector, error = ?e, "Invalid CSS selector");
            None
        }
    }
}

fn first_match<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(selector)?;
    document.select(&selector).next()
}

/// Trimmed text content of the first element matching `selector`.
pub fn select_text(markup: &str, selector: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let element = first_match(&document, selector)?;
    Some(element.text().collect::<String>().trim().to_string())
}

/// Resolve an interactive control, noting whether it carries `disabled`.
pub fn select_element(markup: &str, selector: &str) -> Option<Element> {
    let document = Html::parse_document(markup);
    let element = first_match(&document, selector)?;
    let disabled = element.value().attr("disabled").is_some();
    Some(Element::new(selector, disabled))
}

/// Whether anything matches `selector`.
pub fn exists(markup: &str, selector: &str) -> bool {
    let document = Html::parse_document(markup);
    first_match(&document, selector).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
