//! Run metadata scraped from a report: the run name assigned in a script and the
//! pipeline version printed in the page text.

use regex::Regex;
use scraper::ElementRef;
use scraper::Html;
use scraper::Node;
use scraper::Selector;

/// Script assignment carrying the run name, e.g. `run_name = ['RUN_42'];`
pub const RUN_NAME_PATTERN: &str = r"run_name\s*=\s*\['(.*?)'\];";

/// Visible text announcing the pipeline version, e.g. `Pipeline Version: v2.1.0-rc1`
pub const PIPELINE_VERSION_PATTERN: &str = r"Pipeline Version[:\s]*([vV]?[\d\.]+[\w\-]*)";

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "template", "noscript"];

/// Finds the run name in a piece of script text.
pub fn run_name(text: &str) -> Option<String> {
    first_capture(&Regex::new(RUN_NAME_PATTERN).expect("Hardcode regex pattern"), text)
}

/// Finds the pipeline version in a piece of text.
pub fn pipeline_version(text: &str) -> Option<String> {
    first_capture(&Regex::new(PIPELINE_VERSION_PATTERN).expect("Hardcode regex pattern"), text)
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)?
        .get(1)
        .map(|capture| capture.as_str().to_owned())
}

/// Scans `<script>` elements in document order; the first one assigning a run name wins.
pub(crate) fn find_run_name(document: &Html) -> Option<String> {
    let pattern = Regex::new(RUN_NAME_PATTERN).expect("Hardcode regex pattern");
    let scripts = Selector::parse("script").expect("Hardcode selector");
    document
        .select(&scripts)
        .find_map(|script| first_capture(&pattern, &script.text().collect::<String>()))
}

/// Scans visible text nodes in document order, each trimmed; the first match wins.
pub(crate) fn find_pipeline_version(document: &Html) -> Option<String> {
    let pattern = Regex::new(PIPELINE_VERSION_PATTERN).expect("Hardcode regex pattern");
    find_in_visible_text(document.root_element(), &pattern)
}

fn find_in_visible_text(element: ElementRef, pattern: &Regex) -> Option<String> {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    if let Some(version) = first_capture(pattern, text) {
                        return Some(version);
                    }
                }
            }
            Node::Element(inner) if HIDDEN_ELEMENTS.contains(&inner.name()) => (),
            Node::Element(_) => {
                let version = ElementRef::wrap(child)
                    .and_then(|inner| find_in_visible_text(inner, pattern));
                if version.is_some() {
                    return version;
                }
            }
            _ => (),
        }
    }
    None
}
