use log::{debug, warn};
use scraper::{ElementRef, Html, Node};
use std::fmt;
use std::sync::Arc;

use crate::session::Browser;

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Text of a page, or the reason it could not be loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Text(String),
    Unavailable { url: String, reason: String },
}

impl PageContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            PageContent::Text(text) => Some(text),
            PageContent::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PageContent::Text(_))
    }
}

/// `Unavailable` renders as a fixed diagnostic naming the URL, which is what the model sees.
impl fmt::Display for PageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageContent::Text(text) => f.write_str(text),
            PageContent::Unavailable { url, .. } => write!(
                f,
                "During link search an error occurred, check the link {url} and try again"
            ),
        }
    }
}

/// Loads pages in fresh sessions and reduces them to normalized text.
#[derive(Clone)]
pub struct PageExtractor {
    browser: Arc<dyn Browser>,
}

impl PageExtractor {
    pub fn new(browser: Arc<dyn Browser>) -> Self {
        Self { browser }
    }

    pub async fn fetch_text(&self, url: &str) -> PageContent {
        let unavailable = |reason: String| {
            warn!("Failed to load {}: {}", url, reason);
            PageContent::Unavailable {
                url: url.to_string(),
                reason,
            }
        };

        let mut session = match self.browser.new_session().await {
            Ok(session) => session,
            Err(e) => return unavailable(e.to_string()),
        };

        let navigation = match session.goto(url, None).await {
            Ok(navigation) => navigation,
            Err(e) => return unavailable(e.to_string()),
        };
        if let Some(status) = navigation.status.filter(|status| *status >= 400) {
            warn!("{} answered with status {}", url, status);
        }

        let text = normalize_text(&html_to_text(session.content()));
        debug!("Extracted {} characters from {}", text.len(), url);
        PageContent::Text(text)
    }
}

/// Visible text of an HTML document, one space between text nodes.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if !SKIPPED_ELEMENTS.contains(&el.name()) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Reduces text to single-spaced printable ASCII. Repeated until nothing changes, so
/// `normalize_text(normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    let mut current = normalize_once(text);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let decoded = decode_entities(&collapsed);
    let straightened = straighten_quotes(&decoded);
    let printable: String = straightened
        .chars()
        .filter(|c| !matches!(*c as u32, 0x00..=0x1F | 0x7F))
        .filter(|c| matches!(*c as u32, 0x20..=0x7E))
        .collect();
    collapse_whitespace(&printable)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn straighten_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}', '\u{201E}'], "\"")
        .replace(['\u{2018}', '\u{2019}', '\u{201A}'], "'")
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match candidate
            .find(';')
            .filter(|end| *end <= 12)
            .and_then(|end| decode_entity(&candidate[1..end]).map(|c| (c, end)))
        {
            Some((decoded, end)) => {
                out.push(decoded);
                rest = &candidate[end + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        _ => return None,
    };
    Some(decoded)
}
