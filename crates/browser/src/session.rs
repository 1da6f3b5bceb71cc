use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Browser could not be started: {0}")]
    Launch(String),
}

/// Outcome of a single page load.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub final_url: String,
    pub status: Option<u16>,
    /// `None` when no selector was awaited, otherwise whether it appeared in time.
    pub selector_found: Option<bool>,
}

/// Starts isolated sessions. Each session has its own cookies and is released on drop.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url`, optionally waiting (bounded) for `wait_for` to match. HTTP error statuses
    /// are reported through [`Navigation::status`], not as errors.
    async fn goto(&mut self, url: &str, wait_for: Option<&str>)
        -> Result<Navigation, BrowserError>;

    /// HTML of the most recently loaded page.
    fn content(&self) -> &str;
}

/// Whether `selector` matches anything in `html`. An unparsable selector never matches.
pub fn selector_present(html: &str, selector: &str) -> bool {
    let Ok(selector) = scraper::Selector::parse(selector) else {
        return false;
    };
    scraper::Html::parse_document(html)
        .select(&selector)
        .next()
        .is_some()
}
