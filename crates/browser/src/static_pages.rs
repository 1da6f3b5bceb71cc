use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::session::{selector_present, Browser, BrowserError, BrowserSession, Navigation};

/// Serves canned HTML keyed by URL and records every navigation. Used for offline runs and
/// tests.
#[derive(Default, Clone)]
pub struct StaticBrowser {
    pages: Arc<HashMap<String, String>>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl StaticBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), html.to_string());
        self
    }

    /// URLs navigated to so far, across all sessions, in order.
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    fn lookup(&self, url: &str) -> Option<&String> {
        self.pages.get(url).or_else(|| {
            let without_query = url.split('?').next().unwrap_or(url);
            self.pages.get(without_query)
        })
    }
}

#[async_trait]
impl Browser for StaticBrowser {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        Ok(Box::new(StaticSession {
            browser: self.clone(),
            html: String::new(),
        }))
    }
}

struct StaticSession {
    browser: StaticBrowser,
    html: String,
}

#[async_trait]
impl BrowserSession for StaticSession {
    async fn goto(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
    ) -> Result<Navigation, BrowserError> {
        if let Ok(mut visits) = self.browser.visits.lock() {
            visits.push(url.to_string());
        }

        let html = self
            .browser
            .lookup(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })?;

        let selector_found = wait_for.map(|selector| selector_present(&html, selector));
        self.html = html;

        Ok(Navigation {
            final_url: url.to_string(),
            status: Some(200),
            selector_found,
        })
    }

    fn content(&self) -> &str {
        &self.html
    }
}
