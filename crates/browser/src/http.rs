use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::session::{selector_present, Browser, BrowserError, BrowserSession, Navigation};
use agent_core::config::BrowserConfig;

/// Plain HTTP backend: a browser identity and a cookie jar per session, no script execution.
pub struct HttpBrowser {
    user_agent: String,
    page_timeout: Duration,
}

impl HttpBrowser {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.page_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Box::new(HttpSession {
            client,
            page_timeout: self.page_timeout,
            html: String::new(),
        }))
    }
}

struct HttpSession {
    client: Client,
    page_timeout: Duration,
    html: String,
}

impl HttpSession {
    fn map_error(&self, url: &str, error: reqwest::Error) -> BrowserError {
        if error.is_timeout() {
            BrowserError::Timeout {
                url: url.to_string(),
                secs: self.page_timeout.as_secs(),
            }
        } else {
            BrowserError::Navigation {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn goto(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
    ) -> Result<Navigation, BrowserError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|_| BrowserError::InvalidUrl(url.to_string()))?;

        log::debug!("GET {}", parsed);
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| self.map_error(url, e))?;

        // Without script execution the DOM never changes after load, so the wait is a
        // single presence check.
        let selector_found = wait_for.map(|selector| selector_present(&html, selector));
        self.html = html;

        Ok(Navigation {
            final_url,
            status: Some(status),
            selector_found,
        })
    }

    fn content(&self) -> &str {
        &self.html
    }
}
