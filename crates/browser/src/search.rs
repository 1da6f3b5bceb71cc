use log::{info, warn};
use scraper::{Html, Selector};
use std::sync::Arc;

use crate::delay::random_delay;
use crate::session::{Browser, BrowserError, BrowserSession};
use agent_core::config::SearchConfig;

/// Drives a search engine through a browser session and collects the top organic links.
#[derive(Clone)]
pub struct WebSearch {
    browser: Arc<dyn Browser>,
    config: SearchConfig,
}

impl WebSearch {
    pub fn new(browser: Arc<dyn Browser>, config: SearchConfig) -> Self {
        Self { browser, config }
    }

    /// Returns at most `max_results` URLs in result-page order. Throttling by the engine
    /// yields an empty list rather than an error.
    pub async fn search(&self, query: &str) -> Result<Vec<String>, BrowserError> {
        info!("Searching the web for '{}'", query);
        let delays = &self.config.delays;
        let mut session = self.browser.new_session().await?;

        session.goto(&self.config.home_url, None).await?;
        random_delay(&delays.home_page).await;
        if self.throttled(session.as_ref()) {
            random_delay(&delays.throttled).await;
            return Ok(Vec::new());
        }

        random_delay(&delays.before_submit).await;
        let results_url =
            reqwest::Url::parse_with_params(&self.config.search_url, &[("q", query)])
                .map_err(|_| BrowserError::InvalidUrl(self.config.search_url.clone()))?;
        let navigation = session
            .goto(results_url.as_str(), Some(&self.config.wait_selector))
            .await?;

        if navigation.selector_found == Some(false) {
            warn!(
                "Search results did not appear for '{}', using the page as loaded",
                query
            );
        } else {
            random_delay(&delays.after_results).await;
        }

        if self.throttled(session.as_ref()) {
            random_delay(&delays.throttled).await;
            return Ok(Vec::new());
        }

        let links = extract_result_links(
            session.content(),
            &navigation.final_url,
            &self.config.result_selector,
            self.config.max_results,
        );
        info!("Found {} links for '{}': {:?}", links.len(), query, links);
        Ok(links)
    }

    fn throttled(&self, session: &dyn BrowserSession) -> bool {
        let detected = session.content().contains(&self.config.unusual_traffic_marker);
        if detected {
            warn!("Unusual traffic detected, pausing before giving up on this query");
        }
        detected
    }
}

/// `href`s of elements matching `selector`, in document order, resolved against `page_url`.
pub fn extract_result_links(
    html: &str,
    page_url: &str,
    selector: &str,
    max_results: usize,
) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        warn!("Invalid result selector '{}'", selector);
        return Vec::new();
    };
    let base = reqwest::Url::parse(page_url).ok();
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| match reqwest::Url::parse(href) {
            Ok(url) => Some(url.to_string()),
            Err(_) => base
                .as_ref()
                .and_then(|base| base.join(href).ok())
                .map(|url| url.to_string()),
        })
        .take(max_results)
        .collect()
}
