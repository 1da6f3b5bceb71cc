pub mod delay;
pub mod extract;
pub mod http;
pub mod playwright;
pub mod search;
pub mod session;
pub mod static_pages;

pub use delay::random_delay;
pub use extract::{html_to_text, normalize_text, PageContent, PageExtractor};
pub use http::HttpBrowser;
pub use playwright::PlaywrightBrowser;
pub use search::{extract_result_links, WebSearch};
pub use session::{Browser, BrowserError, BrowserSession, Navigation};
pub use static_pages::StaticBrowser;

use agent_core::config::{BrowserBackend, BrowserConfig};
use std::sync::Arc;

pub fn create_browser(config: &BrowserConfig) -> Arc<dyn Browser> {
    match config.backend {
        BrowserBackend::Http => {
            log::info!("Using HTTP browser backend");
            Arc::new(HttpBrowser::new(config))
        }
        BrowserBackend::Playwright => {
            log::info!("Using Playwright browser backend");
            Arc::new(PlaywrightBrowser::new(config))
        }
    }
}
