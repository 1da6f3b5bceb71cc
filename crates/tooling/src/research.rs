use anyhow::{Context, Result};
use browser::WebSearch;
use log::info;

use crate::summarizer::{PageSummary, Summarizer};

/// Runs search then summarization for each query, one batch per query, in query order.
#[derive(Clone)]
pub struct Researcher {
    search: WebSearch,
    summarizer: Summarizer,
}

impl Researcher {
    pub fn new(search: WebSearch, summarizer: Summarizer) -> Self {
        Self { search, summarizer }
    }

    pub async fn research(
        &self,
        queries: &[String],
        user_question: &str,
    ) -> Result<Vec<Vec<PageSummary>>> {
        let mut batches = Vec::with_capacity(queries.len());

        for query in queries {
            let links = self
                .search
                .search(query)
                .await
                .with_context(|| format!("Web search failed for '{}'", query))?;
            let summaries = self.summarizer.summarize(&links, user_question).await?;
            info!("Query '{}' produced {} summaries", query, summaries.len());
            batches.push(summaries);
        }

        Ok(batches)
    }
}
