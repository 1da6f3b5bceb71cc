use anyhow::{Context, Result};
use browser::{PageContent, PageExtractor};
use llm::{ChatMessage, ChatModel, ChatRequest};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Structured summary of one web page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageSummary {
    /// The title or name of the webpage.
    pub title: String,
    /// A concise summary capturing the key information of the webpage.
    pub content: String,
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("summary is not valid JSON for the page schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl PageSummary {
    pub fn schema() -> Value {
        schemars::schema_for!(PageSummary).to_value()
    }

    pub fn parse(raw: &str) -> Result<Self, SummaryError> {
        Ok(serde_json::from_str(raw.trim())?)
    }
}

/// The two system messages sent for one page.
pub fn summary_prompt(user_question: &str, page_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(format!(
            "You are a helpful AI assistant. Your task is to analyze a webpage and provide an \
             output focused on this user question: {user_question}\n\
             The output follows the schema below:\n\n\
             \x20 title: str\n\
             \x20 content: str\n\n\
             Where:\n\
             - 'title' is the name of the page,\n\
             - 'content' is a concise summary of the webpage that captures all key information.\n\n\
             Ensure accuracy, clarity, and conciseness in your analysis. Return JSON."
        )),
        ChatMessage::system(format!("Web page: {page_text}")),
    ]
}

/// Fetches pages and asks the summary model for one [`PageSummary`] each.
#[derive(Clone)]
pub struct Summarizer {
    extractor: PageExtractor,
    chat: Arc<dyn ChatModel>,
    model: String,
}

impl Summarizer {
    pub fn new(extractor: PageExtractor, chat: Arc<dyn ChatModel>, model: String) -> Self {
        Self {
            extractor,
            chat,
            model,
        }
    }

    /// Pages that fail to load or yield an invalid summary are skipped with a warning.
    /// Chat transport errors are returned.
    pub async fn summarize(
        &self,
        links: &[String],
        user_question: &str,
    ) -> Result<Vec<PageSummary>> {
        let mut summaries = Vec::with_capacity(links.len());

        for link in links {
            let text = match self.extractor.fetch_text(link).await {
                PageContent::Text(text) => text,
                PageContent::Unavailable { reason, .. } => {
                    warn!("Skipping {}: page unavailable ({})", link, reason);
                    continue;
                }
            };

            let request = ChatRequest::new(&self.model, summary_prompt(user_question, &text))
                .with_format(PageSummary::schema());
            let response = self
                .chat
                .chat(request)
                .await
                .with_context(|| format!("Failed to summarize {}", link))?;

            match PageSummary::parse(&response.message.content) {
                Ok(summary) => {
                    info!("Summarized {}: {}", link, summary.title);
                    summaries.push(summary);
                }
                Err(e) => warn!("Skipping {}: {}", link, e),
            }
        }

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Role;
    use browser::StaticBrowser;
    use llm::{ChatResponse, ScriptedChatModel};

    fn summarizer(browser: StaticBrowser, chat: Arc<ScriptedChatModel>) -> Summarizer {
        Summarizer::new(
            PageExtractor::new(Arc::new(browser)),
            chat,
            "gemma3-4b-tools".to_string(),
        )
    }

    #[test]
    fn should_parse_valid_summary_and_ignore_extra_fields() {
        let summary =
            PageSummary::parse(r#" {"title": "T", "content": "C", "score": 1} "#).unwrap();

        assert_eq!(summary.title, "T");
        assert_eq!(summary.content, "C");
    }

    #[test]
    fn should_reject_summary_with_missing_field() {
        assert!(PageSummary::parse(r#"{"title": "T"}"#).is_err());
        assert!(PageSummary::parse("not json").is_err());
    }

    #[test]
    fn should_describe_both_fields_in_schema() {
        let schema = PageSummary::schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["title"]["type"], "string");
        assert_eq!(schema["properties"]["content"]["type"], "string");
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&Value::from("title")));
        assert!(required.contains(&Value::from("content")));
    }

    #[test]
    fn should_build_deterministic_prompt() {
        let first = summary_prompt("best practices", "page text");
        let second = summary_prompt("best practices", "page text");

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|m| m.role == Role::System));
        assert!(first[0].content.contains("best practices"));
        assert!(first[0].content.contains("title: str"));
        assert_eq!(first[1].content, "Web page: page text");
    }

    #[tokio::test]
    async fn should_summarize_each_available_page_in_order() {
        let browser = StaticBrowser::new()
            .with_page("https://a.test/", "<p>Alpha page</p>")
            .with_page("https://b.test/", "<p>Beta page</p>");
        let chat = Arc::new(ScriptedChatModel::new(vec![
            ChatResponse::text(r#"{"title": "Alpha", "content": "About alpha"}"#),
            ChatResponse::text(r#"{"title": "Beta", "content": "About beta"}"#),
        ]));
        let links = vec!["https://a.test/".to_string(), "https://b.test/".to_string()];

        let summaries = summarizer(browser, chat.clone())
            .summarize(&links, "what is it?")
            .await
            .unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Alpha");
        assert_eq!(summaries[1].title, "Beta");

        let requests = chat.requests();
        assert_eq!(requests[0].model, "gemma3-4b-tools");
        assert_eq!(requests[0].messages[1].content, "Web page: Alpha page");
        assert_eq!(requests[0].format, Some(PageSummary::schema()));
        assert_eq!(requests[0].options.temperature, 0.0);
    }

    #[tokio::test]
    async fn should_skip_unavailable_pages_without_calling_model() {
        let browser = StaticBrowser::new().with_page("https://ok.test/", "<p>Fine</p>");
        let chat = Arc::new(ScriptedChatModel::new(vec![ChatResponse::text(
            r#"{"title": "Ok", "content": "Fine"}"#,
        )]));
        let links = vec!["https://down.test/".to_string(), "https://ok.test/".to_string()];

        let summaries = summarizer(browser, chat.clone())
            .summarize(&links, "q")
            .await
            .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(chat.requests().len(), 1);
    }

    #[tokio::test]
    async fn should_skip_invalid_summaries_and_continue() {
        let browser = StaticBrowser::new()
            .with_page("https://a.test/", "<p>A</p>")
            .with_page("https://b.test/", "<p>B</p>");
        let chat = Arc::new(ScriptedChatModel::new(vec![
            ChatResponse::text(r#"{"title": "missing content"}"#),
            ChatResponse::text(r#"{"title": "B", "content": "b"}"#),
        ]));
        let links = vec!["https://a.test/".to_string(), "https://b.test/".to_string()];

        let summaries = summarizer(browser, chat).summarize(&links, "q").await.unwrap();

        assert_eq!(
            summaries,
            vec![PageSummary {
                title: "B".to_string(),
                content: "b".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn should_propagate_chat_errors() {
        let browser = StaticBrowser::new().with_page("https://a.test/", "<p>A</p>");
        let chat = Arc::new(ScriptedChatModel::new(vec![]));

        let result = summarizer(browser, chat)
            .summarize(&["https://a.test/".to_string()], "q")
            .await;

        assert!(result.unwrap_err().to_string().contains("Failed to summarize"));
    }
}
