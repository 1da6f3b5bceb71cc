use async_trait::async_trait;
use embeddings::EmbeddingProvider;
use log::info;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use vector_store::AnyVectorStore;

use crate::tool::{parameters_schema, Tool, ToolError, ToolInput, ToolOutput};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct SearchDocumentsArgs {
    /// A search query string to perform a similarity search.
    query: String,
}

/// Similarity search over the user's ingested documents.
pub struct SearchDocumentsTool {
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<AnyVectorStore>,
    top_k: usize,
}

impl SearchDocumentsTool {
    pub fn new(
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<AnyVectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embeddings,
            store,
            top_k,
        }
    }
}

#[async_trait]
impl Tool for SearchDocumentsTool {
    fn name(&self) -> &str {
        "search_documents"
    }

    fn description(&self) -> &str {
        "Access the database containing user documents and perform a similarity search based on the query."
    }

    fn parameters(&self) -> Value {
        parameters_schema::<SearchDocumentsArgs>()
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let args: SearchDocumentsArgs = input.parse_arguments()?;

        let query_embedding = self
            .embeddings
            .embed(vec![args.query.clone()])
            .await
            .map_err(|e| self.error(format!("Failed to embed query: {e:#}")))?
            .into_iter()
            .next()
            .ok_or_else(|| self.error("Embedding provider returned no vector".to_string()))?;

        let results = self
            .store
            .search_similar(query_embedding, self.top_k)
            .await
            .map_err(|e| self.error(format!("Similarity search failed: {e:#}")))?;
        info!(
            "Document search for '{}' returned {} passages",
            args.query,
            results.len()
        );

        let passages: Map<String, Value> = results
            .into_iter()
            .enumerate()
            .map(|(rank, scored)| (rank.to_string(), Value::String(scored.passage.text)))
            .collect();
        Ok(ToolOutput {
            result: Value::Object(passages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embeddings::FallbackEmbeddingProvider;
    use serde_json::json;
    use vector_store::{InMemoryVectorStore, NewPassage};

    async fn tool_with(passages: &[&str], top_k: usize) -> SearchDocumentsTool {
        let embeddings = Arc::new(FallbackEmbeddingProvider::new(128));
        let store = Arc::new(AnyVectorStore::InMemory(InMemoryVectorStore::new()));
        let vectors = embeddings
            .embed(passages.iter().map(|p| p.to_string()).collect())
            .await
            .unwrap();
        for (i, (passage, vector)) in passages.iter().zip(vectors).enumerate() {
            store
                .insert_passage(NewPassage::new(
                    "handbook.md",
                    i,
                    passage.to_string(),
                    vector,
                ))
                .await
                .unwrap();
        }
        SearchDocumentsTool::new(embeddings, store, top_k)
    }

    fn query(text: &str) -> ToolInput {
        ToolInput::new("search_documents".to_string())
            .with_argument("query", text)
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_ranked_passages_keyed_by_rank() {
        let tool = tool_with(
            &[
                "quarterly revenue forecast",
                "vacation policy for employees",
                "office parking rules",
            ],
            2,
        )
        .await;

        let output = tool.execute(query("employees vacation policy")).await.unwrap();

        let passages = output.result.as_object().unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages["0"], json!("vacation policy for employees"));
        assert!(output.content().starts_with("{\"0\":"));
    }

    #[tokio::test]
    async fn should_return_empty_object_for_empty_store() {
        let tool = tool_with(&[], 5).await;

        let output = tool.execute(query("anything")).await.unwrap();

        assert_eq!(output.result, json!({}));
        assert_eq!(output.content(), "{}");
    }

    #[tokio::test]
    async fn should_reject_missing_query() {
        let tool = tool_with(&[], 5).await;

        let result = tool
            .execute(ToolInput::new("search_documents".to_string()))
            .await;

        assert!(result.is_err());
    }
}
