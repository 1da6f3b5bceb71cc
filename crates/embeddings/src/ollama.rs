use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OllamaEmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b".to_string(),
            dimensions: 3584,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Client for the Ollama `/api/embed` endpoint.
pub struct OllamaEmbeddingClient {
    config: OllamaEmbeddingConfig,
    client: Client,
}

impl OllamaEmbeddingClient {
    pub fn new(config: OllamaEmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            "Embedding {} texts with model {}",
            texts.len(),
            self.config.model
        );

        let request = EmbedRequest {
            model: &self.config.model,
            input: &texts,
        };

        let response = self
            .client
            .post(format!(
                "{}/api/embed",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to embedding endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Embedding endpoint returned error {}: {}",
                status,
                error_text
            ));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .context("Failed to parse embedding endpoint response")?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(anyhow::anyhow!(
                "Embedding endpoint returned {} vectors for {} inputs",
                embed_response.embeddings.len(),
                texts.len()
            ));
        }

        Ok(embed_response.embeddings)
    }

    pub fn embedding_dimension(&self) -> usize {
        self.config.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> OllamaEmbeddingClient {
        OllamaEmbeddingClient::new(OllamaEmbeddingConfig {
            base_url,
            timeout_secs: 5,
            ..OllamaEmbeddingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn should_return_empty_embeddings_for_empty_input() {
        let client = client("http://127.0.0.1:9".to_string());

        let result = client.embed(vec![]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn should_embed_texts_in_input_order() {
        let app = Router::new().route(
            "/api/embed",
            post(|Json(body): Json<Value>| async move {
                let count = body["input"].as_array().map(|a| a.len()).unwrap_or(0);
                let embeddings: Vec<Vec<f32>> =
                    (0..count).map(|i| vec![i as f32, 1.0]).collect();
                Json(json!({ "model": body["model"], "embeddings": embeddings }))
            }),
        );
        let client = client(serve(app).await);

        let result = client
            .embed(vec!["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(result, vec![vec![0.0, 1.0], vec![1.0, 1.0]]);
    }

    #[tokio::test]
    async fn should_fail_on_error_status() {
        let app = Router::new().route(
            "/api/embed",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let client = client(serve(app).await);

        let error = client
            .embed(vec!["text".to_string()])
            .await
            .unwrap_err()
            .to_string();

        assert!(error.contains("500"));
        assert!(error.contains("model not loaded"));
    }

    #[tokio::test]
    async fn should_fail_on_vector_count_mismatch() {
        let app = Router::new().route(
            "/api/embed",
            post(|| async { Json(json!({ "embeddings": [] })) }),
        );
        let client = client(serve(app).await);

        let result = client.embed(vec!["text".to_string()]).await;

        assert!(result.is_err());
    }
}
