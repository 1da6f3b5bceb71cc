use crate::models::{ChatRequest, ChatResponse, ModelConfig};
use crate::ChatModel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

/// Chat client for an Ollama-compatible `/api/chat` endpoint.
pub struct OllamaClient {
    client: Client,
    config: ModelConfig,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        info!("Initializing OllamaClient for {}", config.base_url);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        info!(
            "Sending request to model '{}' ({} messages, {} tools)",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Chat endpoint send error: {:?}", e);
                anyhow::anyhow!("Failed to send request to chat endpoint: {}", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Chat endpoint returned error {}: {}",
                status,
                error_text
            ));
        }

        let body = response
            .text()
            .await
            .context("Failed to read chat endpoint response")?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse chat endpoint response: {body}"))?;

        info!("Received response from model '{}'", request.model);
        Ok(parsed)
    }
}
