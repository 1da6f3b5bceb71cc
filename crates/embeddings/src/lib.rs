pub mod chunker;
pub mod fallback;
pub mod ollama;

pub use chunker::{ChunkConfig, TextChunk, TextChunker};
pub use fallback::FallbackEmbeddingProvider;
pub use ollama::{OllamaEmbeddingClient, OllamaEmbeddingConfig};

use agent_core::config::EmbeddingConfig;
use anyhow::Result;
use log::info;

type EmbedFuture<'a> =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + 'a>>;

pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_>;
    fn dimension(&self) -> usize;
}

impl EmbeddingProvider for OllamaEmbeddingClient {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts))
    }
    fn dimension(&self) -> usize {
        self.embedding_dimension()
    }
}

impl EmbeddingProvider for FallbackEmbeddingProvider {
    fn embed(&self, texts: Vec<String>) -> EmbedFuture<'_> {
        Box::pin(self.embed(texts))
    }
    fn dimension(&self) -> usize {
        self.embedding_dimension()
    }
}

/// Builds the provider named by `[embedding].provider`. Anything other than `ollama`
/// yields the offline fallback.
pub fn create_embedding_provider(
    cfg: &EmbeddingConfig,
    base_url: &str,
) -> Result<Box<dyn EmbeddingProvider>> {
    match cfg.provider.as_str() {
        "ollama" => {
            let mut ollama_cfg = OllamaEmbeddingConfig {
                base_url: base_url.to_string(),
                ..OllamaEmbeddingConfig::default()
            };
            if let Some(model) = &cfg.model {
                ollama_cfg.model = model.clone();
            }
            if let Some(dim) = cfg.dimensions {
                ollama_cfg.dimensions = dim;
            }
            info!("Using Ollama embeddings with model {}", ollama_cfg.model);
            Ok(Box::new(OllamaEmbeddingClient::new(ollama_cfg)?))
        }
        other => {
            info!("Using fallback embeddings (provider '{}')", other);
            let provider = match cfg.dimensions {
                Some(dim) => FallbackEmbeddingProvider::new(dim),
                None => FallbackEmbeddingProvider::with_standard_dimension(),
            };
            Ok(Box::new(provider))
        }
    }
}
