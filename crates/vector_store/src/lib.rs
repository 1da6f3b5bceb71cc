pub mod memory;
pub mod models;
pub mod store;

pub use memory::{cosine_similarity, InMemoryVectorStore};
pub use models::{NewPassage, Passage, ScoredPassage};
pub use store::PgVectorStore;

use agent_core::config::VectorStoreConfig;
use anyhow::Result;

pub enum AnyVectorStore {
    Postgres(PgVectorStore),
    InMemory(InMemoryVectorStore),
}

impl AnyVectorStore {
    /// `memory://` selects the in-process store; `postgresql://` (or `postgres://`) connects
    /// to pgvector and bootstraps the configured table.
    pub async fn from_config(cfg: &VectorStoreConfig, embedding_dimensions: usize) -> Result<Self> {
        if cfg.url.starts_with("memory://") {
            tracing::info!("Using in-memory vector store");
            Ok(Self::InMemory(InMemoryVectorStore::new()))
        } else if cfg.url.starts_with("postgresql://") || cfg.url.starts_with("postgres://") {
            let store = PgVectorStore::connect(&cfg.url, &cfg.table, embedding_dimensions).await?;
            Ok(Self::Postgres(store))
        } else {
            anyhow::bail!(
                "Invalid vector store URL: {}, must start with 'memory://' or 'postgresql://'",
                cfg.url
            )
        }
    }

    pub async fn insert_passage(&self, new: NewPassage) -> Result<Passage> {
        match self {
            Self::Postgres(store) => store.insert_passage(new).await,
            Self::InMemory(store) => store.insert_passage(new).await,
        }
    }

    pub async fn replace_source(
        &self,
        source: &str,
        passages: Vec<NewPassage>,
    ) -> Result<Vec<Passage>> {
        match self {
            Self::Postgres(store) => store.replace_source(source, passages).await,
            Self::InMemory(store) => store.replace_source(source, passages).await,
        }
    }

    pub async fn search_similar(
        &self,
        query_embedding: Vec<f32>,
        limit: usize,
    ) -> Result<Vec<ScoredPassage>> {
        match self {
            Self::Postgres(store) => store.search_similar(query_embedding, limit).await,
            Self::InMemory(store) => store.search_similar(query_embedding, limit).await,
        }
    }

    pub async fn passage_count(&self) -> Result<i64> {
        match self {
            Self::Postgres(store) => store.passage_count().await,
            Self::InMemory(store) => store.passage_count().await,
        }
    }
}
