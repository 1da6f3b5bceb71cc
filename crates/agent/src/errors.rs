use thiserror::Error;
use tooling::ToolError;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM service error: {0:#}")]
    Llm(anyhow::Error),

    #[error("Embedding service error: {0:#}")]
    Embedding(anyhow::Error),

    #[error("Vector store error: {0:#}")]
    VectorStore(anyhow::Error),

    #[error("Document ingestion error: {0:#}")]
    Ingest(anyhow::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Reached the limit of {limit} model calls without a final answer")]
    IterationLimit { limit: usize },
}

impl AgentError {
    /// Process exit status reported by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AgentError::Config(_) => 2,
            AgentError::Llm(_) => 3,
            AgentError::Embedding(_) => 4,
            AgentError::VectorStore(_) => 4,
            AgentError::Ingest(_) => 4,
            AgentError::Tool(_) => 5,
            AgentError::IterationLimit { .. } => 6,
        }
    }
}
