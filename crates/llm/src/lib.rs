pub mod models;
pub mod ollama;
pub mod scripted;

use anyhow::Result;
use async_trait::async_trait;

pub use models::{
    ChatMessage, ChatOptions, ChatRequest, ChatResponse, FunctionCall, FunctionDefinition,
    ModelConfig, ResponseMessage, ToolCall, ToolDefinition,
};
pub use ollama::OllamaClient;
pub use scripted::ScriptedChatModel;

/// A chat endpoint that answers one non-streaming request at a time.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
