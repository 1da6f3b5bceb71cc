use agent_core::Config;
use browser::{create_browser, Browser, PageExtractor, WebSearch};
use embeddings::{create_embedding_provider, ChunkConfig, EmbeddingProvider, TextChunker};
use llm::{ChatMessage, ChatModel, ChatRequest, ModelConfig, OllamaClient, ToolCall};
use log::{debug, error, info};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tooling::{
    AddTwoNumbersTool, GetTextFromUrlTool, GetWebResultsTool, Researcher, SearchDocumentsTool,
    SubtractTwoNumbersTool, Summarizer, ToolInput, ToolOutput, ToolRegistry,
};
use vector_store::AnyVectorStore;

use crate::conversation::Conversation;
use crate::errors::AgentError;
use crate::ingest;

pub struct AgentService {
    config: Config,
    chat_model: Arc<dyn ChatModel>,
    embeddings: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<AnyVectorStore>,
    tool_registry: Arc<ToolRegistry>,
    text_chunker: TextChunker,
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService")
            .field("chat_model", &self.config.llm.chat_model)
            .field("tools", &self.tool_registry.list_tools())
            .finish()
    }
}

/// Registers every tool the chat model can call, in the order their definitions are sent.
pub fn build_tool_registry(
    config: &Config,
    chat_model: Arc<dyn ChatModel>,
    embeddings: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<AnyVectorStore>,
    browser: Arc<dyn Browser>,
) -> Result<ToolRegistry, AgentError> {
    let extractor = PageExtractor::new(browser.clone());
    let summarizer = Summarizer::new(
        extractor.clone(),
        chat_model,
        config.llm.summary_model.clone(),
    );
    let researcher = Researcher::new(WebSearch::new(browser, config.search.clone()), summarizer);

    let mut registry = ToolRegistry::new();
    let tools: Vec<Box<dyn tooling::Tool>> = vec![
        Box::new(SearchDocumentsTool::new(
            embeddings,
            vector_store,
            config.vector_store.top_k,
        )),
        Box::new(GetTextFromUrlTool::new(extractor)),
        Box::new(GetWebResultsTool::new(researcher)),
        Box::new(AddTwoNumbersTool),
        Box::new(SubtractTwoNumbersTool),
    ];
    for tool in tools {
        registry
            .register(tool)
            .map_err(|e| AgentError::Config(e.to_string()))?;
    }

    info!("Registered tools: {:?}", registry.list_tools());
    Ok(registry)
}

impl AgentService {
    pub async fn new(mut config: Config) -> Result<Self, AgentError> {
        config.llm = config.llm.with_env_overrides();
        config.vector_store = config.vector_store.with_env_overrides();

        let chat_model: Arc<dyn ChatModel> = Arc::new(
            OllamaClient::new(ModelConfig {
                base_url: config.llm.base_url.clone(),
                timeout_secs: config.llm.timeout_secs,
            })
            .map_err(AgentError::Llm)?,
        );

        let embeddings: Arc<dyn EmbeddingProvider> = Arc::from(
            create_embedding_provider(&config.embedding, &config.llm.base_url)
                .map_err(AgentError::Embedding)?,
        );

        info!(
            "Initializing vector store {} with {} dimensions",
            config.vector_store.url,
            embeddings.dimension()
        );
        let vector_store = Arc::new(
            AnyVectorStore::from_config(&config.vector_store, embeddings.dimension())
                .await
                .map_err(AgentError::VectorStore)?,
        );

        let browser = create_browser(&config.browser);
        let tool_registry = build_tool_registry(
            &config,
            chat_model.clone(),
            embeddings.clone(),
            vector_store.clone(),
            browser,
        )?;

        Ok(Self::with_clients(
            config,
            chat_model,
            embeddings,
            vector_store,
            Arc::new(tool_registry),
        ))
    }

    // Dependency-injection friendly constructor for testing and composition
    pub fn with_clients(
        config: Config,
        chat_model: Arc<dyn ChatModel>,
        embeddings: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<AnyVectorStore>,
        tool_registry: Arc<ToolRegistry>,
    ) -> Self {
        let text_chunker = TextChunker::new(ChunkConfig {
            chunk_size: config.data.chunk_size,
            overlap_size: config.data.overlap_size,
        });

        Self {
            config,
            chat_model,
            embeddings,
            vector_store,
            tool_registry,
            text_chunker,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Calls the chat model until it answers without requesting tools, executing each
    /// requested tool in order and appending a record and a result message per call.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String, AgentError> {
        let llm = &self.config.llm;
        let definitions = self.tool_registry.definitions();

        for iteration in 1..=llm.max_iterations {
            debug!(
                "Model call {} with {} messages",
                iteration,
                conversation.len()
            );
            let request = ChatRequest::new(&llm.chat_model, conversation.messages().to_vec())
                .with_tools(definitions.clone())
                .with_temperature(llm.temperature);

            let response = self.chat_model.chat(request).await.map_err(AgentError::Llm)?;
            debug!("Model response: {:?}", response.message);

            if response.tool_calls().is_empty() {
                info!("Final answer: {}", response.message.content);
                return Ok(response.message.content);
            }

            for call in response.tool_calls() {
                let output = self.dispatch(call).await?;
                conversation.push(ChatMessage::system(
                    json!({"name": call.name(), "arguments": call.function.arguments})
                        .to_string(),
                ));
                conversation.push(ChatMessage::tool(
                    output.content(),
                    call.name().to_string(),
                ));
            }
            debug!("Conversation after tool calls: {:?}", conversation.messages());
        }

        error!(
            "No final answer after {} model calls, giving up",
            llm.max_iterations
        );
        Err(AgentError::IterationLimit {
            limit: llm.max_iterations,
        })
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<ToolOutput, AgentError> {
        info!(
            "Calling function: {} with arguments: {:?}",
            call.name(),
            call.function.arguments
        );

        if !self.tool_registry.is_registered(call.name()) {
            error!("Function {} not found", call.name());
            return Ok(ToolOutput::null());
        }

        let output = self
            .tool_registry
            .execute_tool(ToolInput::from_call(call))
            .await?;
        info!("Function output: {}", output.content());
        Ok(output)
    }

    /// Chunks, embeds and stores one document. Returns the number of chunks stored.
    pub async fn add_document(&self, file_name: &str, content: &str) -> Result<usize, AgentError> {
        ingest::ingest_text(
            file_name,
            content,
            &self.text_chunker,
            self.embeddings.as_ref(),
            &self.vector_store,
        )
        .await
    }

    /// Loads every document under `[data].document_dir`. A missing directory is not an error.
    pub async fn load_documents(&self) -> Result<usize, AgentError> {
        let Some(dir) = &self.config.data.document_dir else {
            debug!("No document directory configured");
            return Ok(0);
        };

        ingest::ingest_directory(
            Path::new(dir),
            &self.text_chunker,
            self.embeddings.as_ref(),
            &self.vector_store,
        )
        .await
    }
}
