use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub vector_store: VectorStoreConfig,
    pub browser: BrowserConfig,
    pub search: SearchConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub chat_model: String,
    pub summary_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_iterations: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            chat_model: "gemma3-12b-tools".to_string(),
            summary_model: "gemma3-4b-tools".to_string(),
            temperature: 0.0,
            timeout_secs: 300,
            max_iterations: 10,
        }
    }
}

impl LlmConfig {
    pub fn with_env_overrides(&self) -> Self {
        Self {
            base_url: env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| self.base_url.clone()),
            chat_model: env::var("LLM_CHAT_MODEL").unwrap_or_else(|_| self.chat_model.clone()),
            summary_model: env::var("LLM_SUMMARY_MODEL")
                .unwrap_or_else(|_| self.summary_model.clone()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: Some("qwen2.5:7b".to_string()),
            dimensions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub url: String,
    pub table: String,
    pub top_k: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
            table: "docx_files".to_string(),
            top_k: 5,
        }
    }
}

impl VectorStoreConfig {
    pub fn with_env_overrides(&self) -> Self {
        Self {
            url: env::var("VECTOR_STORE_URL").unwrap_or_else(|_| self.url.clone()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    #[default]
    Http,
    Playwright,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub backend: BrowserBackend,
    pub user_agent: String,
    pub page_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub node_bin: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BrowserBackend::Http,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/95.0.4638.54 Safari/537.36"
                .to_string(),
            page_timeout_secs: 30,
            selector_timeout_secs: 10,
            node_bin: None,
        }
    }
}

/// Inclusive range, in seconds, a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    pub const fn none() -> Self {
        Self::new(0.0, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDelays {
    pub home_page: DelayRange,
    pub before_submit: DelayRange,
    pub after_results: DelayRange,
    pub throttled: DelayRange,
}

impl Default for SearchDelays {
    fn default() -> Self {
        Self {
            home_page: DelayRange::new(2.0, 4.0),
            before_submit: DelayRange::new(0.5, 1.0),
            after_results: DelayRange::new(1.0, 2.0),
            throttled: DelayRange::new(10.0, 20.0),
        }
    }
}

impl SearchDelays {
    /// All delays disabled. Used for offline runs and tests.
    pub fn none() -> Self {
        Self {
            home_page: DelayRange::none(),
            before_submit: DelayRange::none(),
            after_results: DelayRange::none(),
            throttled: DelayRange::none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub home_url: String,
    pub search_url: String,
    pub wait_selector: String,
    pub result_selector: String,
    pub max_results: usize,
    pub unusual_traffic_marker: String,
    pub delays: SearchDelays,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.bing.com".to_string(),
            search_url: "https://www.bing.com/search".to_string(),
            wait_selector: "li.b_algo".to_string(),
            result_selector: "li.b_algo h2 a".to_string(),
            max_results: 2,
            unusual_traffic_marker: "Our systems have detected unusual traffic".to_string(),
            delays: SearchDelays::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub document_dir: Option<String>,
    pub chunk_size: usize,
    pub overlap_size: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            document_dir: None,
            chunk_size: 500,
            overlap_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "chat_log.log".to_string(),
            level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are helpful AI assistant.".to_string(),
            user_prompt: "What are the best practices in modern AI research? Search the web"
                .to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        Self::load(Path::new(&config_path))
    }

    pub fn default_config_path() -> String {
        "./config.toml".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_TOML: &str = r#"
[llm]
base_url = "http://ollama:11434"
chat_model = "qwen2.5:14b"
summary_model = "qwen2.5:3b"
temperature = 0.0
timeout_secs = 60
max_iterations = 4

[embedding]
provider = "fallback"
dimensions = 384

[vector_store]
url = "postgresql://localhost:5432/research"
table = "handbook"
top_k = 5

[browser]
backend = "playwright"
page_timeout_secs = 20
selector_timeout_secs = 5

[search]
max_results = 2

[search.delays]
home_page = { min_secs = 1.0, max_secs = 2.0 }
throttled = { min_secs = 0.0, max_secs = 0.0 }

[data]
document_dir = "./data/docs"

[logging]
file = "run.log"
level = "info"

[conversation]
user_prompt = "Summarize recent work on AI alignment"
"#;

    #[test]
    fn should_deserialize_config_from_toml() {
        let config: Config = toml::from_str(FULL_TOML).unwrap();

        assert_eq!(config.llm.base_url, "http://ollama:11434");
        assert_eq!(config.llm.chat_model, "qwen2.5:14b");
        assert_eq!(config.llm.max_iterations, 4);
        assert_eq!(config.embedding.provider, "fallback");
        assert_eq!(config.embedding.dimensions, Some(384));
        assert_eq!(config.vector_store.table, "handbook");
        assert_eq!(config.browser.backend, BrowserBackend::Playwright);
        assert_eq!(config.browser.selector_timeout_secs, 5);
        assert_eq!(config.search.delays.home_page, DelayRange::new(1.0, 2.0));
        assert_eq!(config.data.document_dir.as_deref(), Some("./data/docs"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.conversation.user_prompt,
            "Summarize recent work on AI alignment"
        );
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: Config = toml::from_str(FULL_TOML).unwrap();

        // Keys absent from the file keep their defaults
        assert_eq!(config.browser.user_agent, BrowserConfig::default().user_agent);
        assert_eq!(config.search.result_selector, "li.b_algo h2 a");
        assert_eq!(config.search.delays.after_results, DelayRange::new(1.0, 2.0));
        assert_eq!(config.data.chunk_size, 500);
        assert_eq!(
            config.conversation.system_prompt,
            "You are helpful AI assistant."
        );
    }

    #[test]
    fn should_use_defaults_for_empty_file() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.vector_store.top_k, 5);
        assert_eq!(config.search.max_results, 2);
        assert_eq!(config.browser.backend, BrowserBackend::Http);
    }

    #[test]
    fn should_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_TOML.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.llm.summary_model, "qwen2.5:3b");
        assert_eq!(config.logging.file, "run.log");
    }

    #[test]
    fn should_load_config_with_env_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_TOML.as_bytes()).unwrap();
        let temp_path = temp_file.path().to_string_lossy().to_string();

        env::set_var("CONFIG_PATH", &temp_path);

        let config = Config::load_from_env().unwrap();

        assert_eq!(config.embedding.provider, "fallback");

        env::remove_var("CONFIG_PATH");
    }

    #[test]
    fn should_use_default_config_path() {
        assert_eq!(Config::default_config_path(), "./config.toml");
    }

    #[test]
    fn should_return_error_for_missing_file() {
        let result = Config::load(Path::new("/non/existent/path.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn should_return_error_for_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"invalid toml content [[[").unwrap();

        let result = Config::load(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_browser_backend() {
        let result: Result<Config, _> = toml::from_str("[browser]\nbackend = \"netscape\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn should_override_vector_store_url_from_env() {
        let config = VectorStoreConfig::default();

        env::set_var("VECTOR_STORE_URL", "postgresql://override/db");
        let overridden = config.with_env_overrides();
        env::remove_var("VECTOR_STORE_URL");

        assert_eq!(overridden.url, "postgresql://override/db");
        assert_eq!(overridden.top_k, config.top_k);
    }

    #[test]
    fn should_disable_all_search_delays() {
        let delays = SearchDelays::none();
        assert_eq!(delays.home_page, DelayRange::none());
        assert_eq!(delays.throttled.max_secs, 0.0);
    }
}
