use agent_core::Config;
use clap::Parser;
use log::{error, info, warn};
use research_agent::logging::init_logging;
use research_agent::{AgentError, AgentService, Conversation};
use std::path::PathBuf;
use std::process::ExitCode;

/// Answers a prompt with a local chat model that can search the web and the user's documents.
#[derive(Debug, Parser)]
#[command(name = "research-agent", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG_PATH", default_value_t = Config::default_config_path())]
    config: String,

    /// Prompt to answer. Defaults to `[conversation].user_prompt`.
    prompt: Option<String>,
}

async fn run(config: Config, prompt: Option<String>) -> Result<String, AgentError> {
    let agent = AgentService::new(config).await?;
    agent.load_documents().await?;

    let conversation_cfg = &agent.config().conversation;
    let prompt = prompt.unwrap_or_else(|| conversation_cfg.user_prompt.clone());
    info!("User prompt: {}", prompt);

    let mut conversation = Conversation::from_prompts(&conversation_cfg.system_prompt, &prompt);
    agent.run(&mut conversation).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = PathBuf::from(&cli.config);
    let (config, load_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        return ExitCode::from(e.exit_code());
    }

    match load_error {
        None => info!("Loaded configuration from {}", config_path.display()),
        Some(e) => warn!(
            "Failed to load config from {} ({}), using development defaults",
            config_path.display(),
            e
        ),
    }

    match run(config, cli.prompt).await {
        Ok(answer) => {
            println!("{}", answer);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
