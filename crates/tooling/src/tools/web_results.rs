use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::research::Researcher;
use crate::tool::{parameters_schema, Tool, ToolError, ToolInput, ToolOutput};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct GetWebResultsArgs {
    /// An array of search query strings covering different aspects of the topic.
    queries: Vec<String>,
    /// The exact user input.
    user_input: String,
}

pub struct GetWebResultsTool {
    researcher: Researcher,
}

impl GetWebResultsTool {
    pub fn new(researcher: Researcher) -> Self {
        Self { researcher }
    }
}

#[async_trait]
impl Tool for GetWebResultsTool {
    fn name(&self) -> &str {
        "get_web_results"
    }

    fn description(&self) -> &str {
        "Searches the web using multiple queries. Useful when the requested info is not available internally or when the user asks for a web search."
    }

    fn parameters(&self) -> Value {
        parameters_schema::<GetWebResultsArgs>()
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let args: GetWebResultsArgs = input.parse_arguments()?;

        let batches = self
            .researcher
            .research(&args.queries, &args.user_input)
            .await
            .map_err(|e| self.error(format!("{e:#}")))?;

        ToolOutput::new(batches).map_err(|e| self.error(e.to_string()))
    }
}
