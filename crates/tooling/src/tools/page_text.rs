use async_trait::async_trait;
use browser::PageExtractor;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::tool::{parameters_schema, Tool, ToolError, ToolInput, ToolOutput};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct GetTextFromUrlArgs {
    /// The exact URL from which to extract text.
    url: String,
}

pub struct GetTextFromUrlTool {
    extractor: PageExtractor,
}

impl GetTextFromUrlTool {
    pub fn new(extractor: PageExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Tool for GetTextFromUrlTool {
    fn name(&self) -> &str {
        "get_text_from_url"
    }

    fn description(&self) -> &str {
        "Retrieves page content from a URL. Ensure the URL exactly matches the one provided by the user."
    }

    fn parameters(&self) -> Value {
        parameters_schema::<GetTextFromUrlArgs>()
    }

    /// Unreachable pages produce a diagnostic text naming the URL, never an error.
    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let args: GetTextFromUrlArgs = input.parse_arguments()?;
        let content = self.extractor.fetch_text(&args.url).await;
        Ok(ToolOutput::text(content.to_string()))
    }
}
