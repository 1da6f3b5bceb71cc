use async_trait::async_trait;
use llm::{ToolCall, ToolDefinition};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInput {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolInput {
    pub fn new(name: String) -> Self {
        Self {
            name,
            arguments: Map::new(),
        }
    }

    pub fn from_call(call: &ToolCall) -> Self {
        Self {
            name: call.function.name.clone(),
            arguments: call.function.arguments.clone(),
        }
    }

    pub fn with_argument<T: Serialize>(
        mut self,
        key: &str,
        value: T,
    ) -> Result<Self, serde_json::Error> {
        self.arguments
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Deserializes the whole argument map into the tool's typed argument struct.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.arguments.clone())).map_err(|e| {
            ToolError::new(
                self.name.clone(),
                format!("Invalid arguments: {}", e),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub result: Value,
}

impl ToolOutput {
    pub fn new<T: Serialize>(result: T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            result: serde_json::to_value(result)?,
        })
    }

    pub fn text(text: String) -> Self {
        Self {
            result: Value::String(text),
        }
    }

    /// Stands in for the result of a tool that does not exist.
    pub fn null() -> Self {
        Self {
            result: Value::Null,
        }
    }

    /// The result as it is sent back to the model: strings verbatim, everything else as JSON.
    pub fn content(&self) -> String {
        match &self.result {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Tool '{tool_name}' error: {message}")]
pub struct ToolError {
    pub tool_name: String,
    pub message: String,
}

impl ToolError {
    pub fn new(tool_name: String, message: String) -> Self {
        Self { tool_name, message }
    }
}

/// JSON schema of a typed argument struct, in the shape tool definitions expect.
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let mut schema = schemars::schema_for!(T).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }

    fn validate_input(&self, input: &ToolInput) -> Result<(), ToolError> {
        if input.name != self.name() {
            return Err(ToolError::new(
                self.name().to_string(),
                format!("Expected tool '{}', got '{}'", self.name(), input.name),
            ));
        }
        Ok(())
    }

    fn error(&self, message: String) -> ToolError {
        ToolError::new(self.name().to_string(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(deny_unknown_fields)]
    struct EchoArgs {
        /// Text to echo back
        message: String,
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo a message"
        }

        fn parameters(&self) -> Value {
            parameters_schema::<EchoArgs>()
        }

        async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
            self.validate_input(&input)?;
            let args: EchoArgs = input.parse_arguments()?;
            Ok(ToolOutput::text(format!("Echo: {}", args.message)))
        }
    }

    #[test]
    fn should_build_tool_input_from_call() {
        let call = ToolCall::new("echo", json!({"message": "hi"}));

        let input = ToolInput::from_call(&call);

        assert_eq!(input.name, "echo");
        assert_eq!(input.arguments["message"], json!("hi"));
    }

    #[test]
    fn should_parse_typed_arguments() {
        let input = ToolInput::new("echo".to_string())
            .with_argument("message", "hello")
            .unwrap();

        let args: EchoArgs = input.parse_arguments().unwrap();

        assert_eq!(args.message, "hello");
    }

    #[test]
    fn should_reject_missing_and_unknown_arguments() {
        let missing = ToolInput::new("echo".to_string());
        let unknown = ToolInput::new("echo".to_string())
            .with_argument("message", "hello")
            .unwrap()
            .with_argument("extra", 1)
            .unwrap();

        let missing_error = missing.parse_arguments::<EchoArgs>().unwrap_err();
        let unknown_error = unknown.parse_arguments::<EchoArgs>().unwrap_err();

        assert!(missing_error.message.contains("missing field"));
        assert!(unknown_error.message.contains("unknown field"));
        assert_eq!(unknown_error.tool_name, "echo");
    }

    #[test]
    fn should_render_output_content() {
        assert_eq!(ToolOutput::text("plain".to_string()).content(), "plain");
        assert_eq!(ToolOutput::new(5).unwrap().content(), "5");
        assert_eq!(ToolOutput::new(json!({"0": "a"})).unwrap().content(), r#"{"0":"a"}"#);
        assert_eq!(ToolOutput::null().content(), "null");
    }

    #[test]
    fn should_describe_tool_as_function_definition() {
        let definition = EchoTool.definition();

        assert_eq!(definition.kind, "function");
        assert_eq!(definition.function.name, "echo");
        let parameters = &definition.function.parameters;
        assert_eq!(parameters["type"], "object");
        assert_eq!(parameters["required"], json!(["message"]));
        assert_eq!(parameters["properties"]["message"]["type"], "string");
        assert_eq!(
            parameters["properties"]["message"]["description"],
            "Text to echo back"
        );
        assert!(parameters.get("$schema").is_none());
        assert!(parameters.get("title").is_none());
    }

    #[tokio::test]
    async fn should_execute_tool_and_validate_name() {
        let input = ToolInput::new("echo".to_string())
            .with_argument("message", "test data")
            .unwrap();

        let output = EchoTool.execute(input).await.unwrap();
        assert_eq!(output.content(), "Echo: test data");

        let wrong = ToolInput::new("other".to_string());
        let error = EchoTool.execute(wrong).await.unwrap_err();
        assert!(error.message.contains("Expected tool 'echo', got 'other'"));
    }

    #[test]
    fn should_format_tool_error() {
        let error = ToolError::new("echo".to_string(), "boom".to_string());

        assert_eq!(error.to_string(), "Tool 'echo' error: boom");
    }
}
