use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::tool::{parameters_schema, Tool, ToolError, ToolInput, ToolOutput};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct AddArgs {
    /// The first number
    a: i64,
    /// The second number
    b: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct SubtractArgs {
    /// The number from which to subtract
    a: i64,
    /// The number to subtract
    b: i64,
}

pub struct AddTwoNumbersTool;

#[async_trait]
impl Tool for AddTwoNumbersTool {
    fn name(&self) -> &str {
        "add_two_numbers"
    }

    fn description(&self) -> &str {
        "Add two numbers"
    }

    fn parameters(&self) -> Value {
        parameters_schema::<AddArgs>()
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let AddArgs { a, b } = input.parse_arguments()?;
        let sum = a
            .checked_add(b)
            .ok_or_else(|| self.error(format!("{a} + {b} overflows")))?;
        Ok(ToolOutput {
            result: Value::from(sum),
        })
    }
}

pub struct SubtractTwoNumbersTool;

#[async_trait]
impl Tool for SubtractTwoNumbersTool {
    fn name(&self) -> &str {
        "subtract_two_numbers"
    }

    fn description(&self) -> &str {
        "Subtract two numbers"
    }

    fn parameters(&self) -> Value {
        parameters_schema::<SubtractArgs>()
    }

    async fn execute(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        self.validate_input(&input)?;
        let SubtractArgs { a, b } = input.parse_arguments()?;
        let difference = a
            .checked_sub(b)
            .ok_or_else(|| self.error(format!("{a} - {b} overflows")))?;
        Ok(ToolOutput {
            result: Value::from(difference),
        })
    }
}
