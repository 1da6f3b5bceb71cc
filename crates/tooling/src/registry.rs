use crate::tool::{Tool, ToolError, ToolInput, ToolOutput};
use anyhow::Result;
use llm::ToolDefinition;
use std::collections::HashMap;
use std::sync::Arc;

pub type BoxedTool = Box<dyn Tool>;

/// Tools by exact name. Registration order is kept so definitions go to the model in a
/// stable order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: BoxedTool) -> Result<()> {
        let name = tool.name().to_string();

        if self.index.contains_key(&name) {
            anyhow::bail!("Tool '{}' is already registered", name);
        }

        self.index.insert(name, self.tools.len());
        self.tools.push(Arc::from(tool));
        Ok(())
    }

    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    pub fn list_tools(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name().to_string()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    pub async fn execute_tool(&self, input: ToolInput) -> Result<ToolOutput, ToolError> {
        let tool = self.get_tool(&input.name).ok_or_else(|| {
            ToolError::new(
                input.name.clone(),
                format!("Tool '{}' not found in registry", input.name),
            )
        })?;

        tool.execute(input).await
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}
