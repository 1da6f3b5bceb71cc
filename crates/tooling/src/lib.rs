pub mod registry;
pub mod research;
pub mod summarizer;
pub mod tool;
pub mod tools;

pub use registry::ToolRegistry;
pub use research::Researcher;
pub use summarizer::{PageSummary, Summarizer, SummaryError};
pub use tool::{parameters_schema, Tool, ToolError, ToolInput, ToolOutput};
pub use tools::{
    AddTwoNumbersTool, GetTextFromUrlTool, GetWebResultsTool, SearchDocumentsTool,
    SubtractTwoNumbersTool,
};
