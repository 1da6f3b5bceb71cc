pub mod agent;
pub mod conversation;
pub mod errors;
pub mod ingest;
pub mod logging;

pub use agent::{build_tool_registry, AgentService};
pub use conversation::Conversation;
pub use errors::AgentError;
