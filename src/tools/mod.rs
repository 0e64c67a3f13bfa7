//! Tool system for backend function calling.

pub mod arguments;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use tool::{Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
