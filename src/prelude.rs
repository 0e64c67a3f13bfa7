//! Convenience re-exports for common use.

pub use crate::agent::AgentProfile;
pub use crate::capabilities::{build_capabilities, CapabilityKind, CapabilitySet};
pub use crate::config::{CapabilityPolicy, OrchestratorConfig};
pub use crate::crew::ExecutionGuards;
pub use crate::error::{ResearchError, Result};
pub use crate::provider::ModelProvider;
pub use crate::session::{Orchestrator, RequestContext, ResultRecord};
pub use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};
pub use crate::types::{GenerationSettings, ModelMessage, Role, Usage};
