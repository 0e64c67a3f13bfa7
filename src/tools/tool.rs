//! Tool trait and execution context.

use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::capabilities::SearchIndex;
use crate::error::ResearchError;
use crate::util::RateLimiter;

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Reference URL extracted from the originating request, if any.
    pub reference_url: Option<String>,
    pub tool_call_id: Option<String>,
    /// Operation budget of the enclosing execution session. Tools that make
    /// their own backend calls acquire from it before each call.
    pub limiter: Option<Arc<RateLimiter>>,
    /// Search index of the enclosing execution session.
    pub index: Arc<SearchIndex>,
}

impl ToolExecutionContext {
    /// Wait for the session's operation budget, if there is one.
    pub async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }
}

/// Core tool trait. Every lookup capability implements it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the backend calls).
    fn name(&self) -> &str;

    /// Human-readable description shown to the backend.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &AgentToolParameters;

    /// Execute the tool with parsed arguments.
    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ResearchError>;
}
