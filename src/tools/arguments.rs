//! Typed access to tool call arguments.

use crate::error::ResearchError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a required, non-blank string argument.
    pub fn get_str(&self, key: &str) -> Result<&str, ResearchError> {
        self.get_str_opt(key)
            .ok_or_else(|| ResearchError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument; blank strings count as absent.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Get an optional unsigned integer, accepting numeric strings as backends sometimes send them.
    pub fn get_u64_opt(&self, key: &str) -> Option<u64> {
        let value = self.value.get(key)?;
        value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    }
}
