//! Reasoning backend trait and implementations.

pub mod google;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::BackendConfig;
use crate::error::ResearchError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a reasoning backend.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition advertised to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a backend.
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by every reasoning backend.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g. "google").
    fn provider_name(&self) -> &str;

    /// The model ID this backend instance serves.
    fn model_id(&self) -> &str;

    /// Generate a single (non-streaming) response.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ResearchError>;
}

/// Construct the configured backend.
///
/// The API key must already be resolved; a missing key is an initialization error
/// surfaced before any prompt is shown.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn ModelProvider>, ResearchError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ResearchError::Initialization("Missing GEMINI_API_KEY for the reasoning backend".into())
    })?;
    let mut provider = google::GoogleProvider::new(config.model.clone(), api_key);
    if let Some(base_url) = &config.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(Arc::new(provider))
}
