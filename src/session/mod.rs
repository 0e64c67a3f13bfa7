//! Orchestration: turn one research request into a task, run it, and report
//! the outcome as a [`ResultRecord`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::agent::AgentProfile;
use crate::capabilities::{build_capabilities, CapabilitySet};
use crate::config::{load_agent_config_file, OrchestratorConfig};
use crate::crew::{AgentGraph, ExecutionGuards, ExecutionSession, Process, TaskSpec};
use crate::error::{ResearchError, Result};
use crate::preprocess::extract_reference;
use crate::provider::create_backend;
use crate::types::GenerationSettings;

/// Error kind reported for every execution fault.
pub const SERVICE_ERROR: &str = "Service error";

/// One research request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestContext {
    pub url: Option<String>,
    pub query: String,
}

impl RequestContext {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            url: None,
            query: query.into(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Split raw user input into a reference URL and the remaining query.
    pub fn from_input(raw: &str) -> Self {
        let (url, query) = extract_reference(raw);
        Self { url, query }
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ResearchError::Validation("query is required".into()));
        }
        Ok(())
    }
}

/// Outcome of a research request.
///
/// Serializes as `{"success": true, "summary": ...}` or
/// `{"error": ..., "details": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireRecord", try_from = "WireRecord")]
pub enum ResultRecord {
    Success { summary: String },
    Failure { error_kind: String, details: String },
}

impl ResultRecord {
    pub fn service_error(details: impl Into<String>) -> Self {
        Self::Failure {
            error_kind: SERVICE_ERROR.to_string(),
            details: details.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireRecord {
    Success { success: bool, summary: String },
    Failure { error: String, details: String },
}

impl From<ResultRecord> for WireRecord {
    fn from(record: ResultRecord) -> Self {
        match record {
            ResultRecord::Success { summary } => Self::Success {
                success: true,
                summary,
            },
            ResultRecord::Failure {
                error_kind,
                details,
            } => Self::Failure {
                error: error_kind,
                details,
            },
        }
    }
}

impl TryFrom<WireRecord> for ResultRecord {
    type Error = String;

    fn try_from(wire: WireRecord) -> std::result::Result<Self, Self::Error> {
        match wire {
            WireRecord::Success {
                success: true,
                summary,
            } => Ok(Self::Success { summary }),
            WireRecord::Success { success: false, .. } => {
                Err("a result with a summary must have success = true".into())
            }
            WireRecord::Failure { error, details } => Ok(Self::Failure {
                error_kind: error,
                details,
            }),
        }
    }
}

/// Long-lived entry point. Holds the agent profile, built once, and the
/// capabilities it was built with.
#[derive(Debug)]
pub struct Orchestrator {
    profile: Arc<AgentProfile>,
    guards: ExecutionGuards,
    capabilities: Option<CapabilitySet>,
}

impl Orchestrator {
    /// Load the agent configuration, construct the backend and capabilities,
    /// and assemble the agent profile.
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        let agents = load_agent_config_file(&config.agents_path)?;
        let agent_config = agents.agent(&config.agent_id);
        let seed = agent_config.resolve();

        let backend_config = config
            .backend
            .clone()
            .with_llm_hints(agent_config.llm.as_ref(), config.model_override.as_deref());
        let backend = create_backend(&backend_config)?;
        let capabilities = build_capabilities(Arc::clone(&backend), &config.capabilities)?;

        let settings = GenerationSettings::builder()
            .temperature(backend_config.temperature)
            .build();
        let profile = AgentProfile::new(config.agent_id, seed, backend)
            .with_capabilities(capabilities.tools().to_vec())
            .with_settings(settings);

        info!(
            agent = %profile.id,
            role = %profile.role,
            model = %backend_config.model,
            capabilities = profile.capabilities.len(),
            "orchestrator ready"
        );
        Ok(Self {
            profile: Arc::new(profile),
            guards: config.guards,
            capabilities: Some(capabilities),
        })
    }

    /// Assemble from an already-built profile.
    pub fn from_parts(profile: AgentProfile, guards: ExecutionGuards) -> Self {
        Self {
            profile: Arc::new(profile),
            guards,
            capabilities: None,
        }
    }

    pub fn profile(&self) -> &Arc<AgentProfile> {
        &self.profile
    }

    pub fn guards(&self) -> &ExecutionGuards {
        &self.guards
    }

    pub fn capabilities(&self) -> Option<&CapabilitySet> {
        self.capabilities.as_ref()
    }

    pub fn new_session(&self, context: RequestContext) -> Session {
        Session {
            profile: Arc::clone(&self.profile),
            guards: self.guards.clone(),
            context,
        }
    }

    /// Preprocess raw user input and run it.
    pub async fn research(&self, raw: &str) -> Result<ResultRecord> {
        self.new_session(RequestContext::from_input(raw)).run().await
    }
}

/// State for a single request.
#[derive(Debug)]
pub struct Session {
    profile: Arc<AgentProfile>,
    guards: ExecutionGuards,
    context: RequestContext,
}

impl Session {
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Run the request.
    ///
    /// An empty query is the only `Err`; every execution fault is reported as
    /// a [`ResultRecord::Failure`].
    pub async fn run(&self) -> Result<ResultRecord> {
        self.context.validate()?;

        let query = self.context.query.trim();
        let url = self.context.url.as_deref();
        info!(query, url, "research request");

        let task = TaskSpec::new(query, self.profile.id.clone());
        let execution = ExecutionSession::new(
            AgentGraph::single(Arc::clone(&self.profile)),
            vec![task],
            Process::Hierarchical,
            self.guards.clone(),
        );

        match execution.execute(url).await {
            Ok(output) => {
                info!(
                    output_tokens = output.usage.output_tokens,
                    "research request completed"
                );
                Ok(ResultRecord::Success {
                    summary: output.final_output,
                })
            }
            Err(e) => {
                error!(error = %e, category = ?e.category(), "research request failed");
                Ok(ResultRecord::service_error(e.to_string()))
            }
        }
    }
}
