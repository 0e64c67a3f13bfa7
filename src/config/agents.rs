//! Agent configuration schema.
//!
//! The agents file is a YAML mapping from agent id to an optional set of
//! fields. Every field has a documented default, so a missing key never
//! fails; only a document that is not a mapping does.
//!
//! ```yaml
//! web_summarizer_agent:
//!   role: Web Content Summarizer
//!   goal: Create concise and accurate summaries of web content based on user queries
//!   backstory: ""
//!   llm:
//!     model: gemini-pro
//!     temperature: 0.1
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// Agent id used by the research assistant.
pub const DEFAULT_AGENT_ID: &str = "web_summarizer_agent";
pub const DEFAULT_ROLE: &str = "Web Content Summarizer";
pub const DEFAULT_GOAL: &str =
    "Create concise and accurate summaries of web content based on user queries";
pub const DEFAULT_BACKSTORY: &str = "";

/// Parsed agents file: agent id to its configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentsFile {
    agents: BTreeMap<String, Option<AgentConfig>>,
}

impl AgentsFile {
    /// Configuration for `agent_id`, or an all-defaults entry when absent.
    pub fn agent(&self, agent_id: &str) -> AgentConfig {
        self.agents
            .get(agent_id)
            .cloned()
            .flatten()
            .unwrap_or_default()
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }
}

/// Optional per-agent fields as written in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub role: Option<String>,
    pub goal: Option<String>,
    pub backstory: Option<String>,
    pub llm: Option<LlmConfig>,
}

/// Backend hints for an agent. Unrecognised keys are kept but unused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Fully resolved identity fields for an agent profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSeed {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Default for AgentSeed {
    fn default() -> Self {
        AgentConfig::default().resolve()
    }
}

impl AgentConfig {
    /// Substitute defaults for absent fields. Folded YAML scalars are trimmed.
    pub fn resolve(&self) -> AgentSeed {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .map(str::to_string)
                .unwrap_or_else(|| default.to_string())
        };
        AgentSeed {
            role: pick(&self.role, DEFAULT_ROLE),
            goal: pick(&self.goal, DEFAULT_GOAL),
            backstory: pick(&self.backstory, DEFAULT_BACKSTORY),
        }
    }
}

/// Parse an agents document.
pub fn load_agent_config(source: &str) -> Result<AgentsFile> {
    if source.trim().is_empty() {
        return Ok(AgentsFile::default());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(source)
        .map_err(|e| ResearchError::Config(format!("agents file is not valid YAML: {e}")))?;
    match value {
        serde_yaml::Value::Null => Ok(AgentsFile::default()),
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|e| ResearchError::Config(format!("invalid agents file: {e}"))),
        _ => Err(ResearchError::Config(
            "agents file must be a mapping from agent id to settings".into(),
        )),
    }
}

/// Read and parse an agents file from disk.
pub fn load_agent_config_file(path: impl AsRef<Path>) -> Result<AgentsFile> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ResearchError::Config(format!("cannot read agents file {}: {e}", path.display()))
    })?;
    load_agent_config(&raw)
}
