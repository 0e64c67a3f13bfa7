//! Runtime configuration (layered: code > env > `.env` file > defaults).

pub mod agents;

pub use agents::{
    load_agent_config, load_agent_config_file, AgentConfig, AgentSeed, AgentsFile, LlmConfig,
    DEFAULT_AGENT_ID,
};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use strum::{Display, EnumString};

use crate::crew::ExecutionGuards;
use crate::error::{ResearchError, Result};

pub const DEFAULT_AGENTS_PATH: &str = "config/agents.yaml";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// How the capability registry reacts to a capability that cannot be constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CapabilityPolicy {
    /// Omit the capability and log a warning.
    #[default]
    Degraded,
    /// Fail construction with an initialization error.
    Strict,
}

/// Reasoning backend settings.
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub model: String,
    pub temperature: f64,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            base_url: None,
        }
    }
}

impl BackendConfig {
    /// Apply an agent's `llm` hints; an explicit override wins over the file.
    pub fn with_llm_hints(mut self, llm: Option<&LlmConfig>, model_override: Option<&str>) -> Self {
        if let Some(model) = model_override.or_else(|| llm.and_then(|l| l.model.as_deref())) {
            self.model = model.to_string();
        }
        if let Some(temperature) = llm.and_then(|l| l.temperature) {
            self.temperature = temperature;
        }
        self
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Credentials and endpoints for the lookup capabilities.
#[derive(Clone, PartialEq)]
pub struct CapabilityConfig {
    pub policy: CapabilityPolicy,
    pub exa_api_key: Option<String>,
    pub exa_base_url: Option<String>,
    pub github_token: Option<String>,
    pub github_base_url: Option<String>,
    pub directory_root: PathBuf,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            policy: CapabilityPolicy::default(),
            exa_api_key: None,
            exa_base_url: None,
            github_token: None,
            github_base_url: None,
            directory_root: PathBuf::from("."),
        }
    }
}

impl fmt::Debug for CapabilityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityConfig")
            .field("policy", &self.policy)
            .field("exa_api_key", &self.exa_api_key.as_ref().map(|_| "<redacted>"))
            .field("exa_base_url", &self.exa_base_url)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("github_base_url", &self.github_base_url)
            .field("directory_root", &self.directory_root)
            .finish()
    }
}

/// Everything needed to build an [`crate::session::Orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub agents_path: PathBuf,
    pub agent_id: String,
    pub backend: BackendConfig,
    /// Model forced from the environment, taking precedence over the agents file.
    pub model_override: Option<String>,
    pub capabilities: CapabilityConfig,
    pub guards: ExecutionGuards,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agents_path: PathBuf::from(DEFAULT_AGENTS_PATH),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            backend: BackendConfig::default(),
            model_override: None,
            capabilities: CapabilityConfig::default(),
            guards: ExecutionGuards::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // a missing .env is fine
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get("RESEARCH_AGENTS_CONFIG") {
            config.agents_path = PathBuf::from(path);
        }
        config.model_override = get("RESEARCH_MODEL");

        config.backend.api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));
        config.backend.base_url = get("GEMINI_BASE_URL");

        let caps = &mut config.capabilities;
        if let Some(policy) = get("RESEARCH_CAPABILITY_POLICY") {
            caps.policy = CapabilityPolicy::from_str(&policy).map_err(|_| {
                ResearchError::Config(format!(
                    "RESEARCH_CAPABILITY_POLICY must be 'degraded' or 'strict', got '{policy}'"
                ))
            })?;
        }
        caps.exa_api_key = get("EXA_API_KEY");
        caps.exa_base_url = get("EXA_BASE_URL");
        caps.github_token = get("GITHUB_TOKEN").or_else(|| get("GH_TOKEN"));
        caps.github_base_url = get("GITHUB_API_BASE_URL");
        if let Some(root) = get("RESEARCH_DIRECTORY_ROOT") {
            caps.directory_root = PathBuf::from(root);
        }

        Ok(config)
    }
}
