//! Agent persona plus the resources it works with.

use std::fmt;
use std::sync::Arc;

use crate::config::AgentSeed;
use crate::provider::{ModelProvider, ToolDefinition};
use crate::tools::Tool;
use crate::types::GenerationSettings;

/// Immutable description of one agent. Built once per orchestrator and
/// shared by every session it runs.
pub struct AgentProfile {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub capabilities: Vec<Arc<dyn Tool>>,
    pub backend: Arc<dyn ModelProvider>,
    pub settings: GenerationSettings,
}

impl AgentProfile {
    pub fn new(id: impl Into<String>, seed: AgentSeed, backend: Arc<dyn ModelProvider>) -> Self {
        Self {
            id: id.into(),
            role: seed.role,
            goal: seed.goal,
            backstory: seed.backstory,
            capabilities: Vec::new(),
            backend,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<Arc<dyn Tool>>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn capability(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.capabilities.iter().find(|t| t.name() == name)
    }

    /// System prompt presenting the persona to the backend.
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!("You are {}.", self.role);
        if !self.backstory.is_empty() {
            prompt.push(' ');
            prompt.push_str(&self.backstory);
        }
        prompt.push_str("\nYour personal goal is: ");
        prompt.push_str(&self.goal);
        if !self.capabilities.is_empty() {
            prompt.push_str(
                "\nYou can call the provided tools to look things up. \
                 Use them when the task needs information you do not have.",
            );
        }
        prompt
    }

    /// Tool definitions advertised to the backend, or `None` when there are none.
    pub fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.capabilities.is_empty() {
            return None;
        }
        Some(
            self.capabilities
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters().schema.clone(),
                })
                .collect(),
        )
    }
}

impl fmt::Debug for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentProfile")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field(
                "capabilities",
                &self.capabilities.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .field("backend", &self.backend.model_id())
            .field("settings", &self.settings)
            .finish()
    }
}
