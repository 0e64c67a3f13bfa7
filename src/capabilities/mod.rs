//! Capability registry: the lookup tools offered to the research agent.
//!
//! Capabilities are built in a fixed order (site search, external search,
//! code search, directory search). One whose credential is missing is either
//! omitted with a warning or rejected, depending on [`CapabilityPolicy`].

pub mod code_search;
pub mod directory_search;
pub mod external_search;
pub mod index;
pub mod site_search;

pub use code_search::CodeSearchTool;
pub use directory_search::DirectorySearchTool;
pub use external_search::ExternalSearchTool;
pub use index::{IndexScope, SearchIndex};
pub use site_search::SiteSearchTool;

use std::sync::Arc;

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{info, warn};

use crate::config::{CapabilityConfig, CapabilityPolicy};
use crate::error::{ResearchError, Result};
use crate::provider::ModelProvider;
use crate::tools::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CapabilityKind {
    SiteSearch,
    ExternalSearch,
    CodeRepoSearch,
    DirectorySearch,
}

/// A capability left out of the set, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmittedCapability {
    pub kind: CapabilityKind,
    pub reason: String,
}

/// The constructed capabilities. Tools that index content use the index of
/// the execution that calls them, so the set itself holds no indexed state.
#[derive(Default)]
pub struct CapabilitySet {
    tools: Vec<Arc<dyn Tool>>,
    kinds: Vec<CapabilityKind>,
    omitted: Vec<OmittedCapability>,
}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Kinds present, in registry order.
    pub fn kinds(&self) -> &[CapabilityKind] {
        &self.kinds
    }

    pub fn omitted(&self) -> &[OmittedCapability] {
        &self.omitted
    }

    fn push(&mut self, kind: CapabilityKind, tool: Arc<dyn Tool>) {
        self.kinds.push(kind);
        self.tools.push(tool);
    }

    fn omit(&mut self, policy: CapabilityPolicy, kind: CapabilityKind, reason: &str) -> Result<()> {
        if policy == CapabilityPolicy::Strict {
            return Err(ResearchError::Initialization(format!(
                "capability {kind} unavailable: {reason}"
            )));
        }
        warn!(capability = %kind, reason, "capability omitted");
        self.omitted.push(OmittedCapability {
            kind,
            reason: reason.to_string(),
        });
        Ok(())
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("kinds", &self.kinds)
            .field("omitted", &self.omitted)
            .finish()
    }
}

/// Build every capability the configuration allows.
pub fn build_capabilities(
    backend: Arc<dyn ModelProvider>,
    config: &CapabilityConfig,
) -> Result<CapabilitySet> {
    let mut set = CapabilitySet::empty();

    for kind in CapabilityKind::iter() {
        match kind {
            CapabilityKind::SiteSearch => {
                let tool = SiteSearchTool::new(Arc::clone(&backend));
                set.push(kind, Arc::new(tool));
            }
            CapabilityKind::ExternalSearch => match &config.exa_api_key {
                Some(key) => {
                    let mut tool = ExternalSearchTool::new(key.clone());
                    if let Some(base) = &config.exa_base_url {
                        tool = tool.with_base_url(base.clone());
                    }
                    set.push(kind, Arc::new(tool));
                }
                None => set.omit(config.policy, kind, "EXA_API_KEY is not set")?,
            },
            CapabilityKind::CodeRepoSearch => match &config.github_token {
                Some(token) => {
                    let mut tool = CodeSearchTool::new(token.clone());
                    if let Some(base) = &config.github_base_url {
                        tool = tool.with_base_url(base.clone());
                    }
                    set.push(kind, Arc::new(tool));
                }
                None => set.omit(config.policy, kind, "GITHUB_TOKEN is not set")?,
            },
            CapabilityKind::DirectorySearch => {
                if config.directory_root.is_dir() {
                    let tool = DirectorySearchTool::new(config.directory_root.clone());
                    set.push(kind, Arc::new(tool));
                } else {
                    let reason = format!("{} is not a directory", config.directory_root.display());
                    set.omit(config.policy, kind, &reason)?;
                }
            }
        }
    }

    info!(
        available = ?set.kinds,
        omitted = set.omitted.len(),
        "capabilities ready"
    );
    Ok(set)
}
