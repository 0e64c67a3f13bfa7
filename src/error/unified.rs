//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Initialization,
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Serialization,
    ToolExecution,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    FixInput,
    CheckCredentials,
    CheckConfiguration,
    TryAgainLater,
    NarrowQuery,
    CheckCapability,
    None,
}

impl RecoverySuggestion {
    /// Short operator-facing hint, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FixInput => Some("Enter a non-empty research query."),
            Self::CheckCredentials => {
                Some("Set GEMINI_API_KEY (and optionally EXA_API_KEY, GITHUB_TOKEN) in the environment or .env")
            }
            Self::CheckConfiguration => {
                Some("Check config/agents.yaml or the path in RESEARCH_AGENTS_CONFIG")
            }
            Self::TryAgainLater => Some("The service is busy or unreachable; try again shortly."),
            Self::NarrowQuery => Some("Try a narrower query."),
            Self::CheckCapability => Some("A lookup capability failed; check its credentials."),
            Self::None => None,
        }
    }
}
