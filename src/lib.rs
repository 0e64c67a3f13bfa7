//! Research Assistant: a single-agent research and summarization orchestrator.
//!
//! A query (optionally containing a reference URL) is turned into one task
//! for a research agent. The agent reasons with a Gemini backend and can call
//! lookup capabilities: site search, external web search, code repository
//! search and directory search.
//!
//! # Quick Start
//!
//! ```no_run
//! use research_assistant::prelude::*;
//!
//! # async fn example() -> research_assistant::error::Result<()> {
//! let orchestrator = Orchestrator::new(OrchestratorConfig::from_env()?)?;
//! let record = orchestrator
//!     .new_session(RequestContext::new("What is quantum computing?"))
//!     .run()
//!     .await?;
//! println!("{}", serde_json::to_string(&record)?);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod capabilities;
pub mod config;
pub mod crew;
pub mod driver;
pub mod error;
pub mod preprocess;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod tools;
pub mod types;
pub mod util;
