//! The research agent: a profile (persona, backend, capabilities) and the
//! tool loop that carries out one task with it.

pub mod executor;
pub mod profile;

pub use executor::{perform_task, TaskOutput};
pub use profile::AgentProfile;
