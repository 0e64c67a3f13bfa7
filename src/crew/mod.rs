//! Task execution: a small graph of agents, the tasks given to them, and the
//! guards (rate limit, per-task timeout) applied while they run.

use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use tracing::{debug, info};
use uuid::Uuid;

use crate::agent::{perform_task, AgentProfile, TaskOutput};
use crate::capabilities::IndexScope;
use crate::error::{ResearchError, Result};
use crate::tools::ToolExecutionContext;
use crate::types::Usage;
use crate::util::{with_timeout, RateLimiter};

pub const DEFAULT_EXPECTED_OUTPUT: &str = "A concise and relevant summary.";
pub const DEFAULT_MAX_RPM: u32 = 20;
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(600);

/// One unit of work for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct TaskSpec {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,
    #[builder(into)]
    pub description: String,
    #[builder(into, default = DEFAULT_EXPECTED_OUTPUT.to_string())]
    pub expected_output: String,
    #[builder(into)]
    pub assigned_agent: String,
}

impl TaskSpec {
    /// Task with the default expected output.
    pub fn new(description: impl Into<String>, assigned_agent: impl Into<String>) -> Self {
        Self::builder()
            .description(description)
            .assigned_agent(assigned_agent)
            .build()
    }
}

/// Limits applied to an execution session.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ExecutionGuards {
    /// Backend and tool operations allowed per minute; zero disables the limit.
    #[builder(default = DEFAULT_MAX_RPM)]
    pub max_rpm: u32,
    #[builder(default = DEFAULT_TASK_TIMEOUT)]
    pub task_timeout: Duration,
}

impl Default for ExecutionGuards {
    fn default() -> Self {
        Self {
            max_rpm: DEFAULT_MAX_RPM,
            task_timeout: DEFAULT_TASK_TIMEOUT,
        }
    }
}

/// How tasks are routed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Process {
    /// Each task goes straight to its assigned agent.
    Sequential,
    /// The graph's manager receives every task and delegates it to the
    /// assigned agent, or performs it itself when that agent is not in the graph.
    Hierarchical,
}

/// Agents available to a session, keyed by profile id, plus which of them
/// manages the others.
#[derive(Debug, Clone, Default)]
pub struct AgentGraph {
    nodes: Vec<Arc<AgentProfile>>,
    manager: Option<String>,
}

impl AgentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph of one agent that also manages itself.
    pub fn single(profile: Arc<AgentProfile>) -> Self {
        let manager = profile.id.clone();
        Self {
            nodes: vec![profile],
            manager: Some(manager),
        }
    }

    pub fn with_agent(mut self, profile: Arc<AgentProfile>) -> Self {
        self.nodes.push(profile);
        self
    }

    pub fn with_manager(mut self, id: impl Into<String>) -> Self {
        self.manager = Some(id.into());
        self
    }

    pub fn agent(&self, id: &str) -> Option<&Arc<AgentProfile>> {
        self.nodes.iter().find(|p| p.id == id)
    }

    pub fn manager(&self) -> Option<&Arc<AgentProfile>> {
        self.manager.as_deref().and_then(|id| self.agent(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Result of running every task in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutput {
    /// Output of the last task.
    pub final_output: String,
    pub task_outputs: Vec<TaskOutput>,
    pub usage: Usage,
}

/// Tasks bound to a graph and process for one request.
#[derive(Debug)]
pub struct ExecutionSession {
    pub graph: AgentGraph,
    pub tasks: Vec<TaskSpec>,
    pub process: Process,
    pub guards: ExecutionGuards,
}

impl ExecutionSession {
    pub fn new(graph: AgentGraph, tasks: Vec<TaskSpec>, process: Process, guards: ExecutionGuards) -> Self {
        Self {
            graph,
            tasks,
            process,
            guards,
        }
    }

    /// Run all tasks in order. Each task gets the full timeout; the rate
    /// limit and the search index span the whole session, and the index is
    /// cleared when it ends.
    pub async fn execute(&self, reference_url: Option<&str>) -> Result<SessionOutput> {
        if self.tasks.is_empty() {
            return Err(ResearchError::Service("no tasks to execute".into()));
        }
        let scope = IndexScope::new();
        let limiter = Arc::new(RateLimiter::per_minute(self.guards.max_rpm));
        let ctx = ToolExecutionContext {
            reference_url: reference_url.map(str::to_string),
            tool_call_id: None,
            limiter: Some(limiter),
            index: Arc::clone(scope.index()),
        };

        let mut task_outputs = Vec::with_capacity(self.tasks.len());
        let mut usage = Usage::default();
        for task in &self.tasks {
            let agent = self.route(task)?;
            info!(task_id = %task.id, agent = %agent.id, "task started");
            let output = with_timeout(self.guards.task_timeout, perform_task(agent, task, &ctx)).await?;
            debug!(
                task_id = %task.id,
                iterations = output.iterations,
                tool_calls = output.tool_calls,
                "task finished"
            );
            usage.merge(&output.usage);
            task_outputs.push(output);
        }

        let final_output = task_outputs
            .last()
            .map(|o| o.text.clone())
            .unwrap_or_default();
        Ok(SessionOutput {
            final_output,
            task_outputs,
            usage,
        })
    }

    fn route(&self, task: &TaskSpec) -> Result<&Arc<AgentProfile>> {
        match &self.process {
            Process::Sequential => self.graph.agent(&task.assigned_agent).ok_or_else(|| {
                ResearchError::Service(format!("no agent '{}' for task", task.assigned_agent))
            }),
            Process::Hierarchical => {
                let manager = self.graph.manager().ok_or_else(|| {
                    ResearchError::Service("hierarchical process needs a manager in the graph".into())
                })?;
                let delegate = self.graph.agent(&task.assigned_agent).unwrap_or(manager);
                if delegate.id != manager.id {
                    debug!(manager = %manager.id, delegate = %delegate.id, "task delegated");
                }
                Ok(delegate)
            }
        }
    }
}
