//! Tests for the orchestration session and task execution.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use common::{profile, profile_with_tools, user_prompt, MockProvider};
use research_assistant::capabilities::DirectorySearchTool;
use research_assistant::crew::{AgentGraph, ExecutionGuards, ExecutionSession, Process, TaskSpec};
use research_assistant::error::ResearchError;
use research_assistant::session::{Orchestrator, RequestContext, ResultRecord};
use research_assistant::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};
use research_assistant::types::{ContentPart, Role};

/// Records the context of every call and echoes its query.
struct RecordingTool {
    parameters: AgentToolParameters,
    seen_urls: Mutex<Vec<Option<String>>>,
}

impl RecordingTool {
    fn new() -> Self {
        Self {
            parameters: AgentToolParameters::object()
                .string("search_query", "query", true)
                .build(),
            seen_urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        "site_search"
    }

    fn description(&self) -> &str {
        "records calls"
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ResearchError> {
        self.seen_urls.lock().unwrap().push(ctx.reference_url.clone());
        Ok(serde_json::json!({ "answer": format!("found {}", args.get_str("search_query")?) }))
    }
}

#[tokio::test]
async fn blank_query_is_rejected_before_any_backend_call() {
    let provider = Arc::new(MockProvider::new());
    let orchestrator = Orchestrator::from_parts(profile(provider.clone()), ExecutionGuards::default());

    let err = orchestrator
        .new_session(RequestContext::new("  \t "))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Validation(_)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn successful_run_returns_summary() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("Quantum computers use qubits to explore many states at once.");
    let orchestrator = Orchestrator::from_parts(profile(provider.clone()), ExecutionGuards::default());

    let record = orchestrator
        .new_session(RequestContext::new("What is quantum computing?"))
        .run()
        .await
        .unwrap();

    assert_eq!(
        record,
        ResultRecord::Success {
            summary: "Quantum computers use qubits to explore many states at once.".into()
        }
    );
    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(user_prompt(&requests[0]).starts_with("What is quantum computing?"));
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert!(requests[0].messages[0].text().contains("Web Content Summarizer"));
}

#[tokio::test]
async fn backend_fault_becomes_service_error() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_error("backend unavailable");
    let orchestrator = Orchestrator::from_parts(profile(provider), ExecutionGuards::default());

    let record = orchestrator.research("What is Rust?").await.unwrap();

    match record {
        ResultRecord::Failure {
            error_kind,
            details,
        } => {
            assert_eq!(error_kind, "Service error");
            assert!(details.contains("backend unavailable"), "details: {details}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_task_times_out_as_failure() {
    let provider = Arc::new(MockProvider::new().with_delay(Duration::from_secs(700)));
    provider.queue_response("too late");
    let orchestrator = Orchestrator::from_parts(profile(provider), ExecutionGuards::default());

    let record = orchestrator.research("Summarize the history of computing").await.unwrap();

    assert_eq!(record, ResultRecord::service_error("Task timeout after 600s"));
}

#[tokio::test]
async fn reference_url_reaches_tools_but_not_task_description() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_tool_call("call-1", "site_search", serde_json::json!({"search_query": "main points"}));
    provider.queue_response("The page covers three points.");
    let tool = Arc::new(RecordingTool::new());
    let as_tool: Arc<dyn Tool> = tool.clone();
    let orchestrator = Orchestrator::from_parts(
        profile_with_tools(provider.clone(), vec![as_tool]),
        ExecutionGuards::default(),
    );

    let record = orchestrator
        .research("Analyze https://example.com/page and summarize it")
        .await
        .unwrap();

    assert!(record.is_success());
    assert_eq!(
        *tool.seen_urls.lock().unwrap(),
        vec![Some("https://example.com/page".to_string())]
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(user_prompt(&requests[0]).starts_with("Analyze  and summarize it"));
    let tool_turn = requests[1].messages.last().unwrap();
    assert_eq!(tool_turn.role, Role::Tool);
    match &tool_turn.content[0] {
        ContentPart::ToolResult(result) => {
            assert!(!result.is_error);
            assert_eq!(result.result["answer"], "found main points");
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_tool_is_reported_back_to_backend() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_tool_call("call-1", "no_such_tool", serde_json::json!({}));
    provider.queue_response("Answered without tools.");
    let orchestrator = Orchestrator::from_parts(profile(provider.clone()), ExecutionGuards::default());

    let record = orchestrator.research("What is Rust?").await.unwrap();

    assert_eq!(
        record,
        ResultRecord::Success {
            summary: "Answered without tools.".into()
        }
    );
    let requests = provider.requests();
    match &requests[1].messages.last().unwrap().content[0] {
        ContentPart::ToolResult(result) => {
            assert!(result.is_error);
            assert!(result.result["error"].as_str().unwrap().contains("not found"));
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn operations_over_budget_are_throttled_not_failed() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_tool_call("call-1", "site_search", serde_json::json!({"search_query": "a"}));
    provider.queue_tool_call("call-2", "site_search", serde_json::json!({"search_query": "b"}));
    provider.queue_response("done");
    let guards = ExecutionGuards::builder().max_rpm(2).build();
    let tool: Arc<dyn Tool> = Arc::new(RecordingTool::new());
    let orchestrator = Orchestrator::from_parts(
        profile_with_tools(provider, vec![tool]),
        guards,
    );

    let start = tokio::time::Instant::now();
    let record = orchestrator.research("What is Rust?").await.unwrap();

    assert!(record.is_success());
    assert!(start.elapsed() >= Duration::from_secs(60));
}

#[tokio::test]
async fn tool_loop_without_final_answer_is_a_failure() {
    let provider = Arc::new(MockProvider::new());
    for i in 0..20 {
        provider.queue_tool_call(
            &format!("call-{i}"),
            "site_search",
            serde_json::json!({"search_query": "more"}),
        );
    }
    let tool: Arc<dyn Tool> = Arc::new(RecordingTool::new());
    let guards = ExecutionGuards::builder().max_rpm(0).build();
    let orchestrator = Orchestrator::from_parts(profile_with_tools(provider.clone(), vec![tool]), guards);

    let record = orchestrator.research("What is Rust?").await.unwrap();

    assert_eq!(
        record,
        ResultRecord::service_error("no final answer after 20 tool iterations")
    );
    assert_eq!(provider.call_count(), 20);
}

#[tokio::test]
async fn directory_changes_are_visible_to_the_next_request() {
    let dir = tempfile::Builder::new().prefix("session").tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "aardvark notes").unwrap();

    let provider = Arc::new(MockProvider::new());
    for round in 0..2 {
        provider.queue_tool_call(
            &format!("call-{round}"),
            "directory_search",
            serde_json::json!({"search_query": "zebra"}),
        );
        provider.queue_response("done");
    }
    let tool: Arc<dyn Tool> = Arc::new(DirectorySearchTool::new(dir.path()));
    let orchestrator = Orchestrator::from_parts(
        profile_with_tools(provider.clone(), vec![tool]),
        ExecutionGuards::default(),
    );

    assert!(orchestrator.research("Any zebra notes?").await.unwrap().is_success());
    std::fs::write(dir.path().join("b.txt"), "zebra facts").unwrap();
    assert!(orchestrator.research("Any zebra notes now?").await.unwrap().is_success());

    let requests = provider.requests();
    assert_eq!(requests.len(), 4);
    let matches = |request: &research_assistant::provider::ProviderRequest| -> serde_json::Value {
        match &request.messages.last().unwrap().content[0] {
            ContentPart::ToolResult(result) => result.result["matches"].clone(),
            other => panic!("expected tool result, got {other:?}"),
        }
    };
    assert_eq!(matches(&requests[1]), serde_json::json!([]));
    assert_eq!(matches(&requests[3])[0]["path"], "b.txt");
}

#[tokio::test]
async fn sessions_share_one_profile() {
    let provider = Arc::new(MockProvider::new());
    provider.queue_response("first");
    provider.queue_response("second");
    let orchestrator = Orchestrator::from_parts(profile(provider), ExecutionGuards::default());

    let first = orchestrator.new_session(RequestContext::new("one"));
    let second = orchestrator.new_session(RequestContext::new("two"));

    assert_eq!(
        first.run().await.unwrap(),
        ResultRecord::Success { summary: "first".into() }
    );
    assert_eq!(
        second.run().await.unwrap(),
        ResultRecord::Success { summary: "second".into() }
    );
    assert_eq!(Arc::strong_count(orchestrator.profile()), 3);
    drop(first);
    drop(second);
    assert_eq!(Arc::strong_count(orchestrator.profile()), 1);
}

#[tokio::test]
async fn manager_delegates_to_assigned_agent() {
    let manager_backend = Arc::new(MockProvider::new());
    let researcher_backend = Arc::new(MockProvider::new());
    researcher_backend.queue_response("delegated answer");

    let manager = Arc::new(profile(manager_backend.clone()));
    let mut researcher = profile(researcher_backend.clone());
    researcher.id = "researcher".into();

    let graph = AgentGraph::single(manager).with_agent(Arc::new(researcher));
    let session = ExecutionSession::new(
        graph,
        vec![TaskSpec::new("Explain tokio", "researcher")],
        Process::Hierarchical,
        ExecutionGuards::default(),
    );

    let output = session.execute(None).await.unwrap();
    assert_eq!(output.final_output, "delegated answer");
    assert_eq!(manager_backend.call_count(), 0);
    assert_eq!(researcher_backend.call_count(), 1);
}

#[tokio::test]
async fn manager_performs_task_for_unknown_agent() {
    let backend = Arc::new(MockProvider::new());
    backend.queue_response("manager answer");
    let session = ExecutionSession::new(
        AgentGraph::single(Arc::new(profile(backend))),
        vec![TaskSpec::new("Explain tokio", "nobody")],
        Process::Hierarchical,
        ExecutionGuards::default(),
    );

    let output = session.execute(None).await.unwrap();
    assert_eq!(output.final_output, "manager answer");
    assert_eq!(output.usage.total_tokens, 30);
}

#[tokio::test]
async fn graph_manager_handles_tasks_for_unknown_agents() {
    let first_backend = Arc::new(MockProvider::new());
    let lead_backend = Arc::new(MockProvider::new());
    lead_backend.queue_response("lead answer");

    let mut lead = profile(lead_backend.clone());
    lead.id = "lead".into();
    let graph = AgentGraph::new()
        .with_agent(Arc::new(profile(first_backend.clone())))
        .with_agent(Arc::new(lead))
        .with_manager("lead");
    assert_eq!(graph.manager().unwrap().id, "lead");

    let session = ExecutionSession::new(
        graph,
        vec![TaskSpec::new("Explain tokio", "nobody")],
        Process::Hierarchical,
        ExecutionGuards::default(),
    );

    let output = session.execute(None).await.unwrap();
    assert_eq!(output.final_output, "lead answer");
    assert_eq!(first_backend.call_count(), 0);
    assert_eq!(lead_backend.call_count(), 1);
}

#[tokio::test]
async fn hierarchical_process_needs_a_manager() {
    let backend = Arc::new(MockProvider::new());
    let session = ExecutionSession::new(
        AgentGraph::new().with_agent(Arc::new(profile(backend.clone()))),
        vec![TaskSpec::new("Explain tokio", "web_summarizer_agent")],
        Process::Hierarchical,
        ExecutionGuards::default(),
    );

    let err = session.execute(None).await.unwrap_err();
    assert!(err.to_string().contains("manager"));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn sequential_process_requires_assigned_agent() {
    let backend = Arc::new(MockProvider::new());
    let session = ExecutionSession::new(
        AgentGraph::single(Arc::new(profile(backend.clone()))),
        vec![TaskSpec::new("Explain tokio", "nobody")],
        Process::Sequential,
        ExecutionGuards::default(),
    );

    let err = session.execute(None).await.unwrap_err();
    assert!(err.to_string().contains("nobody"));
    assert_eq!(backend.call_count(), 0);
}
