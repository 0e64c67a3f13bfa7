//! Tool loop: ask the backend, run the tools it requests, feed the results
//! back, until it produces a final answer.

use tracing::{debug, warn};

use super::profile::AgentProfile;
use crate::crew::TaskSpec;
use crate::error::ResearchError;
use crate::provider::ProviderRequest;
use crate::tools::{ToolArguments, ToolExecutionContext};
use crate::types::{AgentToolCall, AgentToolResult, ModelMessage, Usage};

/// Maximum tool loop iterations to prevent infinite loops.
const MAX_TOOL_ITERATIONS: usize = 20;

/// What an agent produced for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutput {
    pub text: String,
    pub usage: Usage,
    pub iterations: usize,
    pub tool_calls: usize,
}

/// Carry out `task` as `profile`.
///
/// Tool failures are reported back to the backend as error results and do not
/// abort the task; backend failures do, and so does running out of iterations
/// without a final answer.
pub async fn perform_task(
    profile: &AgentProfile,
    task: &TaskSpec,
    ctx: &ToolExecutionContext,
) -> Result<TaskOutput, ResearchError> {
    let mut messages = vec![
        ModelMessage::system(profile.system_prompt()),
        ModelMessage::user(task_prompt(task, ctx.reference_url.as_deref())),
    ];
    let tool_defs = profile.tool_definitions();

    let mut usage = Usage::default();
    let mut tool_calls = 0;

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: profile.settings.clone(),
            tools: tool_defs.clone(),
        };

        ctx.throttle().await;
        debug!(iteration, agent = %profile.id, "calling backend");
        let response = profile.backend.generate_text(&request).await?;
        usage.merge(&response.usage);

        if response.tool_calls.is_empty() {
            let text = response.text.trim().to_string();
            if text.is_empty() {
                return Err(ResearchError::Service(
                    "backend returned an empty answer".into(),
                ));
            }
            return Ok(TaskOutput {
                text,
                usage,
                iterations: iteration + 1,
                tool_calls,
            });
        }

        messages.push(ModelMessage::assistant_tool_calls(
            &response.text,
            &response.tool_calls,
        ));
        for call in &response.tool_calls {
            tool_calls += 1;
            let result = invoke_tool(profile, call, ctx).await;
            messages.push(ModelMessage::tool_result(result));
        }
    }

    // narration accompanying a tool request is not an answer
    warn!(agent = %profile.id, limit = MAX_TOOL_ITERATIONS, "tool loop limit reached");
    Err(ResearchError::Service(format!(
        "no final answer after {MAX_TOOL_ITERATIONS} tool iterations"
    )))
}

async fn invoke_tool(
    profile: &AgentProfile,
    call: &AgentToolCall,
    ctx: &ToolExecutionContext,
) -> AgentToolResult {
    let outcome = match profile.capability(&call.name) {
        Some(tool) => {
            let args = ToolArguments::new(call.arguments.clone());
            let call_ctx = ToolExecutionContext {
                tool_call_id: Some(call.id.clone()),
                ..ctx.clone()
            };
            ctx.throttle().await;
            debug!(tool = %call.name, "executing tool");
            tool.execute(&args, &call_ctx).await
        }
        None => Err(ResearchError::tool(
            call.name.clone(),
            format!("Tool '{}' not found", call.name),
        )),
    };

    match outcome {
        Ok(result) => AgentToolResult {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            result,
            is_error: false,
        },
        Err(e) => {
            warn!(tool = %call.name, error = %e, "tool execution failed");
            AgentToolResult {
                tool_call_id: call.id.clone(),
                tool_name: call.name.clone(),
                result: serde_json::json!({ "error": e.to_string() }),
                is_error: true,
            }
        }
    }
}

fn task_prompt(task: &TaskSpec, reference_url: Option<&str>) -> String {
    let mut prompt = task.description.clone();
    if let Some(url) = reference_url {
        prompt.push_str(&format!(
            "\n\nReference URL: {url}\nThe site_search tool searches this page when no website is given."
        ));
    }
    prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
    prompt.push_str(&task.expected_output);
    prompt
}
