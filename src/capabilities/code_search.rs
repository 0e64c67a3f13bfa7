//! Code repository search over the GitHub search API.

use async_trait::async_trait;
use serde::Deserialize;
use strum::{AsRefStr, EnumString};
use tracing::debug;

use crate::error::ResearchError;
use crate::provider::http::{normalize_base_url, shared_client, status_to_error};
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

pub const NAME: &str = "code_repo_search";
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
const PER_PAGE: &str = "5";
const API_VERSION: &str = "2022-11-28";

/// What kind of GitHub object to search for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentType {
    #[default]
    Repo,
    Code,
    Issue,
}

impl ContentType {
    fn endpoint(self) -> &'static str {
        match self {
            Self::Repo => "repositories",
            Self::Code => "code",
            Self::Issue => "issues",
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub struct CodeSearchTool {
    token: String,
    base_url: String,
    parameters: AgentToolParameters,
}

impl CodeSearchTool {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            parameters: AgentToolParameters::object()
                .string("search_query", "What to search for on GitHub", true)
                .string_enum(
                    "content_type",
                    "Kind of result: repositories, code or issues (default repo)",
                    &["repo", "code", "issue"],
                    false,
                )
                .string(
                    "github_repo",
                    "Restrict the search to one repository, as owner/name",
                    false,
                )
                .build(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

#[async_trait]
impl Tool for CodeSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search GitHub repositories, code or issues."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ResearchError> {
        let query = args.get_str("search_query")?;
        let content_type = match args.get_str_opt("content_type") {
            Some(raw) => raw.parse::<ContentType>().map_err(|_| {
                ResearchError::InvalidArgument(format!(
                    "content_type must be one of repo, code, issue; got '{raw}'"
                ))
            })?,
            None => ContentType::default(),
        };
        let q = match args.get_str_opt("github_repo") {
            Some(repo) => format!("{query} repo:{repo}"),
            None => query.to_string(),
        };

        debug!(query = %q, content_type = content_type.as_ref(), "code search");
        let resp = shared_client()
            .get(format!("{}/search/{}", self.base_url, content_type.endpoint()))
            .query(&[("q", q.as_str()), ("per_page", PER_PAGE)])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &text));
        }

        let data: SearchResponse = resp.json().await?;
        let items: Vec<serde_json::Value> = data
            .items
            .iter()
            .map(|item| summarize_item(content_type, item))
            .collect();

        Ok(serde_json::json!({
            "query": q,
            "content_type": content_type.as_ref(),
            "total_count": data.total_count,
            "items": items,
        }))
    }
}

fn summarize_item(content_type: ContentType, item: &serde_json::Value) -> serde_json::Value {
    let field = |key: &str| item.get(key).cloned().unwrap_or(serde_json::Value::Null);
    match content_type {
        ContentType::Repo => serde_json::json!({
            "full_name": field("full_name"),
            "description": field("description"),
            "url": field("html_url"),
            "stars": field("stargazers_count"),
            "language": field("language"),
        }),
        ContentType::Code => serde_json::json!({
            "path": field("path"),
            "repository": item.pointer("/repository/full_name").cloned(),
            "url": field("html_url"),
        }),
        ContentType::Issue => serde_json::json!({
            "title": field("title"),
            "state": field("state"),
            "url": field("html_url"),
            "body": item
                .get("body")
                .and_then(|b| b.as_str())
                .map(|b| b.chars().take(500).collect::<String>()),
        }),
    }
}
