//! External web search backed by the Exa search API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResearchError;
use crate::provider::http::{normalize_base_url, shared_client, status_to_error};
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

pub const NAME: &str = "external_search";
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";
const DEFAULT_RESULTS: u64 = 5;
const MAX_RESULTS: u64 = 10;
const MAX_TEXT_CHARS: u32 = 1000;

pub struct ExternalSearchTool {
    api_key: String,
    base_url: String,
    parameters: AgentToolParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: u64,
    contents: SearchContents,
}

#[derive(Debug, Serialize)]
struct SearchContents {
    text: TextOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextOptions {
    max_characters: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl ExternalSearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            parameters: AgentToolParameters::object()
                .string("search_query", "The query to search the web for", true)
                .integer(
                    "num_results",
                    "Number of results to return (1-10, default 5)",
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
impl Tool for ExternalSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns titles, URLs and text snippets."
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
        let num_results = args
            .get_u64_opt("num_results")
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS);

        let body = SearchRequest {
            query,
            num_results,
            contents: SearchContents {
                text: TextOptions {
                    max_characters: MAX_TEXT_CHARS,
                },
            },
        };

        debug!(query, num_results, "external search");
        let resp = shared_client()
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &text));
        }

        let data: SearchResponse = resp.json().await?;
        Ok(serde_json::json!({
            "query": query,
            "results": data.results,
        }))
    }
}
