//! Site search: answer a question from the contents of one web page.
//!
//! The page is fetched once per execution, reduced to plain text, chunked
//! into the execution's index, and the best excerpts are handed to the bound
//! reasoning backend to compose an answer. Pages are read up to
//! `MAX_PAGE_BYTES`; one that declares a larger length is refused unread.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::index::{chunk_text, SearchIndex};
use crate::error::ResearchError;
use crate::provider::http::shared_client;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};
use crate::types::{GenerationSettings, ModelMessage};

pub const NAME: &str = "site_search";
const TOP_EXCERPTS: usize = 4;
const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

pub struct SiteSearchTool {
    backend: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    parameters: AgentToolParameters,
}

impl SiteSearchTool {
    pub fn new(backend: Arc<dyn ModelProvider>) -> Self {
        Self {
            backend,
            settings: GenerationSettings::builder().temperature(0.0).build(),
            parameters: AgentToolParameters::object()
                .string("search_query", "What to look for on the website", true)
                .string(
                    "website",
                    "Full http(s) URL of the page to search. Defaults to the URL in the user's request.",
                    false,
                )
                .build(),
        }
    }

    async fn ensure_indexed(
        &self,
        index: &SearchIndex,
        website: &str,
    ) -> Result<Option<String>, ResearchError> {
        let collection = collection_name(website);
        if index.has_collection(&collection) {
            return Ok(None);
        }

        debug!(website, "fetching page for site search");
        let resp = shared_client().get(website).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ResearchError::tool(
                NAME,
                format!("{website} returned HTTP {}", status.as_u16()),
            ));
        }
        let body = read_capped(resp, website, MAX_PAGE_BYTES).await?;

        let title = page_title(&body);
        let text = html_to_text(&body);
        let chunks = chunk_text(website, &text);
        debug!(website, chunks = chunks.len(), "indexed page");
        index.upsert(collection, chunks);
        Ok(title)
    }
}

#[async_trait]
impl Tool for SiteSearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search the content of a specific website page and answer a question from it."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ResearchError> {
        let query = args.get_str("search_query")?;
        let website = args
            .get_str_opt("website")
            .or(ctx.reference_url.as_deref())
            .ok_or_else(|| {
                ResearchError::InvalidArgument(
                    "website is required when the request has no reference URL".into(),
                )
            })?;
        if !(website.starts_with("http://") || website.starts_with("https://")) {
            return Err(ResearchError::InvalidArgument(format!(
                "website must be an http(s) URL, got '{website}'"
            )));
        }

        let title = self.ensure_indexed(&ctx.index, website).await?;
        let excerpts = ctx.index.query(&collection_name(website), query, TOP_EXCERPTS);
        if excerpts.is_empty() {
            return Ok(serde_json::json!({
                "website": website,
                "title": title,
                "answer": format!("No content on {website} matched the query."),
                "excerpts": [],
            }));
        }

        let mut prompt = format!("Website: {website}\nQuestion: {query}\n\nExcerpts:\n");
        for (i, excerpt) in excerpts.iter().enumerate() {
            prompt.push_str(&format!("[{}] {}\n", i + 1, excerpt.text));
        }
        let request = ProviderRequest {
            messages: vec![
                ModelMessage::system(
                    "Answer the question using only the website excerpts provided. \
                     Say so plainly if they do not contain the answer.",
                ),
                ModelMessage::user(prompt),
            ],
            settings: self.settings.clone(),
            tools: None,
        };

        ctx.throttle().await;
        let response = self.backend.generate_text(&request).await?;

        Ok(serde_json::json!({
            "website": website,
            "title": title,
            "answer": response.text,
            "excerpts": excerpts.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
        }))
    }
}

fn collection_name(website: &str) -> String {
    format!("site:{website}")
}

/// Read at most `limit` bytes of the body. A declared length over the limit
/// is refused before anything is read.
async fn read_capped(
    mut resp: reqwest::Response,
    website: &str,
    limit: usize,
) -> Result<String, ResearchError> {
    if let Some(declared) = resp.content_length() {
        if declared > limit as u64 {
            return Err(ResearchError::tool(
                NAME,
                format!("{website} is too large ({declared} bytes, limit {limit})"),
            ));
        }
    }

    let mut body: Vec<u8> = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        let room = limit - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!(website, limit, "page truncated");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn page_title(html: &str) -> Option<String> {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TITLE_RE.get_or_init(|| {
        Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern is a valid regex")
    });
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(&html_escape::decode_html_entities(m.as_str())))
        .filter(|t| !t.is_empty())
}

/// Reduce an HTML document to readable text.
pub fn html_to_text(html: &str) -> String {
    static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    let blocks = BLOCK_RE.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->",
        )
        .expect("block pattern is a valid regex")
    });
    let tags = TAG_RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is a valid regex"));

    let without_blocks = blocks.replace_all(html, " ");
    let without_tags = tags.replace_all(&without_blocks, " ");
    collapse_whitespace(&html_escape::decode_html_entities(&without_tags))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
