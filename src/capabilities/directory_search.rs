//! Search the text files under a local directory.
//!
//! The walk honours `.gitignore`/`.ignore` files and skips hidden entries.
//! Directories outside the configured root are refused.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use tracing::{debug, warn};

use super::index::{chunk_text, Chunk};
use crate::error::ResearchError;
use crate::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};

pub const NAME: &str = "directory_search";
const TOP_EXCERPTS: usize = 5;
const MAX_FILES: usize = 500;
const MAX_FILE_BYTES: u64 = 256 * 1024;

pub struct DirectorySearchTool {
    root: PathBuf,
    parameters: AgentToolParameters,
}

impl DirectorySearchTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            parameters: AgentToolParameters::object()
                .string("search_query", "What to look for in the files", true)
                .string(
                    "directory",
                    "Directory to search, relative to the configured root (default: the root)",
                    false,
                )
                .build(),
        }
    }

    /// Resolve a requested directory against the root, refusing anything outside it.
    fn resolve(&self, requested: Option<&str>) -> Result<PathBuf, ResearchError> {
        let root = self.root.canonicalize().map_err(|e| {
            ResearchError::tool(NAME, format!("root {} is unavailable: {e}", self.root.display()))
        })?;
        let target = match requested {
            Some(dir) => root.join(dir),
            None => root.clone(),
        };
        let target = target.canonicalize().map_err(|e| {
            ResearchError::InvalidArgument(format!("directory {} is unavailable: {e}", target.display()))
        })?;
        if !target.starts_with(&root) {
            return Err(ResearchError::InvalidArgument(format!(
                "directory {} is outside the searchable root",
                target.display()
            )));
        }
        if !target.is_dir() {
            return Err(ResearchError::InvalidArgument(format!(
                "{} is not a directory",
                target.display()
            )));
        }
        Ok(target)
    }
}

#[async_trait]
impl Tool for DirectorySearchTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Search the contents of text files in a local directory."
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
        let directory = self.resolve(args.get_str_opt("directory"))?;
        let collection = format!("dir:{}", directory.display());

        if !ctx.index.has_collection(&collection) {
            let dir = directory.clone();
            let chunks = tokio::task::spawn_blocking(move || collect_chunks(&dir))
                .await
                .map_err(|e| ResearchError::tool(NAME, format!("directory walk failed: {e}")))?;
            debug!(directory = %directory.display(), chunks = chunks.len(), "indexed directory");
            ctx.index.upsert(collection.clone(), chunks);
        }

        let matches: Vec<serde_json::Value> = ctx
            .index
            .query(&collection, query, TOP_EXCERPTS)
            .into_iter()
            .map(|hit| {
                serde_json::json!({
                    "path": hit.source,
                    "excerpt": hit.text,
                    "score": hit.score,
                })
            })
            .collect();

        Ok(serde_json::json!({
            "directory": directory.display().to_string(),
            "matches": matches,
        }))
    }
}

fn collect_chunks(dir: &Path) -> Vec<Chunk> {
    let mut builder = WalkBuilder::new(dir);
    builder.hidden(true);
    builder.ignore(true);
    builder.git_ignore(true);
    builder.git_exclude(true);
    builder.parents(true);
    builder.follow_links(false);

    let mut chunks = Vec::new();
    let mut files = 0usize;
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if entry.metadata().map(|m| m.len() > MAX_FILE_BYTES).unwrap_or(true) {
            continue;
        }
        let Some(text) = read_text(entry.path()) else {
            continue;
        };

        let source = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .display()
            .to_string();
        chunks.extend(chunk_text(&source, &text));

        files += 1;
        if files >= MAX_FILES {
            warn!(directory = %dir.display(), limit = MAX_FILES, "file limit reached, remaining files skipped");
            break;
        }
    }
    chunks
}

/// File contents if they look like UTF-8 text.
fn read_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.iter().take(8192).any(|b| *b == 0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}
