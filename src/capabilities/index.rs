//! Scoped in-memory search index shared by the lookup capabilities.
//!
//! Content is stored in named collections of text chunks and ranked
//! lexically against a query. Each execution session acquires its own index
//! through an [`IndexScope`] and hands it to the tools in the execution
//! context; the scope clears it when the execution ends, so nothing indexed
//! for one request is visible to the next.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

const CHUNK_CHARS: usize = 1200;

/// A unit of indexed text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub source: String,
    pub text: String,
}

/// A chunk ranked against a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub source: String,
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Default)]
pub struct SearchIndex {
    collections: RwLock<HashMap<String, Vec<Chunk>>>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Replace the contents of a collection.
    pub fn upsert(&self, name: impl Into<String>, chunks: Vec<Chunk>) {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), chunks);
    }

    /// Best `top_k` chunks of a collection for `query`; chunks with no matching term are dropped.
    pub fn query(&self, name: &str, query: &str, top_k: usize) -> Vec<ScoredChunk> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let Some(chunks) = collections.get(name) else {
            return Vec::new();
        };

        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter_map(|chunk| {
                let score = score_chunk(&terms, &chunk.text);
                (score > 0.0).then(|| ScoredChunk {
                    source: chunk.source.clone(),
                    text: chunk.text.clone(),
                    score,
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Total number of chunks across all collections.
    pub fn len(&self) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every collection.
    pub fn clear(&self) {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Owns the index of one execution and clears it on drop, however the
/// execution ends.
#[derive(Debug, Default)]
pub struct IndexScope {
    index: Arc<SearchIndex>,
}

impl IndexScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }
}

impl Drop for IndexScope {
    fn drop(&mut self) {
        self.index.clear();
    }
}

/// Split text into word-aligned chunks of roughly `CHUNK_CHARS` characters.
pub fn chunk_text(source: &str, text: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > CHUNK_CHARS {
            chunks.push(Chunk {
                source: source.to_string(),
                text: std::mem::take(&mut current),
            });
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(Chunk {
            source: source.to_string(),
            text: current,
        });
    }
    chunks
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "is", "it",
    "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "where", "which",
    "who", "why", "with",
];

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 1)
        .map(str::to_lowercase)
}

fn query_terms(query: &str) -> HashSet<String> {
    tokenize(query)
        .filter(|term| !STOPWORDS.contains(&term.as_str()))
        .collect()
}

fn score_chunk(terms: &HashSet<String>, text: &str) -> f64 {
    let mut hits: HashMap<&str, usize> = HashMap::new();
    for token in tokenize(text) {
        if let Some(term) = terms.get(&token) {
            *hits.entry(term.as_str()).or_default() += 1;
        }
    }
    let total: usize = hits.values().sum();
    // distinct coverage dominates; repetition only breaks ties
    hits.len() as f64 + (total as f64).ln_1p() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_size_and_keep_words() {
        let text = "word ".repeat(1000);
        let chunks = chunk_text("doc", &text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.len() <= CHUNK_CHARS));
        let total_words: usize = chunks.iter().map(|c| c.text.split(' ').count()).sum();
        assert_eq!(total_words, 1000);
    }

    #[test]
    fn query_ranks_by_term_coverage() {
        let index = SearchIndex::new();
        index.upsert(
            "site:x",
            vec![
                Chunk { source: "a".into(), text: "Rust ownership rules explained".into() },
                Chunk { source: "b".into(), text: "Quantum computing uses qubits; quantum gates".into() },
                Chunk { source: "c".into(), text: "Cooking pasta".into() },
            ],
        );

        let hits = index.query("site:x", "What is quantum computing?", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "b");

        assert!(index.query("site:x", "the of and", 5).is_empty());
        assert!(index.query("missing", "quantum", 5).is_empty());
    }

    #[test]
    fn clear_drops_all_collections() {
        let index = SearchIndex::new();
        index.upsert("one", chunk_text("one", "alpha beta"));
        index.upsert("two", chunk_text("two", "gamma"));
        assert_eq!(index.collection_names(), vec!["one", "two"]);
        assert_eq!(index.len(), 2);

        index.clear();
        assert!(index.is_empty());
        assert!(!index.has_collection("one"));
    }

    #[test]
    fn scope_clears_index_on_drop() {
        let scope = IndexScope::new();
        let index = Arc::clone(scope.index());
        index.upsert("dir:/tmp", chunk_text("a.txt", "alpha beta"));
        assert!(!index.is_empty());

        drop(scope);
        assert!(index.is_empty());
        assert!(index.collection_names().is_empty());
    }
}
