//! Policy passage retrieval.
//!
//! [`PolicyRetriever`] is the collaborator seam; the pipeline treats any error as
//! an empty context. [`CorpusRetriever`] is a local lexical index over a CSV
//! export of policy documents (`source,text` columns), chunked the same way the
//! hosted vector index is fed.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::RetrievalConfig;

pub const CHUNK_SIZE: usize = 800;
pub const CHUNK_OVERLAP: usize = 150;
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];
const MIN_TERM_CHARS: usize = 3;
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "can", "you", "your", "with", "this", "that", "from", "have",
    "has", "was", "will", "who", "what", "how", "get", "his", "her", "our", "not", "any",
];

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("failed to read policy corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid policy corpus CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("policy index unavailable: {0}")]
    Unavailable(String),
}

pub trait PolicyRetriever: Send + Sync {
    /// Up to `k` passages, most relevant first. May be empty.
    fn search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError>;
}

/// Retriever used when no corpus is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRetriever;

impl PolicyRetriever for EmptyRetriever {
    fn search(&self, _query: &str, _k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct CorpusRow {
    source: String,
    text: String,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    source: String,
    text: String,
    terms: Vec<String>,
}

/// In-memory lexical index over chunked policy text.
#[derive(Debug, Clone, Default)]
pub struct CorpusRetriever {
    chunks: Vec<IndexedChunk>,
}

impl CorpusRetriever {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let retriever = Self::from_reader(file)?;
        info!(path = %path.display(), chunks = retriever.len(), "policy corpus loaded");
        Ok(retriever)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RetrievalError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut documents = Vec::new();
        for record in csv_reader.deserialize::<CorpusRow>() {
            let row = record?;
            documents.push((row.source, row.text));
        }

        Ok(Self::from_documents(documents))
    }

    pub fn from_documents<I, S, T>(documents: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<str>,
    {
        let mut chunks = Vec::new();
        for (source, text) in documents {
            let source = source.into();
            for chunk in chunk_text(text.as_ref(), CHUNK_SIZE, CHUNK_OVERLAP) {
                chunks.push(IndexedChunk {
                    source: source.clone(),
                    terms: terms(&chunk),
                    text: chunk,
                });
            }
        }
        Self { chunks }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.chunks
            .iter()
            .map(|chunk| chunk.source.as_str())
            .filter(|source| seen.insert(*source))
            .collect()
    }
}

impl PolicyRetriever for CorpusRetriever {
    fn search(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let query_terms: HashSet<String> = terms(query).into_iter().collect();
        if query_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, usize, usize)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(position, chunk)| {
                let matched: HashSet<&str> = chunk
                    .terms
                    .iter()
                    .filter(|term| query_terms.contains(*term))
                    .map(String::as_str)
                    .collect();
                if matched.is_empty() {
                    return None;
                }
                let hits = chunk
                    .terms
                    .iter()
                    .filter(|term| query_terms.contains(*term))
                    .count();
                Some((matched.len(), hits, position))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        let passages: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(_, _, position)| self.chunks[position].text.clone())
            .collect();

        debug!(matches = passages.len(), k, "policy corpus searched");
        Ok(passages)
    }
}

/// Picks the retriever for the process lifetime. A corpus that fails to load
/// leaves the navigator running without policy context.
pub fn select_retriever(config: &RetrievalConfig) -> Arc<dyn PolicyRetriever> {
    let Some(path) = &config.corpus_path else {
        debug!("no policy corpus configured");
        return Arc::new(EmptyRetriever);
    };

    match CorpusRetriever::from_path(path) {
        Ok(retriever) => Arc::new(retriever),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "policy corpus unavailable");
            Arc::new(EmptyRetriever)
        }
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|term| term.chars().count() >= MIN_TERM_CHARS)
        .filter(|term| !STOPWORDS.contains(&term.as_str()))
        .collect()
}

/// Splits text into windows of at most `size` characters that overlap by
/// `overlap` characters, cutting at the strongest separator in the back half.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let hard_end = (start + size).min(chars.len());
        let end = if hard_end == chars.len() {
            hard_end
        } else {
            preferred_break(&chars[start..hard_end])
                .map(|offset| start + offset)
                .unwrap_or(hard_end)
        }
        .max(start + 1);

        let chunk: String = chars[start..end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        if end >= chars.len() {
            break;
        }
        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    chunks
}

fn preferred_break(window: &[char]) -> Option<usize> {
    let floor = window.len() / 2;
    SEPARATORS.iter().find_map(|separator| {
        let pattern: Vec<char> = separator.chars().collect();
        window
            .windows(pattern.len())
            .rposition(|candidate| candidate == pattern.as_slice())
            .map(|position| position + pattern.len())
            .filter(|cut| *cut > floor)
    })
}
