use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::KnowledgeSettings;
use crate::rag::{Document, Retriever, ScoredDocument, TextSplitter, load_documents};

/// In-memory lexical index over knowledge-base chunks.
///
/// Chunks are scored against the query by cosine similarity of term
/// frequencies, so scores fall in 0-1.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    chunks: Vec<IndexedChunk>,
}

#[derive(Debug)]
struct IndexedChunk {
    document: Document,
    terms: HashMap<String, f64>,
    norm: f64,
}

impl KnowledgeBase {
    /// Index already-split chunks
    pub fn from_chunks(chunks: Vec<Document>) -> Self {
        let chunks = chunks
            .into_iter()
            .filter_map(|document| {
                let terms = term_frequencies(&document.content);
                let norm = vector_norm(&terms);
                (norm > 0.0).then_some(IndexedChunk {
                    document,
                    terms,
                    norm,
                })
            })
            .collect();
        Self { chunks }
    }

    /// Split `documents` and index the chunks
    pub fn build(documents: &[Document], splitter: &TextSplitter) -> Self {
        let chunks = splitter.split_documents(documents);
        info!("Split {} documents into {} chunks", documents.len(), chunks.len());
        Self::from_chunks(chunks)
    }

    /// Load, split and index knowledge files
    pub fn load(paths: &[PathBuf], settings: &KnowledgeSettings) -> Self {
        let documents = load_documents(paths);
        let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap);
        Self::build(&documents, &splitter)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Up to `k` chunks sharing terms with `query`, best first
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        let query_terms = term_frequencies(query);
        let query_norm = vector_norm(&query_terms);
        if query_norm == 0.0 || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = self
            .chunks
            .iter()
            .enumerate()
            .filter_map(|(i, chunk)| {
                let dot: f64 = query_terms
                    .iter()
                    .filter_map(|(term, weight)| chunk.terms.get(term).map(|w| w * weight))
                    .sum();
                let score = dot / (query_norm * chunk.norm);
                (score > 0.0).then_some((i, score))
            })
            .collect();

        // Stable sort keeps chunk order for equal scores
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        debug!("Query matched {} chunks", scored.len());

        scored
            .into_iter()
            .map(|(i, score)| ScoredDocument {
                document: self.chunks[i].document.clone(),
                score: score.min(1.0),
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for KnowledgeBase {
    async fn retrieve_with_scores(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        let results = self.search(query, k);
        info!("Retrieved {} documents with scores", results.len());
        results
    }
}

/// Lowercased alphanumeric terms of two or more characters
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 1)
        .map(|word| word.to_lowercase())
}

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut terms = HashMap::new();
    for term in tokenize(text) {
        *terms.entry(term).or_insert(0.0) += 1.0;
    }
    terms
}

fn vector_norm(terms: &HashMap<String, f64>) -> f64 {
    terms.values().map(|w| w * w).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knowledge_base() -> KnowledgeBase {
        KnowledgeBase::from_chunks(vec![
            Document::new("LangChain is a framework for language model applications", "langchain.md"),
            Document::new("Retrieval augmented generation grounds answers in documents", "rag.md"),
            Document::new("Tokio is an async runtime for Rust", "tokio.md"),
        ])
    }

    #[test]
    fn test_search_ranks_by_overlap() {
        let kb = knowledge_base();
        let results = kb.search("async Rust runtime", 2);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.metadata["source"], "tokio.md");
        assert!(results[0].score > 0.0 && results[0].score <= 1.0);
    }

    #[test]
    fn test_search_respects_k() {
        let kb = knowledge_base();
        let results = kb.search("language model retrieval generation Rust", 2);
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_no_match_is_empty() {
        let kb = knowledge_base();
        assert!(kb.search("kubernetes", 5).is_empty());
        assert!(kb.search("", 5).is_empty());
        assert!(KnowledgeBase::default().search("rust", 5).is_empty());
    }

    #[test]
    fn test_identical_text_scores_one() {
        let kb = KnowledgeBase::from_chunks(vec![Document::new("alpha beta", "a.md")]);
        let results = kb.search("beta alpha", 1);
        assert!((results[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_from_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.md"), "Ownership rules\n\nBorrowing rules").unwrap();

        let settings = KnowledgeSettings {
            chunk_size: 20,
            chunk_overlap: 0,
            top_k: 5,
        };
        let kb = KnowledgeBase::load(&[dir.path().to_path_buf()], &settings);

        assert_eq!(kb.len(), 2);
        let results = kb.search("borrowing", 5);
        assert_eq!(results[0].document.content, "Borrowing rules");
        assert_eq!(results[0].document.metadata["chunk"], "1");
    }

    #[tokio::test]
    async fn test_retriever_impl_delegates_to_search() {
        let kb = knowledge_base();
        let results = kb.retrieve_with_scores("LangChain framework", 10).await;
        assert_eq!(results[0].document.metadata["source"], "langchain.md");
    }
}
