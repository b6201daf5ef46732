use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A retrieved passage kept as research evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub relevance_score: f64,
}

/// Everything the research stage learned about a topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchContext {
    /// Retrieved sources, most relevant first
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Facts extracted from the top sources
    #[serde(default)]
    pub key_facts: Vec<String>,
    /// The `source` metadata entry of every source, in order
    #[serde(default)]
    pub references: Vec<String>,
    /// Overall confidence (0.0 - 1.0)
    pub confidence_score: f64,
}

impl ResearchContext {
    /// Context for a topic nothing could be found for
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from sources, deriving references and confidence
    pub fn from_sources(sources: Vec<Source>, key_facts: Vec<String>) -> Self {
        let references = sources
            .iter()
            .map(|s| s.metadata.get("source").cloned().unwrap_or_default())
            .collect();
        let confidence_score = confidence_from_scores(&sources);

        Self {
            sources,
            key_facts,
            references,
            confidence_score,
        }
    }

    /// Facts as a bulleted list for prompts
    pub fn facts_as_bullets(&self) -> String {
        self.key_facts
            .iter()
            .map(|fact| format!("- {}", fact))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// confidence = min(1, mean(score) * n / 5)
fn confidence_from_scores(sources: &[Source]) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }
    let n = sources.len() as f64;
    let mean = sources.iter().map(|s| s.relevance_score).sum::<f64>() / n;
    (mean * n / 5.0).clamp(0.0, 1.0)
}
