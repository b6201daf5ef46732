use serde::Deserialize;
use tracing::{info, warn};

use crate::error::StageError;
use crate::llm::{Generator, RESEARCH_SYSTEM_PROMPT, build_research_prompt, facts_output};
use crate::models::{ResearchContext, RunState, Source, Stage, Topic};
use crate::rag::Retriever;

/// Configuration for the research stage
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Documents to retrieve
    pub top_k: usize,
    /// Leading sources passed to fact extraction
    pub context_sources: usize,
    /// Confidence below this is recorded as a warning
    pub confidence_threshold: f64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            context_sources: 5,
            confidence_threshold: 0.8,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FactsResponse {
    #[serde(default)]
    facts: Vec<String>,
}

/// Execute the research stage: retrieve sources and extract key facts
pub async fn execute_research(
    retriever: &dyn Retriever,
    generator: &dyn Generator,
    config: &ResearchConfig,
    mut state: RunState,
) -> RunState {
    state.enter(Stage::Research);
    info!("Researching topic: {}", state.topic.title);

    let query = state.topic.research_query();
    let retrieved = retriever.retrieve_with_scores(&query, config.top_k).await;

    if retrieved.is_empty() {
        warn!("No documents retrieved");
        state.research_context = Some(ResearchContext::empty());
    } else {
        let sources: Vec<Source> = retrieved
            .into_iter()
            .map(|scored| Source {
                content: scored.document.content,
                metadata: scored.document.metadata,
                relevance_score: scored.score,
            })
            .collect();

        let key_facts =
            match extract_facts(generator, &state.topic, &sources, config.context_sources).await {
                Ok(facts) => facts,
                Err(e) => {
                    warn!("Error extracting facts: {}", e);
                    state.record_error(Stage::Research, &e);
                    Vec::new()
                }
            };

        let context = ResearchContext::from_sources(sources, key_facts);
        info!(
            "Research: {} sources, {} facts, confidence {:.2}",
            context.sources.len(),
            context.key_facts.len(),
            context.confidence_score
        );
        state.research_context = Some(context);
    }

    if let Some(context) = &state.research_context {
        if context.confidence_score < config.confidence_threshold {
            let confidence = context.confidence_score;
            warn!("Low confidence score: {:.2}", confidence);
            state.record_warning(format!(
                "Research confidence below threshold: {:.2}",
                confidence
            ));
        }
    }

    state
}

async fn extract_facts(
    generator: &dyn Generator,
    topic: &Topic,
    sources: &[Source],
    context_sources: usize,
) -> Result<Vec<String>, StageError> {
    let passages: Vec<&str> = sources
        .iter()
        .take(context_sources)
        .map(|s| s.content.as_str())
        .collect();
    let prompt = build_research_prompt(topic, &passages);

    let value = generator
        .generate_structured(RESEARCH_SYSTEM_PROMPT, &prompt, &facts_output())
        .await
        .map_err(StageError::Generation)?;

    let response: FactsResponse =
        serde_json::from_value(value).map_err(|e| StageError::malformed("facts", e))?;

    Ok(response
        .facts
        .into_iter()
        .map(|fact| fact.trim().to_string())
        .filter(|fact| !fact.is_empty())
        .collect())
}
