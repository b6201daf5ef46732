use serde::Deserialize;
use tracing::{error, info};

use crate::error::StageError;
use crate::llm::{Generator, OUTLINE_SYSTEM_PROMPT, build_outline_prompt, outline_output};
use crate::models::{Outline, OutlineSection, RunState, Stage, require};

/// Configuration for the outline stage
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    pub target_word_count: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            target_word_count: 1500,
        }
    }
}

/// Generator answer; missing scalars fall back to the topic and config
#[derive(Debug, Deserialize)]
struct OutlineResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    introduction: String,
    #[serde(default)]
    sections: Vec<OutlineSection>,
    #[serde(default)]
    conclusion: String,
    #[serde(default)]
    total_estimated_words: Option<u32>,
}

/// Execute the outline stage
pub async fn execute_outline(
    generator: &dyn Generator,
    config: &OutlineConfig,
    mut state: RunState,
) -> RunState {
    state.enter(Stage::Outline);
    info!("Generating outline for: {}", state.topic.title);

    match build_outline(generator, config, &state).await {
        Ok(outline) => {
            info!("Generated outline with {} sections", outline.sections.len());
            state.outline = Some(outline);
        }
        Err(e) => {
            error!("Outline stage error: {}", e);
            state.record_error(Stage::Outline, &e);
        }
    }

    state
}

async fn build_outline(
    generator: &dyn Generator,
    config: &OutlineConfig,
    state: &RunState,
) -> Result<Outline, StageError> {
    let research = require(state.research_context.as_ref(), Stage::Outline, "research context")?;
    let prompt = build_outline_prompt(&state.topic, research, config.target_word_count);

    let value = generator
        .generate_structured(OUTLINE_SYSTEM_PROMPT, &prompt, &outline_output())
        .await
        .map_err(StageError::Generation)?;
    let response: OutlineResponse =
        serde_json::from_value(value).map_err(|e| StageError::malformed("outline", e))?;

    let outline = Outline {
        title: response
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| state.topic.title.clone()),
        introduction: response.introduction,
        sections: response.sections,
        conclusion: response.conclusion,
        total_estimated_words: response
            .total_estimated_words
            .unwrap_or(config.target_word_count),
    };
    outline
        .validate()
        .map_err(|reason| StageError::malformed("outline", reason))?;

    Ok(outline)
}
