use tracing::{error, info};

use crate::error::StageError;
use crate::llm::{CRITIC_SYSTEM_PROMPT, Generator, build_review_prompt, review_output};
use crate::models::{QaResult, RunState, Stage, require, truncate_chars};

/// Configuration for the critique stage
#[derive(Debug, Clone)]
pub struct CritiqueConfig {
    /// Threshold quoted to the reviewer
    pub confidence_threshold: f64,
    /// Body characters sent for review
    pub max_review_chars: usize,
}

impl Default for CritiqueConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            max_review_chars: 3000,
        }
    }
}

/// Execute the critique stage.
///
/// The previous review is cleared first, so after a failed review the state
/// carries no review at all rather than a stale one.
pub async fn execute_critique(
    generator: &dyn Generator,
    config: &CritiqueConfig,
    mut state: RunState,
) -> RunState {
    state.enter(Stage::Critique);
    state.qa_result = None;
    info!("Critiquing content (iteration {})", state.iteration_count());

    match review_draft(generator, config, &state).await {
        Ok(review) => {
            info!(
                "QA score: {:.2}, approved: {}, factual accuracy: {:.2}",
                review.score, review.approved, review.factual_accuracy
            );
            if !review.issues.is_empty() {
                info!("Issues found: {}", review.issues.len());
            }
            state.qa_result = Some(review);
        }
        Err(e) => {
            error!("Critique stage error: {}", e);
            state.record_error(Stage::Critique, &e);
        }
    }

    state
}

async fn review_draft(
    generator: &dyn Generator,
    config: &CritiqueConfig,
    state: &RunState,
) -> Result<QaResult, StageError> {
    let draft = require(state.draft_content.as_ref(), Stage::Critique, "draft content")?;
    let research = require(state.research_context.as_ref(), Stage::Critique, "research context")?;

    let body = truncate_chars(&draft.content, config.max_review_chars);
    let prompt = build_review_prompt(draft, body, research, config.confidence_threshold);

    let value = generator
        .generate_structured(CRITIC_SYSTEM_PROMPT, &prompt, &review_output())
        .await
        .map_err(StageError::Generation)?;
    let review: QaResult =
        serde_json::from_value(value).map_err(|e| StageError::malformed("review", e))?;
    review
        .validate()
        .map_err(|reason| StageError::malformed("review", reason))?;

    Ok(review)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{DraftContent, ResearchContext, Topic};
    use crate::testing::ScriptedGenerator;

    fn drafted_state(body: &str) -> RunState {
        let mut state = RunState::new(Topic::new("X", ""));
        state.research_context = Some(ResearchContext::empty());
        state.draft_content = Some(DraftContent::new("Title", body, "meta", vec![], "Tech"));
        state
    }

    fn stale_review() -> QaResult {
        QaResult {
            approved: false,
            score: 0.1,
            issues: vec!["old".to_string()],
            suggestions: vec![],
            factual_accuracy: 0.1,
        }
    }

    #[tokio::test]
    async fn test_review_is_stored() {
        let generator = ScriptedGenerator::new().with_structured(json!({
            "approved": true,
            "score": 0.9,
            "issues": [],
            "suggestions": ["Add a diagram"],
            "factual_accuracy": 0.95
        }));

        let state = execute_critique(&generator, &CritiqueConfig::default(), drafted_state("body")).await;

        let review = state.qa_result.as_ref().unwrap();
        assert_eq!(state.current_stage, Stage::Critique);
        assert!(review.approved);
        assert_eq!(review.suggestions, vec!["Add a diagram"]);
        assert!(state.errors().is_empty());
    }

    #[tokio::test]
    async fn test_long_body_is_truncated_for_review() {
        let generator = ScriptedGenerator::new().with_structured_error("down");
        let config = CritiqueConfig {
            max_review_chars: 5,
            ..Default::default()
        };

        execute_critique(&generator, &config, drafted_state("abcdefghij")).await;

        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("abcde"));
        assert!(!prompt.contains("abcdef"));
    }

    #[tokio::test]
    async fn test_failed_review_clears_stale_result() {
        let generator = ScriptedGenerator::new().with_structured_error("overloaded");
        let mut state = drafted_state("body");
        state.qa_result = Some(stale_review());

        let state = execute_critique(&generator, &CritiqueConfig::default(), state).await;

        assert!(state.qa_result.is_none());
        assert_eq!(state.errors(), ["Critique error: generation failed: overloaded"]);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_malformed() {
        let generator = ScriptedGenerator::new().with_structured(json!({
            "approved": true,
            "score": 7,
            "issues": [],
            "suggestions": [],
            "factual_accuracy": 0.5
        }));

        let state = execute_critique(&generator, &CritiqueConfig::default(), drafted_state("body")).await;

        assert!(state.qa_result.is_none());
        assert!(state.errors()[0].starts_with("Critique error: malformed review response"));
    }

    #[tokio::test]
    async fn test_missing_draft_is_recorded() {
        let generator = ScriptedGenerator::new();
        let mut state = drafted_state("body");
        state.draft_content = None;

        let state = execute_critique(&generator, &CritiqueConfig::default(), state).await;

        assert!(state.qa_result.is_none());
        assert!(state.errors()[0].contains("critique requires draft content"));
        assert!(generator.prompts().is_empty());
    }
}
