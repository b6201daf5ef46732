use tracing::{error, info};

use crate::error::StageError;
use crate::llm::{
    Generator, META_SYSTEM_PROMPT, build_meta_prompt, build_write_prompt,
    build_writer_system_prompt,
};
use crate::models::{DraftContent, RunState, Stage, require};

/// Configuration for the write stage
#[derive(Debug, Clone)]
pub struct WriteConfig {
    /// Tags used when the topic has no keywords
    pub default_tags: Vec<String>,
    pub default_category: String,
    /// Body characters shown to the meta description prompt
    pub meta_excerpt_chars: usize,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            default_tags: vec!["AI".to_string(), "Tech".to_string(), "Tutorial".to_string()],
            default_category: "Tech".to_string(),
            meta_excerpt_chars: 500,
        }
    }
}

/// Execute the write stage.
///
/// Counts the pass before doing anything else, so a failed write still uses
/// up one iteration. On revision passes the last review is fed back into the
/// prompt. A failed pass keeps whatever draft an earlier pass produced.
pub async fn execute_write(
    generator: &dyn Generator,
    config: &WriteConfig,
    mut state: RunState,
) -> RunState {
    state.enter(Stage::Write);
    let iteration = state.begin_write_pass();
    info!("Write pass {}", iteration);

    match write_draft(generator, config, &state).await {
        Ok(draft) => {
            info!("Generated content: {} words", draft.word_count);
            state.draft_content = Some(draft);
        }
        Err(e) => {
            error!("Write stage error: {}", e);
            state.record_error(Stage::Write, &e);
        }
    }

    state
}

async fn write_draft(
    generator: &dyn Generator,
    config: &WriteConfig,
    state: &RunState,
) -> Result<DraftContent, StageError> {
    let outline = require(state.outline.as_ref(), Stage::Write, "outline")?;
    let research = require(state.research_context.as_ref(), Stage::Write, "research context")?;
    let topic = &state.topic;

    let system = build_writer_system_prompt(topic);
    let prompt = build_write_prompt(outline, research, state.qa_result.as_ref());
    let body = generator
        .generate_text(&system, &prompt)
        .await
        .map_err(StageError::Generation)?;
    if body.trim().is_empty() {
        return Err(StageError::malformed("draft", "empty body"));
    }

    let mut draft = DraftContent::new(
        outline.title.clone(),
        body,
        String::new(),
        tags_for(topic.keywords.as_slice(), &config.default_tags),
        config.default_category.clone(),
    );

    let meta_prompt = build_meta_prompt(&draft.title, draft.excerpt(config.meta_excerpt_chars));
    let meta = generator
        .generate_text(META_SYSTEM_PROMPT, &meta_prompt)
        .await
        .map_err(StageError::Generation)?;
    draft.meta_description = meta.trim().to_string();

    Ok(draft)
}

fn tags_for(keywords: &[String], default_tags: &[String]) -> Vec<String> {
    if keywords.is_empty() {
        default_tags.to_vec()
    } else {
        keywords.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Outline, QaResult, ResearchContext, Topic};
    use crate::testing::ScriptedGenerator;

    fn ready_state(keywords: &[&str]) -> RunState {
        let topic = Topic::new("Async Rust", "Futures").with_keywords(keywords.iter().copied());
        let mut state = RunState::new(topic);
        state.research_context = Some(ResearchContext::empty());
        state.outline = Some(Outline {
            title: "Async Rust in Practice".to_string(),
            introduction: "Intro".to_string(),
            sections: vec![],
            conclusion: "End".to_string(),
            total_estimated_words: 800,
        });
        state
    }

    #[tokio::test]
    async fn test_write_builds_draft() {
        let generator = ScriptedGenerator::new()
            .with_text("# Async Rust\n\nFutures are lazy.")
            .with_text("  A short meta description.  ");

        let state = execute_write(&generator, &WriteConfig::default(), ready_state(&["tokio"])).await;

        let draft = state.draft_content.as_ref().unwrap();
        assert_eq!(state.iteration_count(), 1);
        assert_eq!(draft.title, "Async Rust in Practice");
        assert_eq!(draft.word_count, 6);
        assert_eq!(draft.meta_description, "A short meta description.");
        assert_eq!(draft.tags, vec!["tokio"]);
        assert_eq!(draft.category, "Tech");
    }

    #[tokio::test]
    async fn test_default_tags_when_no_keywords() {
        let generator = ScriptedGenerator::new().with_text("body").with_text("meta");
        let state = execute_write(&generator, &WriteConfig::default(), ready_state(&[])).await;
        assert_eq!(state.draft_content.as_ref().unwrap().tags, vec!["AI", "Tech", "Tutorial"]);
    }

    #[tokio::test]
    async fn test_failed_write_still_counts_and_keeps_previous_draft() {
        let generator = ScriptedGenerator::new().with_text_error("timeout");
        let mut state = ready_state(&[]);
        let previous = DraftContent::new("Old", "old body", "", vec![], "Tech");
        state.draft_content = Some(previous.clone());

        let state = execute_write(&generator, &WriteConfig::default(), state).await;

        assert_eq!(state.iteration_count(), 1);
        assert_eq!(state.draft_content, Some(previous));
        assert_eq!(state.errors(), ["Write error: generation failed: timeout"]);
    }

    #[tokio::test]
    async fn test_missing_outline_counts_iteration() {
        let generator = ScriptedGenerator::new();
        let mut state = ready_state(&[]);
        state.outline = None;

        let state = execute_write(&generator, &WriteConfig::default(), state).await;

        assert_eq!(state.iteration_count(), 1);
        assert!(state.draft_content.is_none());
        assert!(state.errors()[0].contains("write requires outline"));
    }

    #[tokio::test]
    async fn test_revision_prompt_carries_review() {
        let generator = ScriptedGenerator::new().with_text("body").with_text("meta");
        let mut state = ready_state(&[]);
        state.qa_result = Some(QaResult {
            approved: false,
            score: 0.2,
            issues: vec!["Unsupported claim about executors".to_string()],
            suggestions: vec![],
            factual_accuracy: 0.4,
        });

        execute_write(&generator, &WriteConfig::default(), state).await;

        assert!(generator.prompts()[0].contains("Unsupported claim about executors"));
    }
}
