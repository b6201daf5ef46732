use std::sync::Arc;

use quillflow::models::{PublishResult, Stage, Topic};
use quillflow::pipeline::{Collaborators, Pipeline};
use quillflow::publish::{AutoApprover, DryRunPublisher, Publisher};
use quillflow::rag::{Document, ScoredDocument};
use quillflow::testing::{RecordingPublisher, ScriptedApprover, ScriptedGenerator, StaticRetriever};
use quillflow::{RunState, Settings};
use serde_json::{Value, json};

fn settings(max_iterations: u32) -> Settings {
    let max = max_iterations.to_string();
    Settings::from_lookup(|name| match name {
        "MAX_WRITING_ITERATIONS" => Some(max.clone()),
        _ => None,
    })
    .unwrap()
}

fn outline() -> Value {
    json!({
        "introduction": "What X is",
        "sections": [{"heading": "Basics", "level": 1, "content_points": ["definition"]}],
        "conclusion": "Wrap up"
    })
}

fn review(approved: bool) -> Value {
    json!({
        "approved": approved,
        "score": if approved { 0.9 } else { 0.4 },
        "issues": if approved { json!([]) } else { json!(["Needs more detail"]) },
        "suggestions": [],
        "factual_accuracy": 0.7
    })
}

fn writer() -> ScriptedGenerator {
    ScriptedGenerator::new()
        .with_structured(outline())
        .always_text("X explained in a few words.")
}

fn collaborators(
    retrieved: Vec<ScoredDocument>,
    critic: ScriptedGenerator,
    publisher: Box<dyn Publisher>,
) -> Collaborators {
    Collaborators {
        retriever: Box::new(StaticRetriever::new(retrieved)),
        research_model: Box::new(ScriptedGenerator::new().always_structured(json!({"facts": ["X is a letter"]}))),
        writer_model: Box::new(writer()),
        critic_model: Box::new(critic),
        publisher,
        approver: Box::new(AutoApprover),
    }
}

async fn run(max_iterations: u32, critic: ScriptedGenerator, publisher: Box<dyn Publisher>) -> RunState {
    let pipeline = Pipeline::new(&settings(max_iterations), collaborators(vec![], critic, publisher));
    pipeline.run(Topic::new("X", "")).await
}

#[tokio::test]
async fn test_unapproved_drafts_stop_at_iteration_cap() {
    let critic = ScriptedGenerator::new().always_structured(review(false));

    let state = run(2, critic, Box::new(DryRunPublisher)).await;

    let research = state.research_context.as_ref().unwrap();
    assert_eq!(research.confidence_score, 0.0);
    assert!(research.key_facts.is_empty());

    assert_eq!(state.iteration_count(), 2);
    assert!(!state.qa_result.as_ref().unwrap().approved);
    assert_eq!(state.final_content, state.draft_content);
    assert!(state.final_content.is_some());

    let result = state.publish_result.as_ref().unwrap();
    assert!(result.success);
    assert_eq!(result.post_url.as_deref(), Some("https://example.tistory.com/dry-run-X"));
    assert_eq!(state.current_stage, Stage::Publish);
    assert_eq!(state.errors(), ["Research confidence below threshold: 0.00"]);
}

#[tokio::test]
async fn test_approved_first_draft_advances_after_one_pass() {
    let critic = ScriptedGenerator::new().always_structured(review(true));

    let state = run(3, critic, Box::new(DryRunPublisher)).await;

    assert_eq!(state.iteration_count(), 1);
    assert!(state.qa_result.as_ref().unwrap().approved);
    assert!(state.publish_result.as_ref().unwrap().success);
}

#[tokio::test]
async fn test_revision_then_approval() {
    let critic = ScriptedGenerator::new()
        .with_structured(review(false))
        .with_structured(review(true));

    let state = run(5, critic, Box::new(DryRunPublisher)).await;

    assert_eq!(state.iteration_count(), 2);
    assert!(state.qa_result.as_ref().unwrap().approved);
}

#[tokio::test]
async fn test_failed_review_advances_without_looping() {
    let critic = ScriptedGenerator::new().with_structured_error("critic unavailable");

    let state = run(4, critic, Box::new(DryRunPublisher)).await;

    assert_eq!(state.iteration_count(), 1);
    assert!(state.qa_result.is_none());
    assert!(state.final_content.is_some());
    assert!(
        state
            .errors()
            .contains(&"Critique error: generation failed: critic unavailable".to_string())
    );
    assert_eq!(state.current_stage, Stage::Publish);
}

#[tokio::test]
async fn test_loop_is_bounded_for_any_cap() {
    for max in 0..5 {
        let writer = Arc::new(writer());
        let critic = ScriptedGenerator::new().always_structured(review(false));
        let mut collaborators = collaborators(vec![], critic, Box::new(DryRunPublisher));
        collaborators.writer_model = Box::new(Arc::clone(&writer));

        let state = Pipeline::new(&settings(max), collaborators)
            .run(Topic::new("X", ""))
            .await;

        assert!(state.iteration_count() <= max + 1);
        assert_eq!(state.iteration_count(), max.max(1));
        // One outline prompt, then a body and a meta prompt per write pass
        let expected = 1 + 2 * state.iteration_count() as usize;
        assert_eq!(writer.prompts().len(), expected);
    }
}

#[tokio::test]
async fn test_total_failure_still_reaches_publish() {
    let writer = ScriptedGenerator::new()
        .with_structured_error("outline model down")
        .always_text("never used");
    let critic = ScriptedGenerator::new().always_structured(review(true));
    let mut collaborators = collaborators(vec![], critic, Box::new(DryRunPublisher));
    collaborators.writer_model = Box::new(writer);

    let state = Pipeline::new(&settings(2), collaborators)
        .run(Topic::new("X", ""))
        .await;

    assert_eq!(state.current_stage, Stage::Publish);
    assert_eq!(state.iteration_count(), 1);
    assert!(state.outline.is_none());
    assert!(state.draft_content.is_none());
    assert!(state.qa_result.is_none());
    assert!(state.final_content.is_none());

    let result = state.publish_result.as_ref().unwrap();
    assert!(!result.success);
    assert!(!result.error_message.as_deref().unwrap_or("").is_empty());

    assert_eq!(
        state.errors(),
        [
            "Research confidence below threshold: 0.00",
            "Outline error: generation failed: outline model down",
            "Write error: write requires outline, which no earlier stage produced",
            "Critique error: critique requires draft content, which no earlier stage produced",
            "Optimize error: optimize requires draft content, which no earlier stage produced",
            "Publish error: publish requires final content, which no earlier stage produced",
        ]
    );
}

#[tokio::test]
async fn test_publish_failure_keeps_upstream_artifacts() {
    let critic = ScriptedGenerator::new().always_structured(review(true));

    let state = run(2, critic, Box::new(RecordingPublisher::failing("503 from platform"))).await;

    let result = state.publish_result.as_ref().unwrap();
    assert!(!result.success);
    assert!(!result.error_message.as_deref().unwrap_or("").is_empty());
    assert!(state.outline.is_some());
    assert!(state.draft_content.is_some());
    assert!(state.final_content.is_some());
    assert_eq!(
        state.errors().last().map(String::as_str),
        Some("Publish error: publisher failed: 503 from platform")
    );
}

#[tokio::test]
async fn test_platform_rejection_is_recorded() {
    let critic = ScriptedGenerator::new().always_structured(review(true));
    let publisher = RecordingPublisher::returning(PublishResult::failed("Tistory credentials not configured"));

    let state = run(2, critic, Box::new(publisher)).await;

    assert!(!state.publish_result.as_ref().unwrap().success);
    assert!(state.errors().last().unwrap().starts_with("Publish error: publisher rejected the post"));
}

#[tokio::test]
async fn test_retrieved_sources_reach_the_run_state() {
    let retrieved = vec![ScoredDocument {
        document: Document::new("X is the 24th letter of the alphabet", "letters.md"),
        score: 1.0,
    }];
    let retriever = Arc::new(StaticRetriever::new(retrieved));
    let critic = ScriptedGenerator::new().always_structured(review(true));
    let mut collaborators = collaborators(vec![], critic, Box::new(DryRunPublisher));
    collaborators.retriever = Box::new(Arc::clone(&retriever));

    let topic = Topic::new("X", "the letter").with_keywords(["alphabet"]);
    let state = Pipeline::new(&settings(2), collaborators).run(topic).await;

    assert_eq!(retriever.queries(), vec!["X the letter alphabet"]);

    let research = state.research_context.as_ref().unwrap();
    assert_eq!(research.references, vec!["letters.md"]);
    assert_eq!(research.key_facts, vec!["X is a letter"]);
    assert!((research.confidence_score - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn test_manual_approval_decline_skips_publishing() {
    let settings = Settings::from_lookup(|name| match name {
        "ENABLE_MANUAL_APPROVAL" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();
    let critic = ScriptedGenerator::new().always_structured(review(true));
    let mut collaborators = collaborators(vec![], critic, Box::new(DryRunPublisher));
    collaborators.approver = Box::new(ScriptedApprover(false));

    let state = Pipeline::new(&settings, collaborators).run(Topic::new("X", "")).await;

    let result = state.publish_result.as_ref().unwrap();
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("Cancelled by user"));
}
