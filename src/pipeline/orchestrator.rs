use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::Generator;
use crate::models::{RunState, Topic};
use crate::pipeline::{AdvanceReason, GateDecision, LoopState, RevisionGate};
use crate::publish::{Approver, Publisher};
use crate::rag::Retriever;
use crate::stages::{
    CritiqueConfig, OutlineConfig, PublishConfig, ResearchConfig, WriteConfig, execute_critique,
    execute_optimize, execute_outline, execute_publish, execute_research, execute_write,
};

/// External services a run talks to
pub struct Collaborators {
    pub retriever: Box<dyn Retriever>,
    /// Fact extraction
    pub research_model: Box<dyn Generator>,
    /// Outline and drafting
    pub writer_model: Box<dyn Generator>,
    /// Review
    pub critic_model: Box<dyn Generator>,
    pub publisher: Box<dyn Publisher>,
    pub approver: Box<dyn Approver>,
}

/// Per-stage configuration derived from [`Settings`]
#[derive(Debug, Clone)]
pub struct StageConfigs {
    pub research: ResearchConfig,
    pub outline: OutlineConfig,
    pub write: WriteConfig,
    pub critique: CritiqueConfig,
    pub publish: PublishConfig,
}

impl StageConfigs {
    pub fn from_settings(settings: &Settings) -> Self {
        let threshold = settings.pipeline.fact_confidence_threshold;
        Self {
            research: ResearchConfig {
                top_k: settings.knowledge.top_k,
                confidence_threshold: threshold,
                ..Default::default()
            },
            outline: OutlineConfig {
                target_word_count: settings.content.bounded_target(),
            },
            write: WriteConfig {
                default_tags: settings.content.default_tags.clone(),
                default_category: settings.content.default_category.clone(),
                ..Default::default()
            },
            critique: CritiqueConfig {
                confidence_threshold: threshold,
                ..Default::default()
            },
            publish: PublishConfig {
                manual_approval: settings.pipeline.manual_approval,
                visibility: settings.publish.effective_visibility(),
            },
        }
    }
}

/// Drives a topic through research, outline, the write/critique loop,
/// optimize and publish.
pub struct Pipeline {
    collaborators: Collaborators,
    configs: StageConfigs,
    gate: RevisionGate,
}

impl Pipeline {
    pub fn new(settings: &Settings, collaborators: Collaborators) -> Self {
        Self::with_configs(
            StageConfigs::from_settings(settings),
            RevisionGate::new(settings.pipeline.max_writing_iterations),
            collaborators,
        )
    }

    pub fn with_configs(
        configs: StageConfigs,
        gate: RevisionGate,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            collaborators,
            configs,
            gate,
        }
    }

    /// Run every stage for `topic`.
    ///
    /// Never fails: stage failures are collected on the returned state.
    pub async fn run(&self, topic: Topic) -> RunState {
        let state = RunState::new(topic);
        info!("Starting run {} for: {}", state.run_id, state.topic.title);

        let c = &self.collaborators;
        let state = execute_research(
            c.retriever.as_ref(),
            c.research_model.as_ref(),
            &self.configs.research,
            state,
        )
        .await;
        let state = execute_outline(c.writer_model.as_ref(), &self.configs.outline, state).await;

        let state = self.revision_loop(state).await;

        let state = execute_optimize(state);
        let state = execute_publish(
            c.publisher.as_ref(),
            c.approver.as_ref(),
            &self.configs.publish,
            state,
        )
        .await;

        info!(
            "Run {} finished after {} write passes with {} errors",
            state.run_id,
            state.iteration_count(),
            state.errors().len()
        );
        state
    }

    async fn revision_loop(&self, mut state: RunState) -> RunState {
        let c = &self.collaborators;
        let mut position = LoopState::Write;

        loop {
            position = match position {
                LoopState::Write => {
                    state = execute_write(c.writer_model.as_ref(), &self.configs.write, state).await;
                    LoopState::Critique
                }
                LoopState::Critique => {
                    state =
                        execute_critique(c.critic_model.as_ref(), &self.configs.critique, state)
                            .await;
                    let decision = self
                        .gate
                        .decide(state.qa_result.as_ref(), state.iteration_count());
                    log_decision(decision, state.iteration_count());
                    LoopState::after_review(decision)
                }
                LoopState::Advance => return state,
            };
        }
    }
}

fn log_decision(decision: GateDecision, iteration: u32) {
    match decision {
        GateDecision::Revise => info!("Revising draft (iteration {})", iteration),
        GateDecision::Advance(AdvanceReason::Approved) => info!("Draft approved"),
        GateDecision::Advance(AdvanceReason::IterationCap) => {
            info!("Max iterations reached, advancing")
        }
        GateDecision::Advance(AdvanceReason::ReviewMissing) => {
            warn!("No review available, advancing without approval")
        }
    }
}
