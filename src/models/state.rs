use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StageError;
use crate::models::{DraftContent, Outline, PublishResult, QaResult, ResearchContext, Topic};

/// The stage a run last entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Initialized,
    Research,
    Outline,
    Write,
    Critique,
    Optimize,
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Initialized => "initialized",
            Stage::Research => "research",
            Stage::Outline => "outline",
            Stage::Write => "write",
            Stage::Critique => "critique",
            Stage::Optimize => "optimize",
            Stage::Publish => "publish",
        }
    }

    /// Capitalized label used as the prefix of error entries
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Initialized => "Initialized",
            Stage::Research => "Research",
            Stage::Outline => "Outline",
            Stage::Write => "Write",
            Stage::Critique => "Critique",
            Stage::Optimize => "Optimize",
            Stage::Publish => "Publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record threaded through every stage of a run.
///
/// Artifacts fill in left to right along the stage order; the draft and the
/// review are replaced on each revision pass. The iteration counter and the
/// error list can only grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: Uuid,
    pub topic: Topic,
    pub research_context: Option<ResearchContext>,
    pub outline: Option<Outline>,
    pub draft_content: Option<DraftContent>,
    pub qa_result: Option<QaResult>,
    pub final_content: Option<DraftContent>,
    pub publish_result: Option<PublishResult>,
    iteration_count: u32,
    pub current_stage: Stage,
    errors: Vec<String>,
}

impl RunState {
    pub fn new(topic: Topic) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            topic,
            research_context: None,
            outline: None,
            draft_content: None,
            qa_result: None,
            final_content: None,
            publish_result: None,
            iteration_count: 0,
            current_stage: Stage::Initialized,
            errors: Vec::new(),
        }
    }

    /// Mark `stage` as the one now running
    pub fn enter(&mut self, stage: Stage) {
        self.current_stage = stage;
    }

    /// Number of write passes so far
    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Count a write pass; returns the new count
    pub fn begin_write_pass(&mut self) -> u32 {
        self.iteration_count += 1;
        self.iteration_count
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Append a stage failure as "{Stage} error: {cause}"
    pub fn record_error(&mut self, stage: Stage, error: &StageError) {
        self.errors.push(format!("{} error: {}", stage.title(), error));
    }

    /// Append a non-fatal note that downstream output may be degraded
    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Borrow a required upstream artifact or report it missing
pub fn require<'a, T>(
    artifact: Option<&'a T>,
    stage: Stage,
    field: &'static str,
) -> Result<&'a T, StageError> {
    artifact.ok_or(StageError::MissingInput { stage, field })
}
