use crate::models::QaResult;

/// Why the loop stopped revising
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// The reviewer approved the draft
    Approved,
    /// The write stage has run the maximum number of times
    IterationCap,
    /// No review is available to act on
    ReviewMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Revise,
    Advance(AdvanceReason),
}

impl GateDecision {
    pub fn is_advance(&self) -> bool {
        matches!(self, GateDecision::Advance(_))
    }
}

/// Decides after each critique whether the draft goes back to the writer.
///
/// Checks run in order: approval, iteration cap, missing review. Only an
/// unapproved review under the cap sends the draft back.
#[derive(Debug, Clone, Copy)]
pub struct RevisionGate {
    pub max_iterations: u32,
}

impl RevisionGate {
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }

    pub fn decide(&self, review: Option<&QaResult>, iteration_count: u32) -> GateDecision {
        if review.is_some_and(|r| r.approved) {
            return GateDecision::Advance(AdvanceReason::Approved);
        }
        if iteration_count >= self.max_iterations {
            return GateDecision::Advance(AdvanceReason::IterationCap);
        }
        if review.is_none() {
            return GateDecision::Advance(AdvanceReason::ReviewMissing);
        }
        GateDecision::Revise
    }
}

/// Position in the write/critique loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Write,
    Critique,
    Advance,
}

impl LoopState {
    /// Where the loop goes once critique has produced `decision`
    pub fn after_review(decision: GateDecision) -> LoopState {
        match decision {
            GateDecision::Revise => LoopState::Write,
            GateDecision::Advance(_) => LoopState::Advance,
        }
    }
}
