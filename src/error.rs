use thiserror::Error;

use crate::models::Stage;

/// Fatal configuration problems, reported before any run starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} environment variable not set")]
    MissingCredential { name: &'static str },

    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// A failure inside a single stage.
///
/// Never escapes the orchestrator: the stage turns it into an entry on the
/// run's error list and hands the state on.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} requires {field}, which no earlier stage produced")]
    MissingInput { stage: Stage, field: &'static str },

    #[error("generation failed: {0:#}")]
    Generation(#[source] anyhow::Error),

    #[error("malformed {what} response: {reason}")]
    MalformedResponse { what: &'static str, reason: String },

    #[error("publisher failed: {0:#}")]
    Publish(#[source] anyhow::Error),

    #[error("publisher rejected the post: {0}")]
    Rejected(String),

    #[error("approval prompt failed: {0:#}")]
    Approval(#[source] anyhow::Error),
}

impl StageError {
    pub fn malformed(what: &'static str, reason: impl ToString) -> Self {
        Self::MalformedResponse {
            what,
            reason: reason.to_string(),
        }
    }
}
