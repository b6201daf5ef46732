use tracing::{error, info, warn};

use crate::error::StageError;
use crate::models::{PublishResult, RunState, Stage, Visibility, require};
use crate::publish::{Approver, Publisher};

pub const CANCELLED_BY_USER: &str = "Cancelled by user";

/// Configuration for the publish stage
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Ask the approver before publishing
    pub manual_approval: bool,
    pub visibility: Visibility,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            manual_approval: false,
            visibility: Visibility::Draft,
        }
    }
}

/// Execute the publish stage.
///
/// Always leaves a publish result on the state. Anything but a successful
/// result, apart from a declined approval, is also recorded as an error.
pub async fn execute_publish(
    publisher: &dyn Publisher,
    approver: &dyn Approver,
    config: &PublishConfig,
    mut state: RunState,
) -> RunState {
    state.enter(Stage::Publish);
    info!("Publishing content");

    let result = match publish_final(publisher, approver, config, &state).await {
        Ok(Some(result)) => {
            if !result.success {
                let reason = result
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string());
                let e = StageError::Rejected(reason);
                error!("Publish stage error: {}", e);
                state.record_error(Stage::Publish, &e);
            }
            result
        }
        Ok(None) => {
            warn!("Publication cancelled by user");
            PublishResult::failed(CANCELLED_BY_USER)
        }
        Err(e) => {
            error!("Publish stage error: {}", e);
            let message = e.to_string();
            state.record_error(Stage::Publish, &e);
            PublishResult::failed(message)
        }
    };

    if result.success {
        info!("Published: {}", result.post_url.as_deref().unwrap_or(""));
    }
    state.publish_result = Some(result);
    state
}

/// The publisher's answer, or `None` when approval was declined
async fn publish_final(
    publisher: &dyn Publisher,
    approver: &dyn Approver,
    config: &PublishConfig,
    state: &RunState,
) -> Result<Option<PublishResult>, StageError> {
    let content = require(state.final_content.as_ref(), Stage::Publish, "final content")?;

    if config.manual_approval
        && !approver
            .approve(&content.title)
            .map_err(StageError::Approval)?
    {
        return Ok(None);
    }

    publisher
        .publish(content, config.visibility)
        .await
        .map(Some)
        .map_err(StageError::Publish)
}
