use tracing::{debug, error, info};

use crate::error::StageError;
use crate::models::{DraftContent, RunState, Stage, require};

/// Execute the optimize stage.
///
/// The final content is the last draft, unchanged. Keyword coverage is only
/// reported.
pub fn execute_optimize(mut state: RunState) -> RunState {
    state.enter(Stage::Optimize);
    info!("Optimizing content");

    match finalize(&state) {
        Ok(content) => {
            let missing = missing_keywords(&content, &state.topic.keywords);
            if missing.is_empty() {
                debug!("All {} keywords present", state.topic.keywords.len());
            } else {
                debug!("Keywords not found in content: {}", missing.join(", "));
            }
            state.final_content = Some(content);
        }
        Err(e) => {
            error!("Optimize stage error: {}", e);
            state.record_error(Stage::Optimize, &e);
        }
    }

    state
}

fn finalize(state: &RunState) -> Result<DraftContent, StageError> {
    require(state.draft_content.as_ref(), Stage::Optimize, "draft content").cloned()
}

/// Keywords that appear in neither the title nor the body, ignoring case
fn missing_keywords<'a>(content: &DraftContent, keywords: &'a [String]) -> Vec<&'a str> {
    let haystack = format!("{}\n{}", content.title, content.content).to_lowercase();
    keywords
        .iter()
        .filter(|k| !haystack.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect()
}
