use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::{DraftContent, PublishResult, Visibility, truncate_chars};
use crate::publish::Publisher;

pub const DRY_RUN_POST_ID: &str = "dry-run-12345";

/// Publisher for non-production runs: reports success without any network call
#[derive(Debug, Default)]
pub struct DryRunPublisher;

impl DryRunPublisher {
    /// Placeholder URL derived from the first 20 characters of the title
    pub fn placeholder_url(title: &str) -> String {
        format!("https://example.tistory.com/dry-run-{}", truncate_chars(title, 20))
    }
}

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, content: &DraftContent, visibility: Visibility) -> Result<PublishResult> {
        info!("[DRY RUN] Would publish: {}", content.title);
        info!("[DRY RUN] Mode: {}", visibility);
        info!("[DRY RUN] Word count: {}", content.word_count);
        info!("[DRY RUN] Tags: {}", content.tags.join(", "));

        Ok(PublishResult::published(
            Self::placeholder_url(&content.title),
            DRY_RUN_POST_ID,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        let draft = DraftContent::new(
            "Ownership and Borrowing in Rust",
            "body",
            "meta",
            vec!["AI".to_string()],
            "Tech",
        );
        let result = DryRunPublisher.publish(&draft, Visibility::Draft).await.unwrap();

        assert!(result.success);
        assert_eq!(
            result.post_url.as_deref(),
            Some("https://example.tistory.com/dry-run-Ownership and Borrow")
        );
        assert_eq!(result.post_id.as_deref(), Some(DRY_RUN_POST_ID));
        assert!(result.published_at.is_some());
    }
}
