pub mod approval;
pub mod dry_run;
pub mod tistory;

pub use approval::*;
pub use dry_run::*;
pub use tistory::*;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DraftContent, PublishResult, Visibility};

/// Destination for finished posts. Only the publish stage calls this.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `content`.
    ///
    /// A rejection by the platform is `Ok` with `success: false`; `Err` is
    /// kept for failures to reach the platform at all.
    async fn publish(&self, content: &DraftContent, visibility: Visibility) -> Result<PublishResult>;
}
