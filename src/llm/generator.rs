use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// A named JSON schema the model must answer with
#[derive(Debug, Clone)]
pub struct StructuredOutput {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: serde_json::Value,
}

/// Text generation backend.
///
/// The pipeline uses three independently configured instances: research
/// extraction, outline and writing, and critique.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Free-form text answer
    async fn generate_text(&self, system: &str, user: &str) -> Result<String>;

    /// Answer shaped by `output`; a response that does not fit is an error
    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        output: &StructuredOutput,
    ) -> Result<serde_json::Value>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate_text(&self, system: &str, user: &str) -> Result<String> {
        (**self).generate_text(system, user).await
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        output: &StructuredOutput,
    ) -> Result<serde_json::Value> {
        (**self).generate_structured(system, user, output).await
    }
}
