//! Scripted collaborators for driving the pipeline without a network.
//!
//! Each fake answers from a queue filled by the test and records what it was
//! asked, so tests can check both the outcome and the prompts that led to it.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{Generator, StructuredOutput};
use crate::models::{DraftContent, PublishResult, Visibility};
use crate::publish::{Approver, Publisher};
use crate::rag::{Retriever, ScoredDocument};

/// Generator that replays queued answers in order.
///
/// Text and structured answers have separate queues. When a queue runs dry
/// the matching fallback is used if one is set, otherwise the call fails.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    text: Mutex<VecDeque<Result<String, String>>>,
    structured: Mutex<VecDeque<Result<Value, String>>>,
    text_fallback: Option<String>,
    structured_fallback: Option<Value>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        push(&self.text, Ok(text.into()));
        self
    }

    pub fn with_text_error(self, message: impl Into<String>) -> Self {
        push(&self.text, Err(message.into()));
        self
    }

    pub fn with_structured(self, value: Value) -> Self {
        push(&self.structured, Ok(value));
        self
    }

    pub fn with_structured_error(self, message: impl Into<String>) -> Self {
        push(&self.structured, Err(message.into()));
        self
    }

    /// Answer every text call with `text` once the queue is empty
    pub fn always_text(mut self, text: impl Into<String>) -> Self {
        self.text_fallback = Some(text.into());
        self
    }

    /// Answer every structured call with `value` once the queue is empty
    pub fn always_structured(mut self, value: Value) -> Self {
        self.structured_fallback = Some(value);
        self
    }

    /// User prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    fn record(&self, user: &str) {
        lock(&self.prompts).push(user.to_string());
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate_text(&self, _system: &str, user: &str) -> Result<String> {
        self.record(user);
        let next = lock(&self.text).pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => self
                .text_fallback
                .clone()
                .ok_or_else(|| anyhow!("no scripted text response left")),
        }
    }

    async fn generate_structured(
        &self,
        _system: &str,
        user: &str,
        output: &StructuredOutput,
    ) -> Result<Value> {
        self.record(user);
        let next = lock(&self.structured).pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => self
                .structured_fallback
                .clone()
                .ok_or_else(|| anyhow!("no scripted {} response left", output.name)),
        }
    }
}

/// Retriever over a fixed result list
#[derive(Debug, Default)]
pub struct StaticRetriever {
    results: Vec<ScoredDocument>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(results: Vec<ScoredDocument>) -> Self {
        Self {
            results,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve_with_scores(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        lock(&self.queries).push(query.to_string());
        self.results.iter().take(k).cloned().collect()
    }
}

/// Publisher that records each call and answers with a fixed outcome
#[derive(Debug)]
pub struct RecordingPublisher {
    outcome: Result<PublishResult, String>,
    calls: Mutex<Vec<(DraftContent, Visibility)>>,
}

impl RecordingPublisher {
    /// Answers every call with `result`
    pub fn returning(result: PublishResult) -> Self {
        Self {
            outcome: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call as if the platform were unreachable
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(DraftContent, Visibility)> {
        lock(&self.calls).clone()
    }

    /// Visibility of the most recent call
    pub fn last_visibility(&self) -> Option<Visibility> {
        lock(&self.calls).last().map(|(_, visibility)| *visibility)
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, content: &DraftContent, visibility: Visibility) -> Result<PublishResult> {
        lock(&self.calls).push((content.clone(), visibility));
        match &self.outcome {
            Ok(result) => Ok(result.clone()),
            Err(message) => Err(anyhow!(message.clone())),
        }
    }
}

/// Approver with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct ScriptedApprover(pub bool);

impl Approver for ScriptedApprover {
    fn approve(&self, _title: &str) -> Result<bool> {
        Ok(self.0)
    }
}

fn push<T>(queue: &Mutex<VecDeque<T>>, item: T) {
    lock(queue).push_back(item);
}

/// A poisoned lock only means another test thread panicked; keep the data
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
