use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A written post. Used for both the draft and the final content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftContent {
    pub title: String,
    /// Full body in Markdown
    pub content: String,
    pub meta_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

fn default_category() -> String {
    "Tech".to_string()
}

impl DraftContent {
    /// Build a draft, counting words from the body
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        meta_description: impl Into<String>,
        tags: Vec<String>,
        category: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let word_count = count_words(&content);
        Self {
            title: title.into(),
            content,
            meta_description: meta_description.into(),
            tags,
            category: category.into(),
            word_count,
            created_at: Utc::now(),
        }
    }

    /// The first `max_chars` characters of the body
    pub fn excerpt(&self, max_chars: usize) -> &str {
        truncate_chars(&self.content, max_chars)
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cut `text` to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
