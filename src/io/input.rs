use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::Topic;

/// Read a topic from a JSON file
pub fn load_topic_file(path: &Path) -> Result<Topic> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_topic_json(&content)
}

/// Parse a topic, normalizing keywords the same way as [`Topic::with_keywords`]
pub fn parse_topic_json(json: &str) -> Result<Topic> {
    let mut topic: Topic = serde_json::from_str(json).context("Failed to parse topic JSON")?;
    if topic.title.trim().is_empty() {
        bail!("Topic title must not be empty");
    }
    let keywords = std::mem::take(&mut topic.keywords);
    Ok(topic.with_keywords(keywords))
}
