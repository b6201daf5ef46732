use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::models::{DraftContent, RunState};

/// Paths written for one run
#[derive(Debug, Clone)]
pub struct WrittenRecord {
    pub state_path: PathBuf,
    /// Absent when the run produced no final content
    pub post_path: Option<PathBuf>,
}

/// Writes the run state and the finished post into an output directory
#[derive(Debug, Clone)]
pub struct RunRecordWriter {
    dir: PathBuf,
}

impl RunRecordWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, state: &RunState) -> Result<WrittenRecord> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.write_with_timestamp(state, &timestamp)
    }

    fn write_with_timestamp(&self, state: &RunState, timestamp: &str) -> Result<WrittenRecord> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output directory: {:?}", self.dir))?;

        let stem = format!("{}_{}", timestamp, short_run_id(state));
        let state_path = self.dir.join(format!("state_{}.json", stem));
        write_json(&state_path, state)?;

        let post_path = match &state.final_content {
            Some(content) => {
                let path = self.dir.join(format!("post_{}.md", stem));
                std::fs::write(&path, render_post(content))
                    .with_context(|| format!("Failed to write file: {:?}", path))?;
                Some(path)
            }
            None => None,
        };

        Ok(WrittenRecord {
            state_path,
            post_path,
        })
    }
}

/// First block of the run id; keeps runs started in the same second apart
fn short_run_id(state: &RunState) -> String {
    state.run_id.simple().to_string().chars().take(8).collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Markdown post with a front-matter header
pub fn render_post(content: &DraftContent) -> String {
    let mut output = String::from("---\n");
    output.push_str(&format!("title: {}\n", content.title));
    output.push_str(&format!("tags: {}\n", content.tags.join(", ")));
    output.push_str(&format!("category: {}\n", content.category));
    output.push_str(&format!("word_count: {}\n", content.word_count));
    output.push_str(&format!("created: {}\n", content.created_at.to_rfc3339()));
    output.push_str("---\n\n");
    output.push_str(&content.content);
    output
}
