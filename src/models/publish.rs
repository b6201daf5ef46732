use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a post goes out as a draft or publicly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Draft,
    Publish,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Draft => f.write_str("draft"),
            Visibility::Publish => f.write_str("publish"),
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Visibility::Draft),
            "publish" => Ok(Visibility::Publish),
            other => Err(format!("expected \"draft\" or \"publish\", got {:?}", other)),
        }
    }
}

/// Outcome of a publishing attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub success: bool,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl PublishResult {
    pub fn published(post_url: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            success: true,
            post_url: Some(post_url.into()),
            post_id: Some(post_id.into()),
            error_message: None,
            published_at: Some(Utc::now()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            post_url: None,
            post_id: None,
            error_message: Some(message.into()),
            published_at: None,
        }
    }
}
