use serde::{Deserialize, Serialize};

/// What a run is about. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Working title for the post
    pub title: String,
    /// Brief description of what to cover
    #[serde(default)]
    pub description: String,
    /// Target keywords, in the order given
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_audience() -> String {
    "technical readers".to_string()
}

fn default_tone() -> String {
    "informative and engaging".to_string()
}

impl Topic {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            keywords: Vec::new(),
            target_audience: default_audience(),
            tone: default_tone(),
        }
    }

    /// Add keywords, skipping blanks and case-insensitive duplicates
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for keyword in keywords {
            let keyword = keyword.into().trim().to_string();
            if keyword.is_empty() {
                continue;
            }
            if !self
                .keywords
                .iter()
                .any(|k| k.eq_ignore_ascii_case(&keyword))
            {
                self.keywords.push(keyword);
            }
        }
        self
    }

    /// The retrieval query built from title, description and keywords
    pub fn research_query(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.keywords.join(" ")
        )
        .trim()
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_defaults_from_json() {
        let topic: Topic = serde_json::from_str(r#"{"title": "X"}"#).unwrap();
        assert_eq!(topic.title, "X");
        assert!(topic.description.is_empty());
        assert!(topic.keywords.is_empty());
        assert_eq!(topic.target_audience, "technical readers");
        assert_eq!(topic.tone, "informative and engaging");
    }

    #[test]
    fn test_with_keywords_dedupes_and_skips_blanks() {
        let topic = Topic::new("Rust", "Ownership").with_keywords(["rust", " ", "Tokio", "RUST"]);
        assert_eq!(topic.keywords, vec!["rust", "Tokio"]);
    }

    #[test]
    fn test_research_query() {
        let topic = Topic::new("Rust", "Ownership basics").with_keywords(["borrowing", "lifetimes"]);
        assert_eq!(topic.research_query(), "Rust Ownership basics borrowing lifetimes");

        let bare = Topic::new("X", "");
        assert_eq!(bare.research_query(), "X");
    }
}
