use serde::{Deserialize, Serialize};

/// Outcome of the quality review of a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    pub approved: bool,
    /// Overall quality (0.0 - 1.0)
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// How well claims are supported by the research facts (0.0 - 1.0)
    pub factual_accuracy: f64,
}

impl QaResult {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("score", self.score), ("factual_accuracy", self.factual_accuracy)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} {} is outside 0-1", name, value));
            }
        }
        Ok(())
    }

    /// Issues and suggestions formatted as revision notes
    pub fn revision_notes(&self) -> String {
        let mut notes = String::new();
        if !self.issues.is_empty() {
            notes.push_str("Issues:\n");
            for issue in &self.issues {
                notes.push_str(&format!("- {}\n", issue));
            }
        }
        if !self.suggestions.is_empty() {
            notes.push_str("Suggestions:\n");
            for suggestion in &self.suggestions {
                notes.push_str(&format!("- {}\n", suggestion));
            }
        }
        notes
    }
}
