use serde::{Deserialize, Serialize};

/// One heading of the planned post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    /// Heading level (1-3)
    pub level: u8,
    #[serde(default)]
    pub content_points: Vec<String>,
    #[serde(default = "default_section_words")]
    pub estimated_words: u32,
}

fn default_section_words() -> u32 {
    200
}

/// The planned structure of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub introduction: String,
    pub sections: Vec<OutlineSection>,
    pub conclusion: String,
    pub total_estimated_words: u32,
}

impl Outline {
    /// Check structural rules a generated outline must satisfy
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("outline has an empty title".to_string());
        }
        for section in &self.sections {
            if !(1..=3).contains(&section.level) {
                return Err(format!(
                    "section {:?} has level {}, expected 1-3",
                    section.heading, section.level
                ));
            }
        }
        Ok(())
    }

    /// Plain-text rendering used as the writing brief
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("# {}", self.title),
            format!("\nIntroduction: {}\n", self.introduction),
        ];

        for section in &self.sections {
            let prefix = "#".repeat(usize::from(section.level) + 1);
            lines.push(format!("\n{} {}", prefix, section.heading));
            lines.push("Points to cover:".to_string());
            for point in &section.content_points {
                lines.push(format!("  - {}", point));
            }
        }

        lines.push(format!("\nConclusion: {}", self.conclusion));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(heading: &str, level: u8) -> OutlineSection {
        OutlineSection {
            heading: heading.to_string(),
            level,
            content_points: vec!["a point".to_string()],
            estimated_words: 200,
        }
    }

    fn outline(sections: Vec<OutlineSection>) -> Outline {
        Outline {
            title: "Title".to_string(),
            introduction: "Intro".to_string(),
            sections,
            conclusion: "Wrap up".to_string(),
            total_estimated_words: 1500,
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_level() {
        assert!(outline(vec![section("Ok", 1), section("Deep", 3)]).validate().is_ok());

        let err = outline(vec![section("Too deep", 4)]).validate().unwrap_err();
        assert!(err.contains("level 4"));
        assert!(outline(vec![section("Zero", 0)]).validate().is_err());
    }

    #[test]
    fn test_section_defaults() {
        let section: OutlineSection =
            serde_json::from_str(r#"{"heading": "Why", "level": 2}"#).unwrap();
        assert_eq!(section.estimated_words, 200);
        assert!(section.content_points.is_empty());
    }

    #[test]
    fn test_render_nests_headings_by_level() {
        let rendered = outline(vec![section("Basics", 1), section("Details", 2)]).render();
        assert!(rendered.starts_with("# Title"));
        assert!(rendered.contains("\n## Basics"));
        assert!(rendered.contains("\n### Details"));
        assert!(rendered.contains("  - a point"));
        assert!(rendered.ends_with("Conclusion: Wrap up"));
    }
}
