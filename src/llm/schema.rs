use serde_json::json;

use crate::llm::StructuredOutput;

/// Key facts extracted from research passages
pub fn facts_output() -> StructuredOutput {
    StructuredOutput {
        name: "submit_facts",
        description: "Submit the key facts extracted from the research context",
        schema: json!({
            "type": "object",
            "properties": {
                "facts": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "5-10 facts relevant to the topic"
                }
            },
            "required": ["facts"]
        }),
    }
}

pub fn outline_output() -> StructuredOutput {
    StructuredOutput {
        name: "submit_outline",
        description: "Submit the structured blog post outline",
        schema: json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Final SEO-friendly title"},
                "introduction": {"type": "string"},
                "sections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "heading": {"type": "string"},
                            "level": {"type": "integer", "minimum": 1, "maximum": 3},
                            "content_points": {"type": "array", "items": {"type": "string"}},
                            "estimated_words": {"type": "integer"}
                        },
                        "required": ["heading", "level"]
                    }
                },
                "conclusion": {"type": "string"},
                "total_estimated_words": {"type": "integer"}
            },
            "required": ["title", "introduction", "sections", "conclusion"]
        }),
    }
}

pub fn review_output() -> StructuredOutput {
    StructuredOutput {
        name: "submit_review",
        description: "Submit the quality review of the blog post",
        schema: json!({
            "type": "object",
            "properties": {
                "approved": {"type": "boolean", "description": "true if the post meets quality standards"},
                "score": {"type": "number", "minimum": 0, "maximum": 1},
                "issues": {"type": "array", "items": {"type": "string"}},
                "suggestions": {"type": "array", "items": {"type": "string"}},
                "factual_accuracy": {"type": "number", "minimum": 0, "maximum": 1}
            },
            "required": ["approved", "score", "issues", "suggestions", "factual_accuracy"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outputs_have_distinct_names() {
        let names = [facts_output().name, outline_output().name, review_output().name];
        assert_eq!(names, ["submit_facts", "submit_outline", "submit_review"]);
    }

    #[test]
    fn test_review_schema_requires_scores() {
        let schema = review_output().schema;
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"approved"));
        assert!(required.contains(&"factual_accuracy"));
    }
}
