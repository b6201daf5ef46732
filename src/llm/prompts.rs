use crate::models::{DraftContent, Outline, QaResult, ResearchContext, Topic};

pub const RESEARCH_SYSTEM_PROMPT: &str =
    "You are a research assistant. Extract key facts from the provided context.";

pub const OUTLINE_SYSTEM_PROMPT: &str = r#"You are an expert content strategist. Create detailed blog post outlines
that are well-structured, logical, and engaging for technical readers.
Submit the outline with the submit_outline tool."#;

pub const META_SYSTEM_PROMPT: &str =
    "Create a compelling 150-160 character meta description for SEO. Reply with the description only.";

pub const CRITIC_SYSTEM_PROMPT: &str = r#"You are a meticulous fact-checker and editor. Review blog posts for:
1. Factual accuracy (all claims must be supported by provided facts)
2. Logical flow and coherence
3. Redundancy or repetition
4. Writing quality
5. Hallucinations or unsupported claims

Be strict but constructive. Submit your verdict with the submit_review tool."#;

/// Separator between passages in the fact extraction prompt
const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

pub fn build_research_prompt(topic: &Topic, passages: &[&str]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!("Topic: {}\n", topic.title));
    prompt.push_str(&format!("Description: {}\n\n", topic.description));
    prompt.push_str("Context:\n");
    prompt.push_str(&passages.join(PASSAGE_SEPARATOR));
    prompt.push_str("\n\nExtract 5-10 key facts that are relevant to writing a blog post about this topic.\n");
    prompt.push_str("Submit them with the submit_facts tool.");
    prompt
}

pub fn build_outline_prompt(
    topic: &Topic,
    research: &ResearchContext,
    target_word_count: u32,
) -> String {
    let mut prompt = String::from("Create a detailed blog post outline for:\n\n");
    prompt.push_str(&format!("Title: {}\n", topic.title));
    prompt.push_str(&format!("Description: {}\n", topic.description));
    prompt.push_str(&format!("Target Audience: {}\n", topic.target_audience));
    prompt.push_str(&format!("Target Word Count: {}\n\n", target_word_count));
    prompt.push_str("Key Facts:\n");
    prompt.push_str(&facts_or_placeholder(research));
    prompt.push_str("\n\nEach section needs a heading, a level (1-3), the points to cover and an estimated word count.");
    prompt
}

/// System prompt for the writer; tone and audience come from the topic
pub fn build_writer_system_prompt(topic: &Topic) -> String {
    format!(
        r#"You are an expert technical writer. Write engaging, accurate, and well-structured
blog posts in Markdown format. Use ONLY the provided facts - do not make up information.

Guidelines:
- Write in {} tone
- Use Markdown formatting (headers, code blocks, lists, bold/italic)
- Include practical examples where relevant
- Maintain logical flow between sections
- Write for {}
- Cite facts from the research context"#,
        topic.tone, topic.target_audience
    )
}

/// User prompt for a write pass; `feedback` is the previous review, if any
pub fn build_write_prompt(
    outline: &Outline,
    research: &ResearchContext,
    feedback: Option<&QaResult>,
) -> String {
    let mut prompt = String::from("Write a complete blog post following this outline:\n\n");
    prompt.push_str(&outline.render());
    prompt.push_str("\n\nUse these verified facts:\n");
    prompt.push_str(&facts_or_placeholder(research));
    prompt.push_str(&format!(
        "\n\nTarget word count: {}\n",
        outline.total_estimated_words
    ));

    if let Some(review) = feedback {
        let notes = review.revision_notes();
        if !notes.is_empty() {
            prompt.push_str("\n## Reviewer feedback on the previous draft\n");
            prompt.push_str(&notes);
            prompt.push_str("Address every issue above in this revision.\n");
        }
    }

    prompt.push_str("\nReturn the complete blog post in Markdown format.");
    prompt
}

pub fn build_meta_prompt(title: &str, excerpt: &str) -> String {
    format!("Title: {}\n\nExcerpt: {}\n\nMeta description:", title, excerpt)
}

pub fn build_review_prompt(
    draft: &DraftContent,
    body: &str,
    research: &ResearchContext,
    threshold: f64,
) -> String {
    let mut prompt = String::from("Review this blog post:\n\n");
    prompt.push_str(&format!("Title: {}\n", draft.title));
    prompt.push_str("Content:\n");
    prompt.push_str(body);
    prompt.push_str("\n\nVerified Facts:\n");
    prompt.push_str(&facts_or_placeholder(research));
    prompt.push_str(&format!("\n\nMinimum confidence threshold: {}\n", threshold));
    prompt
}

fn facts_or_placeholder(research: &ResearchContext) -> String {
    if research.key_facts.is_empty() {
        "(no verified facts available)".to_string()
    } else {
        research.facts_as_bullets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutlineSection;

    fn outline() -> Outline {
        Outline {
            title: "Async Rust".to_string(),
            introduction: "Why async".to_string(),
            sections: vec![OutlineSection {
                heading: "Futures".to_string(),
                level: 1,
                content_points: vec!["poll".to_string()],
                estimated_words: 300,
            }],
            conclusion: "Go build".to_string(),
            total_estimated_words: 1200,
        }
    }

    #[test]
    fn test_research_prompt_joins_passages() {
        let topic = Topic::new("Async Rust", "Futures and executors");
        let prompt = build_research_prompt(&topic, &["first", "second"]);
        assert!(prompt.contains("first\n\n---\n\nsecond"));
        assert!(prompt.contains("Description: Futures and executors"));
    }

    #[test]
    fn test_outline_prompt_marks_missing_facts() {
        let topic = Topic::new("X", "");
        let prompt = build_outline_prompt(&topic, &ResearchContext::empty(), 1500);
        assert!(prompt.contains("Target Word Count: 1500"));
        assert!(prompt.contains("(no verified facts available)"));
    }

    #[test]
    fn test_write_prompt_includes_feedback_only_on_revision() {
        let research = ResearchContext::from_sources(vec![], vec!["Futures are lazy".to_string()]);
        let first = build_write_prompt(&outline(), &research, None);
        assert!(first.contains("- Futures are lazy"));
        assert!(first.contains("Target word count: 1200"));
        assert!(!first.contains("Reviewer feedback"));

        let review = QaResult {
            approved: false,
            score: 0.3,
            issues: vec!["Too short".to_string()],
            suggestions: vec![],
            factual_accuracy: 0.8,
        };
        let revision = build_write_prompt(&outline(), &research, Some(&review));
        assert!(revision.contains("Reviewer feedback"));
        assert!(revision.contains("- Too short"));
    }

    #[test]
    fn test_writer_system_prompt_uses_topic_voice() {
        let mut topic = Topic::new("X", "");
        topic.tone = "playful".to_string();
        let prompt = build_writer_system_prompt(&topic);
        assert!(prompt.contains("Write in playful tone"));
        assert!(prompt.contains("Write for technical readers"));
    }
}
