use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::Visibility;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Model identifier and sampling temperature for one generator role
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
}

/// Knowledge base ingestion and retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Documents retrieved per research query
    pub top_k: usize,
}

/// Revision loop and review thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub max_writing_iterations: u32,
    pub fact_confidence_threshold: f64,
    pub manual_approval: bool,
}

/// Word-count targets and post defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSettings {
    pub target_word_count: u32,
    pub min_word_count: u32,
    pub max_word_count: u32,
    pub default_category: String,
    pub default_tags: Vec<String>,
}

impl ContentSettings {
    /// Target handed to the outline prompt, kept within [min, max]
    pub fn bounded_target(&self) -> u32 {
        self.target_word_count
            .clamp(self.min_word_count, self.max_word_count.max(self.min_word_count))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub mode: Visibility,
    pub auto_publish: bool,
    pub tistory_api_key: Option<String>,
    pub tistory_blog_name: Option<String>,
}

impl PublishSettings {
    /// Visibility actually requested from the publisher
    pub fn effective_visibility(&self) -> Visibility {
        if self.auto_publish {
            self.mode
        } else {
            Visibility::Draft
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    pub file: Option<PathBuf>,
}

/// Process configuration, read once at startup and passed by reference
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    api_key: Option<String>,
    pub writer: ModelSettings,
    pub research: ModelSettings,
    pub critic: ModelSettings,
    pub max_tokens: u32,
    pub knowledge: KnowledgeSettings,
    pub pipeline: PipelineSettings,
    pub content: ContentSettings,
    pub publish: PublishSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any name -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let knowledge = KnowledgeSettings {
            chunk_size: env.parse("CHUNK_SIZE", 1000)?,
            chunk_overlap: env.parse("CHUNK_OVERLAP", 200)?,
            top_k: env.parse("RESEARCH_TOP_K", 10)?,
        };
        if knowledge.chunk_size == 0 || knowledge.chunk_overlap >= knowledge.chunk_size {
            return Err(ConfigError::Invalid {
                name: "CHUNK_OVERLAP",
                value: knowledge.chunk_overlap.to_string(),
                reason: format!(
                    "must be smaller than CHUNK_SIZE ({})",
                    knowledge.chunk_size
                ),
            });
        }

        let fact_confidence_threshold: f64 = env.parse("FACT_CONFIDENCE_THRESHOLD", 0.8)?;
        if !(0.0..=1.0).contains(&fact_confidence_threshold) {
            return Err(ConfigError::Invalid {
                name: "FACT_CONFIDENCE_THRESHOLD",
                value: fact_confidence_threshold.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }

        Ok(Self {
            api_key: env.get("ANTHROPIC_API_KEY"),
            writer: ModelSettings {
                model: env.string("LLM_MODEL", DEFAULT_MODEL),
                temperature: env.parse("LLM_TEMPERATURE", 0.7)?,
            },
            research: ModelSettings {
                model: env.string("RESEARCH_MODEL", DEFAULT_MODEL),
                temperature: env.parse("RESEARCH_TEMPERATURE", 0.3)?,
            },
            critic: ModelSettings {
                model: env.string("CRITIC_MODEL", DEFAULT_MODEL),
                temperature: env.parse("CRITIC_TEMPERATURE", 0.2)?,
            },
            max_tokens: env.parse("MAX_TOKENS", 4096)?,
            knowledge,
            pipeline: PipelineSettings {
                max_writing_iterations: env.parse("MAX_WRITING_ITERATIONS", 2)?,
                fact_confidence_threshold,
                manual_approval: env.flag("ENABLE_MANUAL_APPROVAL", false)?,
            },
            content: ContentSettings {
                target_word_count: env.parse("TARGET_WORD_COUNT", 1500)?,
                min_word_count: env.parse("MIN_WORD_COUNT", 800)?,
                max_word_count: env.parse("MAX_WORD_COUNT", 3000)?,
                default_category: env.string("DEFAULT_CATEGORY", "Tech"),
                default_tags: split_tags(&env.string("DEFAULT_TAGS", "AI,Tech,Tutorial")),
            },
            publish: PublishSettings {
                mode: env.parse("PUBLISH_MODE", Visibility::Draft)?,
                auto_publish: env.flag("AUTO_PUBLISH", false)?,
                tistory_api_key: env.get("TISTORY_API_KEY"),
                tistory_blog_name: env.get("TISTORY_BLOG_NAME"),
            },
            log: LogSettings {
                level: env.string("LOG_LEVEL", "info").to_ascii_lowercase(),
                file: env.get("LOG_FILE").map(PathBuf::from),
            },
        })
    }

    /// The generation API key; its absence is fatal for any run
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                name: "ANTHROPIC_API_KEY",
            })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Non-blank value of `name`
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: value.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    name,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            },
        }
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}
