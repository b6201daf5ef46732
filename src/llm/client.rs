use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ModelSettings, Settings};
use crate::error::ConfigError;
use crate::llm::{Generator, StructuredOutput};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Configuration for one Anthropic-backed generator
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Config for one generator role, sharing the key and token limit
    pub fn for_role(settings: &Settings, role: &ModelSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: settings.require_api_key()?.to_string(),
            model: role.model.clone(),
            temperature: role.temperature,
            max_tokens: settings.max_tokens,
        })
    }
}

/// Anthropic Messages API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn post(&self, request: &MessagesRequest<'_>) -> Result<MessagesResponse> {
        debug!(model = %self.config.model, "Sending request to Anthropic API");

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Anthropic API response")
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system),
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            tools: None,
            tool_choice: None,
        }
    }
}

#[async_trait]
impl Generator for AnthropicClient {
    async fn generate_text(&self, system: &str, user: &str) -> Result<String> {
        let response = self.post(&self.request(system, user)).await?;
        extract_text(&response)
    }

    async fn generate_structured(
        &self,
        system: &str,
        user: &str,
        output: &StructuredOutput,
    ) -> Result<serde_json::Value> {
        let mut request = self.request(system, user);
        request.tools = Some(vec![Tool {
            name: output.name,
            description: output.description,
            input_schema: &output.schema,
        }]);
        request.tool_choice = Some(ToolChoice {
            choice_type: "tool",
            name: output.name,
        });

        let response = self.post(&request).await?;
        extract_tool_input(&response, output.name)
    }
}

/// Text of the first text block
fn extract_text(response: &MessagesResponse) -> Result<String> {
    response
        .content
        .iter()
        .find(|c| c.content_type == "text")
        .map(|c| c.text.clone())
        .context("No text content in response")
}

/// Input of the tool_use block for `tool_name`
fn extract_tool_input(response: &MessagesResponse, tool_name: &str) -> Result<serde_json::Value> {
    response
        .content
        .iter()
        .find(|c| c.content_type == "tool_use" && c.name.as_deref() == Some(tool_name))
        .and_then(|c| c.input.clone())
        .with_context(|| format!("No tool_use response for {}", tool_name))
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    choice_type: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
