use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::PublishSettings;
use crate::models::{DraftContent, PublishResult, Visibility};
use crate::publish::Publisher;

const DEFAULT_BASE_URL: &str = "https://www.tistory.com/apis";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Publishes posts through the Tistory open API
pub struct TistoryPublisher {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    blog_name: Option<String>,
}

impl TistoryPublisher {
    pub fn new(access_token: Option<String>, blog_name: Option<String>) -> Result<Self> {
        if access_token.is_none() {
            warn!("Tistory API key not configured");
        }
        if blog_name.is_none() {
            warn!("Tistory blog name not configured");
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token,
            blog_name,
        })
    }

    pub fn from_settings(settings: &PublishSettings) -> Result<Self> {
        Self::new(
            settings.tistory_api_key.clone(),
            settings.tistory_blog_name.clone(),
        )
    }
}

#[async_trait]
impl Publisher for TistoryPublisher {
    async fn publish(&self, content: &DraftContent, visibility: Visibility) -> Result<PublishResult> {
        let (Some(access_token), Some(blog_name)) = (&self.access_token, &self.blog_name) else {
            return Ok(PublishResult::failed("Tistory credentials not configured"));
        };

        info!("Publishing to Tistory: {} (mode: {})", content.title, visibility);

        let tags = content.tags.join(",");
        let form = [
            ("access_token", access_token.as_str()),
            ("output", "json"),
            ("blogName", blog_name.as_str()),
            ("title", content.title.as_str()),
            ("content", content.content.as_str()),
            ("visibility", visibility_code(visibility)),
            ("category", content.category.as_str()),
            ("tag", tags.as_str()),
        ];

        let response = self
            .client
            .post(format!("{}/post/write", self.base_url))
            .form(&form)
            .send()
            .await
            .context("Network error publishing to Tistory")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Tistory API error: {} - {}", status, body);
            return Ok(PublishResult::failed(format!(
                "Tistory API error: {} - {}",
                status, body
            )));
        }

        let body: TistoryEnvelope = response
            .json()
            .await
            .context("Failed to parse Tistory response")?;

        let result = interpret_response(body);
        if result.success {
            info!("Successfully published: {}", result.post_url.as_deref().unwrap_or(""));
        } else {
            error!(
                "Tistory API error: {}",
                result.error_message.as_deref().unwrap_or("")
            );
        }
        Ok(result)
    }
}

/// Tistory's numeric visibility: 0 private draft, 3 public
fn visibility_code(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Draft => "0",
        Visibility::Publish => "3",
    }
}

fn interpret_response(envelope: TistoryEnvelope) -> PublishResult {
    let body = envelope.tistory;
    if body.status == "200" {
        if let (Some(url), Some(post_id)) = (body.url, body.post_id) {
            return PublishResult::published(url, post_id);
        }
        return PublishResult::failed("Tistory response missing post id or url");
    }
    PublishResult::failed(
        body.error_message
            .unwrap_or_else(|| "Unknown error".to_string()),
    )
}

#[derive(Debug, Deserialize)]
struct TistoryEnvelope {
    tistory: TistoryBody,
}

#[derive(Debug, Deserialize)]
struct TistoryBody {
    status: String,
    #[serde(rename = "postId", default)]
    post_id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}
