//! HTTP client for the caption generator

use crate::error::{NetworkError, NetworkResult};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use storysnaps_resilience::{retry_async, RetryPolicy};

/// Body posted to the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Base64-encoded photo
    pub image: String,
    /// Story text so far, empty for a first page
    pub previous_stories: String,
    /// Ask for a conclusion instead of a continuation
    pub end_story: bool,
}

impl GenerationRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            previous_stories: String::new(),
            end_story: false,
        }
    }

    pub fn with_previous_stories(mut self, previous: impl Into<String>) -> Self {
        self.previous_stories = previous.into();
        self
    }

    pub fn ending(mut self, end_story: bool) -> Self {
        self.end_story = end_story;
        self
    }
}

/// Body returned by the generator
///
/// `story` is `null` when the model call failed on the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub story: Option<String>,
}

/// Something that turns a photo and story context into caption text
pub trait StoryGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = NetworkResult<String>> + Send;
}

/// Generator client configuration
#[derive(Debug, Clone)]
pub struct GeneratorClientConfig {
    /// Full URL of the generation endpoint
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Retry policy for server and transport failures
    pub retry_policy: RetryPolicy,
}

impl GeneratorClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }
}

impl Default for GeneratorClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/generate".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("StorySnaps/{}", env!("CARGO_PKG_VERSION")),
            retry_policy: RetryPolicy::new(3),
        }
    }
}

/// Posts generation requests as JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpStoryGenerator {
    inner: ReqwestClient,
    config: GeneratorClientConfig,
}

impl HttpStoryGenerator {
    pub fn new(config: GeneratorClientConfig) -> NetworkResult<Self> {
        if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
            return Err(NetworkError::InvalidUrl(config.endpoint));
        }

        let inner = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner, config })
    }

    pub fn config(&self) -> &GeneratorClientConfig {
        &self.config
    }

    async fn post_once(&self, request: &GenerationRequest) -> NetworkResult<String> {
        log::debug!(
            "Requesting story from {} (context {} chars, end: {})",
            self.config.endpoint,
            request.previous_stories.len(),
            request.end_story
        );

        let response = self
            .inner
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerationResponse = response.json().await?;
        match parsed.story {
            Some(story) if !story.trim().is_empty() => Ok(story),
            _ => Err(NetworkError::EmptyStory),
        }
    }
}

impl StoryGenerator for HttpStoryGenerator {
    async fn generate(&self, request: &GenerationRequest) -> NetworkResult<String> {
        let story = retry_async(
            &self.config.retry_policy,
            NetworkError::is_retryable,
            || self.post_once(request),
        )
        .await?;

        log::info!("Generated {} chars of story text", story.len());
        Ok(story)
    }
}
