//! Tool builder and contract for the ZenRows scraper

use crate::client;
use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::types::{ScrapeOutput, ScrapeRequest};
use crate::{API_KEY_ENV, DEFAULT_USER_AGENT, TOOL_DESCRIPTION, TOOL_LLMTXT, TOOL_NAME};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status update during tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStatus {
    /// Current phase ("validate", "request", "decode", "complete")
    pub phase: String,
    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Estimated completion percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f32>,
}

impl ToolStatus {
    /// Create a new status with phase
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: None,
            percent_complete: None,
        }
    }

    /// Set message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set completion percentage
    pub fn with_percent(mut self, percent: f32) -> Self {
        self.percent_complete = Some(percent);
        self
    }
}

/// Builder for configuring the scraper tool
#[derive(Clone, Default)]
pub struct ScraperBuilder {
    /// Explicit API key, takes precedence over the environment
    api_key: Option<String>,
    /// Endpoint override
    base_url: Option<String>,
    /// Custom User-Agent for calls to the API
    user_agent: Option<String>,
}

impl ScraperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key (otherwise read from `ZENROWS_API_KEY`)
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point the tool at a different endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Build the tool
    ///
    /// Fails with [`ScrapeError::MissingApiKey`] when no key is set here or
    /// in the environment.
    pub fn build(self) -> Result<Scraper, ScrapeError> {
        let env_key = std::env::var(API_KEY_ENV).ok();
        self.build_with_env_key(env_key)
    }

    /// Build against an already-read `ZENROWS_API_KEY` value
    fn build_with_env_key(self, env_key: Option<String>) -> Result<Scraper, ScrapeError> {
        let config = ScraperConfig::resolve(self.api_key, env_key, self.base_url.as_deref())?;

        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers.clone())
            .build()
            .map_err(ScrapeError::ClientBuildError)?;

        // Each blocking call runs on its own short-lived runtime, so pooled
        // connections must not outlive the call.
        let blocking_http = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ScrapeError::ClientBuildError)?;

        Ok(Scraper {
            config,
            http,
            blocking_http,
        })
    }
}

impl std::fmt::Debug for ScraperBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Configured ZenRows Universal Scraper tool
///
/// Every call validates its input, sends exactly one GET and returns the
/// body as text or bytes. Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Scraper {
    config: ScraperConfig,
    http: reqwest::Client,
    blocking_http: reqwest::Client,
}

impl Scraper {
    /// Create a new tool builder
    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// Build a tool from `ZENROWS_API_KEY` with default settings
    pub fn from_env() -> Result<Self, ScrapeError> {
        ScraperBuilder::new().build()
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Tool name as registered with an LLM framework
    pub fn name(&self) -> &'static str {
        TOOL_NAME
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> Value {
        let schema = schema_for!(ScrapeRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Scrape with a typed request
    pub async fn scrape(&self, req: &ScrapeRequest) -> Result<ScrapeOutput, ScrapeError> {
        self.scrape_on(&self.http, req).await
    }

    /// Scrape with untyped tool arguments
    pub async fn invoke(&self, args: Value) -> Result<ScrapeOutput, ScrapeError> {
        let req = ScrapeRequest::from_value(args)?;
        self.scrape(&req).await
    }

    /// Blocking variant of [`Scraper::invoke`]
    ///
    /// Drives the same call on a private single-threaded runtime. Calling it
    /// from inside a Tokio runtime returns
    /// [`ScrapeError::BlockingInAsyncContext`].
    pub fn invoke_blocking(&self, args: Value) -> Result<ScrapeOutput, ScrapeError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ScrapeError::BlockingInAsyncContext);
        }

        let req = ScrapeRequest::from_value(args)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ScrapeError::RuntimeError)?;

        runtime.block_on(self.scrape_on(&self.blocking_http, &req))
    }

    async fn scrape_on(
        &self,
        http: &reqwest::Client,
        req: &ScrapeRequest,
    ) -> Result<ScrapeOutput, ScrapeError> {
        req.validate()?;
        let response = client::send(http, &self.config, req).await?;
        client::read_output(req, response).await
    }

    /// Scrape with status updates
    pub async fn scrape_with_status<F>(
        &self,
        req: &ScrapeRequest,
        mut status_callback: F,
    ) -> Result<ScrapeOutput, ScrapeError>
    where
        F: FnMut(ToolStatus),
    {
        status_callback(ToolStatus::new("validate").with_percent(0.0));
        req.validate()?;

        status_callback(
            ToolStatus::new("request")
                .with_message(format!("Scraping {}", req.url))
                .with_percent(10.0),
        );
        let response = client::send(&self.http, &self.config, req).await?;

        let phase = if req.wants_binary() {
            "Decoding binary content"
        } else {
            "Reading content"
        };
        status_callback(
            ToolStatus::new("decode")
                .with_message(phase)
                .with_percent(80.0),
        );
        let result = client::read_output(req, response).await;

        status_callback(ToolStatus::new("complete").with_percent(100.0));

        result
    }
}
