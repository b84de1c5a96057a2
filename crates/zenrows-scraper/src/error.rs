//! Error types for the ZenRows scraper

use thiserror::Error;

/// Coarse classification of a [`ScrapeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tool could not be constructed or driven (no network call made)
    Configuration,
    /// The input was rejected before any network call
    Validation,
    /// The remote API rejected the API key
    Authentication,
    /// The remote call failed or returned an unusable response
    Request,
}

/// Errors that can occur while configuring the tool or scraping a URL
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No API key from the builder or the environment
    #[error(
        "ZenRows API key is required. Pass it to the builder or set the ZENROWS_API_KEY environment variable"
    )]
    MissingApiKey,

    /// Base endpoint override is not a usable URL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Blocking entry point called from inside an async runtime
    #[error("invoke_blocking cannot be called from within an async runtime; use invoke instead")]
    BlockingInAsyncContext,

    /// Failed to start the runtime backing the blocking entry point
    #[error("Failed to start runtime")]
    RuntimeError(#[source] std::io::Error),

    /// Arguments are not a JSON object
    #[error("Invalid arguments: {0}")]
    InvalidInput(String),

    /// URL is missing
    #[error("Field required: url")]
    MissingUrl,

    /// URL is not an absolute http(s) URL
    #[error("url must be a valid absolute http:// or https:// URL: {0}")]
    InvalidUrl(String),

    /// A field has the wrong type or shape
    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("proxy_country must be a two-letter country code")]
    InvalidProxyCountry,

    #[error("css_extractor must be valid JSON: {0}")]
    InvalidCssExtractor(String),

    #[error("response_type must be one of: raw, markdown, plaintext, pdf (got {0:?})")]
    InvalidResponseType(String),

    /// A custom header name or value cannot be sent over HTTP
    #[error("custom_headers contains an invalid header: {0}")]
    InvalidHeader(String),

    /// Remote API rejected the key (HTTP 401)
    #[error("Invalid ZenRows API key")]
    InvalidApiKey,

    /// Remote API answered with a non-success status
    #[error("ZenRows request failed with status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Failed to connect to the API
    #[error("Failed to connect to ZenRows API")]
    ConnectError(#[source] reqwest::Error),

    /// Other transport error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Binary output was requested but the body is not valid base64
    #[error("Failed to decode binary response body as base64")]
    InvalidBinaryBody(#[source] base64::DecodeError),
}

impl ScrapeError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ScrapeError::ConnectError(err)
        } else {
            ScrapeError::RequestError(err.to_string())
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::MissingApiKey
            | ScrapeError::InvalidBaseUrl(_)
            | ScrapeError::ClientBuildError(_)
            | ScrapeError::BlockingInAsyncContext
            | ScrapeError::RuntimeError(_) => ErrorKind::Configuration,
            ScrapeError::InvalidInput(_)
            | ScrapeError::MissingUrl
            | ScrapeError::InvalidUrl(_)
            | ScrapeError::InvalidField { .. }
            | ScrapeError::InvalidProxyCountry
            | ScrapeError::InvalidCssExtractor(_)
            | ScrapeError::InvalidResponseType(_)
            | ScrapeError::InvalidHeader(_) => ErrorKind::Validation,
            ScrapeError::InvalidApiKey => ErrorKind::Authentication,
            ScrapeError::HttpStatus { .. }
            | ScrapeError::ConnectError(_)
            | ScrapeError::RequestError(_)
            | ScrapeError::InvalidBinaryBody(_) => ErrorKind::Request,
        }
    }

    /// True if the input was rejected before any network call
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}
