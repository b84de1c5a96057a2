//! Core types for the ZenRows scraper

use bytes::Bytes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Output format produced by the remote API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Page HTML as returned by the target
    #[default]
    Raw,
    /// Page converted to markdown
    Markdown,
    /// Page converted to plain text
    Plaintext,
    /// Page rendered to a PDF document
    Pdf,
}

impl ResponseType {
    /// All accepted values, in schema order
    pub const ALL: [ResponseType; 4] = [
        ResponseType::Raw,
        ResponseType::Markdown,
        ResponseType::Plaintext,
        ResponseType::Pdf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Raw => "raw",
            ResponseType::Markdown => "markdown",
            ResponseType::Plaintext => "plaintext",
            ResponseType::Pdf => "pdf",
        }
    }

    /// True for formats the API delivers as binary content
    pub fn is_binary(&self) -> bool {
        matches!(self, ResponseType::Pdf)
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResponseType::ALL
            .into_iter()
            .find(|rt| rt.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scraping options for a single call to the Universal Scraper API
///
/// Only `url` is required. Options that are unset (or `false` for
/// `js_render` and `premium_proxy`) are not sent to the API. Build one in
/// code with [`ScrapeRequest::new`] and the chained setters, or from untyped
/// tool arguments with [`ScrapeRequest::from_value`]. The serde
/// `Deserialize` impl is the strict typed path: it does not coerce strings
/// or run validation. Either way,
/// [`ScrapeRequest::validate`] runs before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeRequest {
    /// The URL to scrape (required, absolute http:// or https:// URL)
    pub url: String,

    /// Render the page in a headless browser before returning it
    #[serde(default)]
    pub js_render: bool,

    /// JSON array of browser actions to run after load, e.g.
    /// `[{"click": "#submit"}, {"wait": 500}]`. Requires js_render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_instructions: Option<String>,

    /// Route the request through residential proxies
    #[serde(default)]
    pub premium_proxy: bool,

    /// Two-letter country code for geo-targeted premium proxies, e.g. "us"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_country: Option<String>,

    /// Keep the same proxy IP across requests sharing this id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<u64>,

    /// CSS selector to wait for before returning content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,

    /// Fixed delay in milliseconds before returning content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,

    /// Comma-separated resource types to block, e.g. "image,font,media"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_resources: Option<String>,

    /// Output format: raw (default), markdown, plaintext or pdf
    #[serde(default)]
    pub response_type: ResponseType,

    /// JSON object mapping field names to CSS selectors, e.g.
    /// `{"title": "h1", "links": "a @href"}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_extractor: Option<String>,

    /// Let the API extract structured data for known sites
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoparse: Option<bool>,

    /// Comma-separated data categories to extract, e.g. "tables,links,headings"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<String>,

    /// Return network requests captured during rendering as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_response: Option<bool>,

    /// Capture a screenshot of the visible viewport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<bool>,

    /// Capture a screenshot of the full page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_fullpage: Option<bool>,

    /// Capture a screenshot of the element matching this CSS selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_selector: Option<String>,

    /// Screenshot image format: png or jpeg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_format: Option<String>,

    /// JPEG quality for screenshots (1-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_quality: Option<u32>,

    /// Extra HTTP headers to send to the target site
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_headers: BTreeMap<String, String>,
}

impl ScrapeRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Enable JavaScript rendering
    pub fn js_render(mut self) -> Self {
        self.js_render = true;
        self
    }

    /// Set browser actions to run after load (JSON array)
    pub fn js_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.js_instructions = Some(instructions.into());
        self
    }

    /// Enable premium proxies
    pub fn premium_proxy(mut self) -> Self {
        self.premium_proxy = true;
        self
    }

    /// Set the premium proxy country (two-letter code)
    pub fn proxy_country(mut self, country: impl Into<String>) -> Self {
        self.proxy_country = Some(country.into());
        self
    }

    /// Reuse the same proxy IP across requests with this id
    pub fn session_id(mut self, id: u64) -> Self {
        self.session_id = Some(id);
        self
    }

    /// Wait for a CSS selector before returning
    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }

    /// Set a fixed wait in milliseconds
    pub fn wait(mut self, ms: u64) -> Self {
        self.wait = Some(ms);
        self
    }

    /// Block resource types, e.g. "image,font"
    pub fn block_resources(mut self, resources: impl Into<String>) -> Self {
        self.block_resources = Some(resources.into());
        self
    }

    /// Set the output format
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Extract fields with a JSON object of CSS selectors
    pub fn css_extractor(mut self, extractor: impl Into<String>) -> Self {
        self.css_extractor = Some(extractor.into());
        self
    }

    /// Enable automatic structured extraction
    pub fn autoparse(mut self) -> Self {
        self.autoparse = Some(true);
        self
    }

    /// Extract data categories, e.g. "tables,links"
    pub fn outputs(mut self, outputs: impl Into<String>) -> Self {
        self.outputs = Some(outputs.into());
        self
    }

    /// Return captured network requests as JSON
    pub fn json_response(mut self) -> Self {
        self.json_response = Some(true);
        self
    }

    /// Capture a viewport screenshot
    pub fn screenshot(mut self) -> Self {
        self.screenshot = Some(true);
        self
    }

    /// Capture a full-page screenshot
    pub fn screenshot_fullpage(mut self) -> Self {
        self.screenshot_fullpage = Some(true);
        self
    }

    /// Capture a screenshot of one element
    pub fn screenshot_selector(mut self, selector: impl Into<String>) -> Self {
        self.screenshot_selector = Some(selector.into());
        self
    }

    /// Set the screenshot format (png or jpeg)
    pub fn screenshot_format(mut self, format: impl Into<String>) -> Self {
        self.screenshot_format = Some(format.into());
        self
    }

    /// Set JPEG screenshot quality (1-100)
    pub fn screenshot_quality(mut self, quality: u32) -> Self {
        self.screenshot_quality = Some(quality);
        self
    }

    /// Add a header forwarded to the target site
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    /// Check if any screenshot option is set
    pub fn wants_screenshot(&self) -> bool {
        self.screenshot.unwrap_or(false)
            || self.screenshot_fullpage.unwrap_or(false)
            || self.screenshot_selector.is_some()
    }

    /// Check if the API will answer with binary content (image or PDF)
    ///
    /// `json_response` wraps everything, screenshots included, in a JSON
    /// document, so it always yields text.
    pub fn wants_binary(&self) -> bool {
        if self.json_response.unwrap_or(false) {
            return false;
        }
        self.response_type.is_binary() || self.wants_screenshot()
    }

    /// MIME type of the expected binary content, if any
    pub fn binary_mime_type(&self) -> Option<&'static str> {
        if !self.wants_binary() {
            return None;
        }
        if self.response_type.is_binary() {
            return Some("application/pdf");
        }
        match self.screenshot_format.as_deref() {
            Some(f) if f.eq_ignore_ascii_case("jpeg") || f.eq_ignore_ascii_case("jpg") => {
                Some("image/jpeg")
            }
            _ => Some("image/png"),
        }
    }
}

/// Result of a successful scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutput {
    /// HTML, markdown, plaintext or JSON as returned by the API
    Text(String),
    /// Decoded screenshot or PDF bytes
    Binary { data: Bytes, mime_type: String },
}

impl ScrapeOutput {
    pub fn is_binary(&self) -> bool {
        matches!(self, ScrapeOutput::Binary { .. })
    }

    /// Text content, `None` for binary output
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScrapeOutput::Text(text) => Some(text),
            ScrapeOutput::Binary { .. } => None,
        }
    }

    /// Raw bytes of the output (UTF-8 bytes for text)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ScrapeOutput::Text(text) => text.as_bytes(),
            ScrapeOutput::Binary { data, .. } => data,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            ScrapeOutput::Text(text) => Bytes::from(text),
            ScrapeOutput::Binary { data, .. } => data,
        }
    }

    /// MIME type for binary output
    pub fn mime_type(&self) -> Option<&str> {
        match self {
            ScrapeOutput::Text(_) => None,
            ScrapeOutput::Binary { mime_type, .. } => Some(mime_type),
        }
    }
}
