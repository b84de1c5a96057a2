//! HTTP client for the ZenRows Universal Scraper API
//!
//! Turns a validated [`ScrapeRequest`] into query parameters, sends exactly
//! one GET to the configured endpoint and shapes the body into a
//! [`ScrapeOutput`]. There is no retry at this layer.

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::types::{ResponseType, ScrapeOutput, ScrapeRequest};
use base64::Engine;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Content type prefixes that mean the API already sent raw bytes
const BINARY_PREFIXES: &[&str] = &["image/", "application/pdf", "application/octet-stream"];

/// Longest raw error body quoted in an error message
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Flat query parameters for a request, in a stable order
///
/// `url` and `apikey` always come first. Other fields are only present when
/// they differ from their defaults.
pub(crate) fn query_params(request: &ScrapeRequest, api_key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("url", request.url.clone()), ("apikey", api_key.to_string())];

    let mut push = |name: &'static str, value: Option<String>| {
        if let Some(value) = value {
            params.push((name, value));
        }
    };

    push("js_render", request.js_render.then(|| "true".to_string()));
    push("js_instructions", request.js_instructions.clone());
    push("premium_proxy", request.premium_proxy.then(|| "true".to_string()));
    push("proxy_country", request.proxy_country.clone());
    push("session_id", request.session_id.map(|id| id.to_string()));
    push("wait_for", request.wait_for.clone());
    push("wait", request.wait.map(|ms| ms.to_string()));
    push("block_resources", request.block_resources.clone());
    push(
        "response_type",
        (request.response_type != ResponseType::Raw)
            .then(|| request.response_type.as_str().to_string()),
    );
    push("css_extractor", request.css_extractor.clone());
    push("autoparse", request.autoparse.map(|b| b.to_string()));
    push("outputs", request.outputs.clone());
    push("json_response", request.json_response.map(|b| b.to_string()));
    push("screenshot", request.screenshot.map(|b| b.to_string()));
    push(
        "screenshot_fullpage",
        request.screenshot_fullpage.map(|b| b.to_string()),
    );
    push("screenshot_selector", request.screenshot_selector.clone());
    push("screenshot_format", request.screenshot_format.clone());
    push(
        "screenshot_quality",
        request.screenshot_quality.map(|q| q.to_string()),
    );
    push(
        "custom_headers",
        (!request.custom_headers.is_empty()).then(|| "true".to_string()),
    );

    params
}

/// Full request URL: base endpoint plus encoded query parameters
pub(crate) fn build_url(config: &ScraperConfig, request: &ScrapeRequest) -> Url {
    let mut url = config.base_url().clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query_params(request, config.api_key()) {
            pairs.append_pair(name, &value);
        }
    }
    url
}

/// Send the single GET for a validated request
///
/// Non-success statuses are turned into errors here; a 401 means the API
/// key was rejected.
pub(crate) async fn send(
    client: &reqwest::Client,
    config: &ScraperConfig,
    request: &ScrapeRequest,
) -> Result<reqwest::Response, ScrapeError> {
    let url = build_url(config, request);

    let forwarded: Vec<&str> = query_params(request, "")
        .into_iter()
        .map(|(name, _)| name)
        .filter(|name| !matches!(*name, "url" | "apikey"))
        .collect();
    debug!(target_url = %request.url, params = ?forwarded, "Sending ZenRows request");

    let mut http_request = client.get(url);
    for (name, value) in &request.custom_headers {
        http_request = http_request.header(name.as_str(), value.as_str());
    }

    let response = http_request
        .send()
        .await
        .map_err(ScrapeError::from_reqwest)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        warn!("ZenRows rejected the API key");
        return Err(ScrapeError::InvalidApiKey);
    }

    let message = match response.bytes().await {
        Ok(body) => error_message(&body),
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    warn!(status = status.as_u16(), %message, "ZenRows request failed");

    Err(ScrapeError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

/// Read a successful response and shape it as text or bytes
pub(crate) async fn read_output(
    request: &ScrapeRequest,
    response: reqwest::Response,
) -> Result<ScrapeOutput, ScrapeError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let body = response.bytes().await.map_err(ScrapeError::from_reqwest)?;

    shape_body(request, content_type.as_deref(), body)
}

/// Decide between text and binary output for a response body
///
/// Binary requests accept raw bytes when the content type says so and
/// otherwise expect a base64 body.
pub(crate) fn shape_body(
    request: &ScrapeRequest,
    content_type: Option<&str>,
    body: Bytes,
) -> Result<ScrapeOutput, ScrapeError> {
    if !request.wants_binary() {
        return Ok(ScrapeOutput::Text(String::from_utf8_lossy(&body).into_owned()));
    }

    if let Some(ct) = content_type.filter(|ct| is_binary_content_type(ct)) {
        let mime_type = ct.split(';').next().unwrap_or(ct).trim().to_string();
        return Ok(ScrapeOutput::Binary {
            data: body,
            mime_type,
        });
    }

    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let data = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(ScrapeError::InvalidBinaryBody)?;

    Ok(ScrapeOutput::Binary {
        data: Bytes::from(data),
        mime_type: request
            .binary_mime_type()
            .unwrap_or("application/octet-stream")
            .to_string(),
    })
}

/// Check if content type indicates raw binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Extract a readable message from an API error body
///
/// ZenRows answers errors with a JSON problem document
/// (`code`, `title`, `detail`); anything else is quoted as text.
fn error_message(body: &[u8]) -> String {
    if let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(body) {
        let text = |key: &str| doc.get(key).and_then(Value::as_str).map(str::to_string);
        let summary = text("detail").or_else(|| text("title"));
        match (text("code"), summary) {
            (Some(code), Some(summary)) => return format!("{code}: {summary}"),
            (None, Some(summary)) => return summary,
            _ => {}
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        return "empty response body".to_string();
    }
    if raw.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = raw.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return format!("{truncated}...");
    }
    raw.to_string()
}
