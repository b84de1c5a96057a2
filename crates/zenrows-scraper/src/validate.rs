//! Input validation for scrape requests
//!
//! Tool arguments arrive as an untyped JSON object. [`ScrapeRequest::from_value`]
//! checks `url` first, then each optional field on its own, and stops at the
//! first bad field. Coercion is limited to numeric strings for integer fields
//! and `"true"`/`"false"` for boolean fields.

use crate::error::ScrapeError;
use crate::types::{ResponseType, ScrapeRequest};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;
use url::Url;

/// Every option name the tool understands
pub const KNOWN_FIELDS: &[&str] = &[
    "url",
    "js_render",
    "js_instructions",
    "premium_proxy",
    "proxy_country",
    "session_id",
    "wait_for",
    "wait",
    "block_resources",
    "response_type",
    "css_extractor",
    "autoparse",
    "outputs",
    "json_response",
    "screenshot",
    "screenshot_fullpage",
    "screenshot_selector",
    "screenshot_format",
    "screenshot_quality",
    "custom_headers",
];

impl ScrapeRequest {
    /// Build a validated request from untyped tool arguments
    pub fn from_value(value: Value) -> Result<Self, ScrapeError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ScrapeError::InvalidInput(format!(
                    "expected a JSON object, got {}",
                    type_name(&other)
                )))
            }
        };

        let url = match map.get("url") {
            None | Some(Value::Null) => return Err(ScrapeError::MissingUrl),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(invalid("url", "a string")),
        };

        for key in map.keys() {
            if !KNOWN_FIELDS.contains(&key.as_str()) {
                warn!(field = %key, "Ignoring unrecognized scrape option");
            }
        }

        let request = ScrapeRequest {
            url,
            js_render: bool_field(&map, "js_render")?.unwrap_or(false),
            js_instructions: string_field(&map, "js_instructions")?,
            premium_proxy: bool_field(&map, "premium_proxy")?.unwrap_or(false),
            proxy_country: string_field(&map, "proxy_country")?,
            session_id: u64_field(&map, "session_id")?,
            wait_for: string_field(&map, "wait_for")?,
            wait: u64_field(&map, "wait")?,
            block_resources: string_field(&map, "block_resources")?,
            response_type: response_type_field(&map)?,
            css_extractor: string_field(&map, "css_extractor")?,
            autoparse: bool_field(&map, "autoparse")?,
            outputs: string_field(&map, "outputs")?,
            json_response: bool_field(&map, "json_response")?,
            screenshot: bool_field(&map, "screenshot")?,
            screenshot_fullpage: bool_field(&map, "screenshot_fullpage")?,
            screenshot_selector: string_field(&map, "screenshot_selector")?,
            screenshot_format: string_field(&map, "screenshot_format")?,
            screenshot_quality: u32_field(&map, "screenshot_quality")?,
            custom_headers: headers_field(&map)?,
        };

        request.validate()?;
        Ok(request)
    }

    /// Check the value constraints of every field
    ///
    /// Runs before any network activity, for typed and untyped callers alike.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        validate_url(&self.url)?;

        if let Some(country) = &self.proxy_country {
            validate_proxy_country(country)?;
        }

        if let Some(extractor) = &self.css_extractor {
            serde_json::from_str::<Value>(extractor)
                .map_err(|e| ScrapeError::InvalidCssExtractor(e.to_string()))?;
        }

        for (name, value) in &self.custom_headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ScrapeError::InvalidHeader(format!("bad name {name:?}")))?;
            HeaderValue::from_str(value)
                .map_err(|_| ScrapeError::InvalidHeader(format!("bad value for {name}")))?;
        }

        Ok(())
    }
}

impl TryFrom<Value> for ScrapeRequest {
    type Error = ScrapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ScrapeRequest::from_value(value)
    }
}

fn validate_url(raw: &str) -> Result<(), ScrapeError> {
    if raw.trim().is_empty() {
        return Err(ScrapeError::MissingUrl);
    }

    // Url::parse trims, but the raw string is what gets forwarded
    if raw.trim() != raw {
        return Err(ScrapeError::InvalidUrl(
            "surrounding whitespace is not allowed".to_string(),
        ));
    }

    let parsed = Url::parse(raw).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::InvalidUrl(format!(
            "unsupported scheme {:?}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::InvalidUrl("missing host".to_string()));
    }

    Ok(())
}

fn validate_proxy_country(country: &str) -> Result<(), ScrapeError> {
    // Count chars, not bytes, so multi-byte input cannot sneak in as length 2
    if country.chars().count() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ScrapeError::InvalidProxyCountry)
    }
}

fn invalid(field: &'static str, expected: &'static str) -> ScrapeError {
    ScrapeError::InvalidField { field, expected }
}

/// Look up a field, treating `null` as absent
fn field<'a>(map: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    map.get(name).filter(|v| !v.is_null())
}

fn bool_field(map: &Map<String, Value>, name: &'static str) -> Result<Option<bool>, ScrapeError> {
    match field(map, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(_) => Err(invalid(name, "a boolean")),
    }
}

fn string_field(
    map: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ScrapeError> {
    match field(map, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(name, "a string")),
    }
}

fn u64_field(map: &Map<String, Value>, name: &'static str) -> Result<Option<u64>, ScrapeError> {
    const EXPECTED: &str = "a non-negative integer";
    match field(map, name) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or(invalid(name, EXPECTED)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(name, EXPECTED)),
        Some(_) => Err(invalid(name, EXPECTED)),
    }
}

fn u32_field(map: &Map<String, Value>, name: &'static str) -> Result<Option<u32>, ScrapeError> {
    match u64_field(map, name)? {
        None => Ok(None),
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| invalid(name, "an integer no larger than 4294967295")),
    }
}

fn response_type_field(map: &Map<String, Value>) -> Result<ResponseType, ScrapeError> {
    match field(map, "response_type") {
        None => Ok(ResponseType::default()),
        Some(Value::String(s)) => {
            ResponseType::from_str(s).map_err(ScrapeError::InvalidResponseType)
        }
        Some(other) => Err(ScrapeError::InvalidResponseType(other.to_string())),
    }
}

fn headers_field(map: &Map<String, Value>) -> Result<BTreeMap<String, String>, ScrapeError> {
    const EXPECTED: &str = "an object mapping header names to string values";
    match field(map, "custom_headers") {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(headers)) => headers
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => Ok((name.clone(), s.clone())),
                _ => Err(invalid("custom_headers", EXPECTED)),
            })
            .collect(),
        Some(_) => Err(invalid("custom_headers", EXPECTED)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
