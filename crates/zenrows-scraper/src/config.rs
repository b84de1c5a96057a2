//! Credentials and endpoint configuration

use crate::error::ScrapeError;
use crate::DEFAULT_BASE_URL;
use url::Url;

/// Immutable per-tool configuration: API key and base endpoint
///
/// Built by [`crate::ScraperBuilder`], which reads `ZENROWS_API_KEY` when no
/// key is set explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    api_key: String,
    base_url: Url,
}

impl ScraperConfig {
    /// Apply the key precedence rule and parse the base URL
    ///
    /// An explicit non-empty key wins over the environment value. Blank
    /// values count as missing.
    pub(crate) fn resolve(
        explicit: Option<String>,
        env_value: Option<String>,
        base_url: Option<&str>,
    ) -> Result<Self, ScrapeError> {
        let api_key = explicit
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
            .ok_or(ScrapeError::MissingApiKey)?;

        let base_url = Url::parse(base_url.unwrap_or(DEFAULT_BASE_URL))
            .map_err(|e| ScrapeError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidBaseUrl(format!(
                "unsupported scheme {:?}",
                base_url.scheme()
            )));
        }

        Ok(Self { api_key, base_url })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl std::fmt::Debug for ScraperConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScraperConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
