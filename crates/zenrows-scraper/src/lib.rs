//! ZenRows scraper - LLM tool for the ZenRows Universal Scraper API
//!
//! This crate exposes the ZenRows Universal Scraper API as a tool an LLM
//! agent can call: it validates the scraping options, sends one GET to the
//! API and returns the page as text or, for screenshots and PDFs, as bytes.
//!
//! ```rust,ignore
//! use zenrows_scraper::Scraper;
//!
//! let scraper = Scraper::builder().api_key("<key>").build()?;
//! let page = scraper
//!     .invoke(serde_json::json!({"url": "https://httpbin.io/html", "response_type": "markdown"}))
//!     .await?;
//! println!("{}", page.as_text().unwrap_or_default());
//! ```

mod client;
mod config;
mod error;
mod tool;
mod types;
mod validate;

pub use config::ScraperConfig;
pub use error::{ErrorKind, ScrapeError};
pub use tool::{Scraper, ScraperBuilder, ToolStatus};
pub use types::{ResponseType, ScrapeOutput, ScrapeRequest};
pub use validate::KNOWN_FIELDS;

/// Tool name as registered with an LLM framework
pub const TOOL_NAME: &str = "zenrows_universal_scraper";

/// Universal Scraper API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.zenrows.com/v1/";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ZENROWS_API_KEY";

/// Default User-Agent string for calls to the API
pub const DEFAULT_USER_AGENT: &str = concat!("zenrows-scraper-rs/", env!("CARGO_PKG_VERSION"));

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Web scraping tool backed by the ZenRows Universal Scraper API.

- Scrapes any public URL with automatic anti-bot bypass and CAPTCHA handling
- Optional JavaScript rendering and browser instructions for dynamic pages
- Premium residential proxies with country geo-targeting
- Output as raw HTML, markdown, plaintext, PDF or screenshots
- Structured extraction with CSS selectors or built-in outputs (tables, links, headings)"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r##"# ZenRows Universal Scraper Tool

Scrapes a web page through the ZenRows Universal Scraper API and returns its
content. One call sends exactly one request.

## Capabilities
- Anti-bot bypass and rotating proxies on every request
- JavaScript rendering with waits and browser instructions
- Premium proxies with country targeting and sticky sessions
- HTML, markdown, plaintext, PDF and screenshot output
- CSS-selector extraction and automatic structured outputs

## Input Parameters
- `url` (required): Page to scrape (http:// or https://)
- `js_render` (optional): Render JavaScript in a headless browser
- `js_instructions` (optional): JSON array of browser actions, e.g. `[{"click": "#btn"}, {"wait": 500}]`
- `premium_proxy` (optional): Use residential proxies
- `proxy_country` (optional): Two-letter country code, e.g. "us"
- `session_id` (optional): Integer to keep the same IP across requests
- `wait_for` (optional): CSS selector to wait for
- `wait` (optional): Milliseconds to wait before returning
- `block_resources` (optional): Comma-separated resource types to block, e.g. "image,font"
- `response_type` (optional): raw (default), markdown, plaintext or pdf
- `css_extractor` (optional): JSON object of field name to CSS selector
- `autoparse` (optional): Automatic structured extraction for known sites
- `outputs` (optional): Comma-separated categories, e.g. "tables,links,headings"
- `json_response` (optional): Return captured network requests as JSON
- `screenshot`, `screenshot_fullpage` (optional): Capture a screenshot
- `screenshot_selector` (optional): Capture one element
- `screenshot_format` (optional): png or jpeg
- `screenshot_quality` (optional): JPEG quality 1-100
- `custom_headers` (optional): Object of headers sent to the target site

## Output
- Text (HTML, markdown, plaintext or JSON) for ordinary requests
- Bytes for screenshots and PDFs

## Examples

### Page as markdown
```json
{"url": "https://www.example.com", "response_type": "markdown"}
```

### Rendered single-page app
```json
{"url": "https://www.scrapingcourse.com/javascript-rendering", "js_render": true, "wait_for": ".product-name"}
```

### Geo-targeted request
```json
{"url": "https://httpbin.io/ip", "premium_proxy": true, "proxy_country": "gb"}
```

### CSS extraction
```json
{"url": "https://www.scrapingcourse.com/ecommerce/", "css_extractor": "{\"names\": \".product-name\"}"}
```

## Error Handling
- Invalid options are rejected before any request is sent
- An invalid API key is reported as such
- Other API failures include the HTTP status and the API's message
"##;
