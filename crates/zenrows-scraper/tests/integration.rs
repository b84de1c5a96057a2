//! Integration tests for the ZenRows scraper using wiremock

use serde_json::json;
use wiremock::matchers::{any, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenrows_scraper::{
    ErrorKind, ResponseType, ScrapeError, ScrapeOutput, ScrapeRequest, Scraper, API_KEY_ENV,
};

fn scraper_for(server: &MockServer) -> Scraper {
    Scraper::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1/", server.uri()))
        .build()
        .unwrap()
}

/// Mount a catch-all mock that fails verification if any request arrives
async fn expect_no_requests(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_basic_scrape_sends_url_and_apikey_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(query_param("url", "https://httpbin.io/html"))
        .and(query_param("apikey", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Test content</body></html>", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({"url": "https://httpbin.io/html"}))
        .await
        .unwrap();

    assert_eq!(
        out,
        ScrapeOutput::Text("<html><body>Test content</body></html>".to_string())
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let pairs: Vec<(String, String)> = requests[0].url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("url".to_string(), "https://httpbin.io/html".to_string()),
            ("apikey".to_string(), "test-key".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_all_parameters_forwarded() {
    let mock_server = MockServer::start().await;
    let css_extractor = r#"{"title":"h1"}"#;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(query_param("url", "https://example.com"))
        .and(query_param("js_render", "true"))
        .and(query_param("js_instructions", "window.scroll(0, 100);"))
        .and(query_param("premium_proxy", "true"))
        .and(query_param("proxy_country", "us"))
        .and(query_param("session_id", "123"))
        .and(query_param("wait_for", ".content"))
        .and(query_param("wait", "2000"))
        .and(query_param("block_resources", "images"))
        .and(query_param("response_type", "markdown"))
        .and(query_param("css_extractor", css_extractor))
        .and(query_param("autoparse", "true"))
        .and(query_param_is_missing("screenshot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Test content"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({
            "url": "https://example.com",
            "js_render": true,
            "js_instructions": "window.scroll(0, 100);",
            "premium_proxy": true,
            "proxy_country": "us",
            "session_id": 123,
            "wait_for": ".content",
            "wait": 2000,
            "block_resources": "images",
            "response_type": "markdown",
            "css_extractor": css_extractor,
            "autoparse": true,
        }))
        .await
        .unwrap();

    assert_eq!(out.as_text(), Some("Test content"));
}

#[tokio::test]
async fn test_custom_headers_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("custom_headers", "true"))
        .and(header("Referer", "https://google.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string("headers echoed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({
            "url": "https://httpbin.io/headers",
            "js_render": true,
            "custom_headers": {"Referer": "https://google.com"},
        }))
        .await
        .unwrap();

    assert_eq!(out.as_text(), Some("headers echoed"));
}

#[tokio::test]
async fn test_screenshot_base64_body_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("screenshot", "true"))
        .and(query_param("screenshot_fullpage", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("iVBORw0KGgo="))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({
            "url": "https://www.scrapingcourse.com/ecommerce/",
            "js_render": true,
            "screenshot": "true",
            "screenshot_fullpage": "true",
        }))
        .await
        .unwrap();

    assert!(out.is_binary());
    assert_eq!(out.mime_type(), Some("image/png"));
    assert_eq!(
        out.as_bytes(),
        &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    );
}

#[tokio::test]
async fn test_element_screenshot_raw_bytes() {
    let mock_server = MockServer::start().await;
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];

    Mock::given(method("GET"))
        .and(query_param("screenshot_selector", "#product-list"))
        .and(query_param("screenshot_format", "jpeg"))
        .and(query_param("screenshot_quality", "85"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(jpeg.clone(), "image/jpeg"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({
            "url": "https://www.scrapingcourse.com/ecommerce/",
            "screenshot_selector": "#product-list",
            "screenshot_format": "jpeg",
            "screenshot_quality": 85,
        }))
        .await
        .unwrap();

    assert_eq!(out.mime_type(), Some("image/jpeg"));
    assert_eq!(out.as_bytes(), jpeg.as_slice());
}

#[tokio::test]
async fn test_pdf_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("response_type", "pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.7", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let req = ScrapeRequest::new("https://example.com").response_type(ResponseType::Pdf);
    let out = scraper.scrape(&req).await.unwrap();

    assert_eq!(out.mime_type(), Some("application/pdf"));
    assert_eq!(out.as_bytes(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_json_response_stays_text() {
    let mock_server = MockServer::start().await;
    let body = r#"{"html":"<html></html>","xhr":[]}"#;

    Mock::given(method("GET"))
        .and(query_param("json_response", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let out = scraper
        .invoke(json!({
            "url": "https://www.scrapingcourse.com/javascript-rendering",
            "json_response": true,
            "screenshot": true,
            "wait": 3000,
        }))
        .await
        .unwrap();

    assert_eq!(out.as_text(), Some(body));
}

#[tokio::test]
async fn test_invalid_css_extractor_makes_no_request() {
    let mock_server = MockServer::start().await;
    expect_no_requests(&mock_server).await;

    let scraper = scraper_for(&mock_server);
    let err = scraper
        .invoke(json!({
            "url": "https://httpbin.io/html",
            "css_extractor": "invalid json string",
        }))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("css_extractor must be valid JSON"));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_invalid_proxy_country_makes_no_request() {
    let mock_server = MockServer::start().await;
    expect_no_requests(&mock_server).await;

    let scraper = scraper_for(&mock_server);
    let err = scraper
        .invoke(json!({"url": "https://a.com", "proxy_country": "usa"}))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("two-letter country code"));
}

#[tokio::test]
async fn test_missing_url_makes_no_request() {
    let mock_server = MockServer::start().await;
    expect_no_requests(&mock_server).await;

    let scraper = scraper_for(&mock_server);
    let err = scraper.invoke(json!({"js_render": true})).await.unwrap_err();

    assert!(matches!(err, ScrapeError::MissingUrl));
    assert!(err.to_string().contains("Field required"));
}

#[tokio::test]
async fn test_typed_request_validated_before_sending() {
    let mock_server = MockServer::start().await;
    expect_no_requests(&mock_server).await;

    let scraper = scraper_for(&mock_server);
    let req = ScrapeRequest::new("not-a-valid-url");
    let err = scraper.scrape(&req).await.unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidUrl(_)));
    assert!(err.to_string().contains("url"));
}

#[tokio::test]
async fn test_invalid_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_raw(
            r#"{"code":"AUTH001","title":"API key is invalid"}"#,
            "application/problem+json",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let err = scraper
        .invoke(json!({"url": "https://httpbin.io/html"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidApiKey));
    assert!(err.to_string().contains("Invalid ZenRows API key"));
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_error_status_carries_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_raw(
            r#"{"code":"RESP001","detail":"Could not get content. Try enabling javascript rendering","status":422,"title":"Could not get content"}"#,
            "application/problem+json",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let err = scraper
        .invoke(json!({"url": "https://this-domain-definitely-does-not-exist-12345.com"}))
        .await
        .unwrap_err();

    match &err {
        ScrapeError::HttpStatus { status, message } => {
            assert_eq!(*status, 422);
            assert!(message.starts_with("RESP001: Could not get content"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("failed"));
    assert_eq!(err.kind(), ErrorKind::Request);
}

#[tokio::test]
async fn test_server_error_with_plain_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let err = scraper
        .invoke(json!({"url": "https://example.com"}))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "ZenRows request failed with status 503: Service Unavailable"
    );
}

#[tokio::test]
async fn test_connection_failure() {
    let scraper = Scraper::builder()
        .api_key("test-key")
        .base_url("http://127.0.0.1:1/v1/")
        .build()
        .unwrap();

    let err = scraper
        .invoke(json!({"url": "https://example.com"}))
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::ConnectError(_)), "got {err:?}");
    assert_eq!(err.to_string(), "Failed to connect to ZenRows API");
    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(!err.is_validation());
}

#[tokio::test]
async fn test_same_session_id_sends_two_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("session_id", "12345"))
        .and(query_param("premium_proxy", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"origin":"1.2.3.4"}"#))
        .expect(2)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let args = json!({
        "url": "https://httpbin.io/ip",
        "premium_proxy": true,
        "session_id": 12345,
    });

    let first = scraper.invoke(args.clone()).await.unwrap();
    let second = scraper.invoke(args).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_scrape_with_status_phases() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Title"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = scraper_for(&mock_server);
    let req = ScrapeRequest::new("https://www.example.com").response_type(ResponseType::Markdown);

    let mut phases = Vec::new();
    let out = scraper
        .scrape_with_status(&req, |status| phases.push(status.phase))
        .await
        .unwrap();

    assert_eq!(out.as_text(), Some("# Title"));
    assert_eq!(phases, vec!["validate", "request", "decode", "complete"]);
}

#[test]
fn test_invoke_blocking() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mock_server = runtime.block_on(MockServer::start());

    runtime.block_on(
        Mock::given(method("GET"))
            .and(query_param("url", "https://httpbin.io/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocking</html>"))
            .expect(2)
            .mount(&mock_server),
    );

    let scraper = scraper_for(&mock_server);
    for _ in 0..2 {
        let out = scraper
            .invoke_blocking(json!({"url": "https://httpbin.io/html"}))
            .unwrap();
        assert_eq!(out.as_text(), Some("<html>blocking</html>"));
    }

    let err = scraper
        .invoke_blocking(json!({"url": "https://httpbin.io/html", "proxy_country": "gbr"}))
        .unwrap_err();
    assert!(matches!(err, ScrapeError::InvalidProxyCountry));

    runtime.block_on(mock_server.verify());
}

#[test]
fn test_builder_reads_key_from_environment() {
    // Outcome follows the real ZENROWS_API_KEY
    let env_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty());

    match (Scraper::builder().build(), env_key) {
        (Ok(scraper), Some(key)) => assert_eq!(scraper.config().api_key(), key),
        (Err(err), None) => {
            assert!(matches!(err, ScrapeError::MissingApiKey));
            assert_eq!(err.kind(), ErrorKind::Configuration);
            assert!(err.to_string().contains("ZenRows API key is required"));
        }
        (result, key) => panic!("unexpected build result {result:?} with env key {key:?}"),
    }

    // An explicit key never depends on the environment
    let scraper = Scraper::builder().api_key("explicit").build().unwrap();
    assert_eq!(scraper.config().api_key(), "explicit");
}
