//! Example: Scrape a few pages through the ZenRows API and display results
//!
//! Run with: ZENROWS_API_KEY=... cargo run -p zenrows-scraper --example scrape_urls
//!
//! Exercises the main option groups against real pages.

use serde_json::{json, Value};
use zenrows_scraper::{ScrapeOutput, Scraper};

/// Test case definition
struct TestCase {
    description: &'static str,
    args: fn() -> Value,
    expect_contains: Option<&'static str>,
}

/// Define test cases here
const TEST_CASES: &[TestCase] = &[
    TestCase {
        description: "Basic HTML page",
        args: || json!({"url": "https://httpbin.io/html"}),
        expect_contains: Some("Herman Melville"),
    },
    TestCase {
        description: "Markdown output",
        args: || json!({"url": "https://www.example.com", "response_type": "markdown"}),
        expect_contains: Some("Example Domain"),
    },
    TestCase {
        description: "JavaScript rendering with wait_for",
        args: || {
            json!({
                "url": "https://www.scrapingcourse.com/javascript-rendering",
                "js_render": true,
                "wait_for": ".product-name",
            })
        },
        expect_contains: Some("Chaz Kangeroo Hoodie"),
    },
    TestCase {
        description: "CSS extraction",
        args: || {
            json!({
                "url": "https://httpbin.io/html",
                "css_extractor": r#"{"title": "h1", "content": "p"}"#,
            })
        },
        expect_contains: Some("Herman Melville"),
    },
    TestCase {
        description: "Structured outputs",
        args: || {
            json!({
                "url": "https://www.scrapingcourse.com/table-parsing",
                "outputs": "tables",
            })
        },
        expect_contains: None,
    },
    TestCase {
        description: "Full-page screenshot",
        args: || {
            json!({
                "url": "https://www.scrapingcourse.com/ecommerce/",
                "js_render": true,
                "screenshot": true,
                "screenshot_fullpage": true,
            })
        },
        expect_contains: None,
    },
];

#[tokio::main]
async fn main() {
    println!("ZenRows Scraper Examples");
    println!("========================\n");

    let scraper = match Scraper::from_env() {
        Ok(scraper) => scraper,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);

        match scraper.invoke((case.args)()).await {
            Ok(output) => {
                let ok = check(&output, case.expect_contains);
                println!("   {} {}", if ok { "PASS" } else { "FAIL" }, summary(&output));
                if ok {
                    passed += 1;
                } else {
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   FAIL error: {}", e);
                failed += 1;
            }
        }
        println!();
    }

    println!("Results: {} passed, {} failed", passed, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(output: &ScrapeOutput, expect_contains: Option<&str>) -> bool {
    match (output, expect_contains) {
        (ScrapeOutput::Text(text), Some(needle)) => {
            text.to_lowercase().contains(&needle.to_lowercase())
        }
        (ScrapeOutput::Text(text), None) => !text.is_empty(),
        (ScrapeOutput::Binary { data, .. }, _) => !data.is_empty(),
    }
}

fn summary(output: &ScrapeOutput) -> String {
    match output {
        ScrapeOutput::Text(text) => {
            let preview: String = text.chars().take(80).collect();
            format!("{} chars: {}", text.len(), preview.replace('\n', " "))
        }
        ScrapeOutput::Binary { data, mime_type } => {
            format!("{} bytes of {}", data.len(), mime_type)
        }
    }
}
