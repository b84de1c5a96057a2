//! MCP (Model Context Protocol) server implementation

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, error};
use zenrows_scraper::{ScrapeOutput, Scraper};

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// MCP Server implementation
struct McpServer {
    scraper: Scraper,
}

impl McpServer {
    fn new(scraper: Scraper) -> Self {
        Self { scraper }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "zenrows-scraper",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "tools": [{
                    "name": self.scraper.name(),
                    "description": self.scraper.description(),
                    "inputSchema": self.scraper.input_schema()
                }]
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        if tool_name != self.scraper.name() {
            return JsonRpcResponse::error(id, -32602, format!("Unknown tool: {}", tool_name));
        }

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match self.scraper.invoke(arguments).await {
            Ok(output) => JsonRpcResponse::success(id, json!({ "content": [content_item(&output)] })),
            Err(e) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": format!("Error: {}", e)
                    }],
                    "isError": true
                }),
            ),
        }
    }
}

/// Render a scrape result as an MCP content item
fn content_item(output: &ScrapeOutput) -> Value {
    match output {
        ScrapeOutput::Text(text) => json!({
            "type": "text",
            "text": text
        }),
        ScrapeOutput::Binary { data, mime_type } => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(data);
            if mime_type.starts_with("image/") {
                json!({
                    "type": "image",
                    "data": encoded,
                    "mimeType": mime_type
                })
            } else {
                json!({
                    "type": "resource",
                    "resource": {
                        "uri": "zenrows://scrape/result",
                        "mimeType": mime_type,
                        "blob": encoded
                    }
                })
            }
        }
    }
}

/// Run the MCP server over stdio
pub async fn run_server(scraper: Scraper) {
    let server = McpServer::new(scraper);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("Error reading stdin: {}", e);
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let response = JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e));
                let json = serde_json::to_string(&response).unwrap_or_default();
                let _ = writeln!(stdout, "{}", json);
                let _ = stdout.flush();
                continue;
            }
        };

        // Notifications get no response
        if request.id.is_none() && request.method.starts_with("notifications/") {
            debug!(method = %request.method, "Notification received");
            continue;
        }

        let response = server.handle_request(request).await;
        let json = serde_json::to_string(&response).unwrap_or_default();
        let _ = writeln!(stdout, "{}", json);
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary(data: &[u8], mime_type: &str) -> ScrapeOutput {
        ScrapeOutput::Binary {
            data: data.to_vec().into(),
            mime_type: mime_type.to_string(),
        }
    }

    fn server() -> McpServer {
        McpServer::new(Scraper::builder().api_key("test-key").build().unwrap())
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = server().handle_request(request("tools/list", json!({}))).await;
        let result = response.result.unwrap();
        let tool = &result["tools"][0];
        assert_eq!(tool["name"], "zenrows_universal_scraper");
        assert!(tool["inputSchema"]["properties"]["url"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server().handle_request(request("resources/list", json!({}))).await;
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = server()
            .handle_request(request("tools/call", json!({"name": "fetch"})))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_validation_error_is_tool_error() {
        let response = server()
            .handle_request(request(
                "tools/call",
                json!({
                    "name": "zenrows_universal_scraper",
                    "arguments": {"url": "https://a.com", "proxy_country": "usa"}
                }),
            ))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("two-letter country code"));
    }

    #[test]
    fn test_content_items() {
        let text = content_item(&ScrapeOutput::Text("# Title".to_string()));
        assert_eq!(text, json!({"type": "text", "text": "# Title"}));

        let image = content_item(&binary(&[0x89, 0x50, 0x4E, 0x47], "image/png"));
        assert_eq!(image["type"], "image");
        assert_eq!(image["data"], "iVBORw==");
        assert_eq!(image["mimeType"], "image/png");

        let pdf = content_item(&binary(b"%PDF", "application/pdf"));
        assert_eq!(pdf["type"], "resource");
        assert_eq!(pdf["resource"]["mimeType"], "application/pdf");
        assert_eq!(pdf["resource"]["blob"], "JVBERg==");
    }
}
