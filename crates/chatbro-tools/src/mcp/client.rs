//! MCP client over streamable HTTP

use super::protocol::{
    CallToolResult, InitializeResult, McpError, McpResult, RemoteTool, RpcRequest, RpcResponse,
    ToolsPage, PROTOCOL_VERSION,
};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

const SESSION_HEADER: &str = "mcp-session-id";

/// Default HTTP request timeout in seconds
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Client for a single MCP server endpoint
pub struct McpHttpClient {
    name: String,
    endpoint: Url,
    client: reqwest::Client,
    next_id: AtomicU64,
    session_id: RwLock<Option<String>>,
    initialized: OnceCell<()>,
}

impl std::fmt::Debug for McpHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpHttpClient")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl McpHttpClient {
    /// Create a client; no connection is made until the first call
    pub fn new(name: impl Into<String>, endpoint: &str) -> McpResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| McpError::Transport(format!("Invalid MCP endpoint: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            endpoint,
            client,
            next_id: AtomicU64::new(1),
            session_id: RwLock::new(None),
            initialized: OnceCell::new(),
        })
    }

    /// Server name used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn post(&self, request: &RpcRequest) -> McpResult<Option<RpcResponse>> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(session) = self.session_id.read().await.as_deref() {
            builder = builder.header(SESSION_HEADER, session);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            *self.session_id.write().await = Some(session.to_string());
        }

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(McpError::Transport(format!(
                "{} returned HTTP {}",
                self.name, status
            )));
        }

        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| is_event_stream(v))
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        if is_stream {
            parse_event_stream(&body, request.id).map(Some)
        } else if body.trim().is_empty() {
            Ok(None)
        } else {
            serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| McpError::Protocol(format!("Invalid JSON-RPC body: {}", e)))
        }
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> McpResult<serde_json::Value> {
        let request = RpcRequest::call(method, self.next_id(), params);
        self.post(&request)
            .await?
            .ok_or_else(|| McpError::Protocol(format!("No response to {}", method)))?
            .into_result()
    }

    async fn initialize(&self) -> McpResult<()> {
        let result = self
            .call(
                "initialize",
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "chatbro",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;

        let init: InitializeResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("Failed to parse init result: {}", e)))?;
        info!(
            server = %self.name,
            protocol = %init.protocol_version,
            "MCP server initialized"
        );

        self.post(&RpcRequest::notify("notifications/initialized"))
            .await?;
        Ok(())
    }

    async fn ensure_initialized(&self) -> McpResult<()> {
        self.initialized
            .get_or_try_init(|| self.initialize())
            .await
            .map(|_| ())
    }

    /// List the server's tools
    pub async fn list_tools(&self) -> McpResult<Vec<RemoteTool>> {
        self.ensure_initialized().await?;
        let result = self.call("tools/list", serde_json::json!({})).await?;
        let list: ToolsPage = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("Failed to parse tools: {}", e)))?;
        debug!(server = %self.name, count = list.tools.len(), "Listed MCP tools");
        Ok(list.tools)
    }

    /// Call a tool by name
    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: serde_json::Value,
    ) -> McpResult<CallToolResult> {
        self.ensure_initialized().await?;
        let result = self
            .call(
                "tools/call",
                serde_json::json!({ "name": tool_name, "arguments": arguments }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("Failed to parse tool result: {}", e)))
    }
}

fn is_event_stream(value: &HeaderValue) -> bool {
    value
        .to_str()
        .map(|v| v.starts_with("text/event-stream"))
        .unwrap_or(false)
}

/// Pick the JSON-RPC response for `id` out of an SSE body
fn parse_event_stream(body: &str, id: Option<u64>) -> McpResult<RpcResponse> {
    let mut data = String::new();
    let mut events = Vec::new();

    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.trim_start());
        } else if line.trim().is_empty() && !data.is_empty() {
            events.push(std::mem::take(&mut data));
        }
    }
    if !data.is_empty() {
        events.push(data);
    }

    events
        .iter()
        .filter_map(|event| serde_json::from_str::<RpcResponse>(event).ok())
        .find(|response| response.answers(id))
        .ok_or_else(|| McpError::Protocol("No matching response in event stream".to_string()))
}
