//! MCP (Model Context Protocol) over streamable HTTP
//!
//! A domain can take its tools from a remote MCP server. The client speaks
//! JSON-RPC 2.0 over HTTP POST and accepts either a plain JSON body or a
//! server-sent event stream in reply.
//!
//! ## Usage
//!
//! ```no_run
//! use chatbro_tools::mcp::McpToolProvider;
//! use chatbro_tools::ToolProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = McpToolProvider::connect("documents", "http://paperless-mcp:3000/mcp")?;
//! let tools = provider.list_tools().await?;
//! # Ok(())
//! # }
//! ```

mod bridge;
mod client;
mod protocol;
mod provider;

pub use bridge::McpToolBridge;
pub use client::McpHttpClient;
pub use protocol::{
    CallToolResult, ContentItem, McpError, McpResult, RemoteTool, RpcRequest, RpcResponse,
};
pub use provider::McpToolProvider;
