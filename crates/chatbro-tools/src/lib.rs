//! ChatBro Tools - tool registry and domain tool integrations
//!
//! This crate provides the tool system the agents call into:
//! - Registry: `Tool` trait, definitions and ordered lookup
//! - Provider: `ToolProvider` for listing a domain's tools at startup
//! - Builtins: small utilities such as the current date and time
//! - Restaurants: nearby lunch menus over HTTP
//! - MCP: tools served by a remote Model Context Protocol endpoint

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod error;
pub mod mcp;
pub mod provider;
pub mod registry;
pub mod restaurants;

pub use builtins::CurrentDateTimeTool;
pub use error::{Error, Result};
pub use provider::{StaticToolProvider, ToolProvider};
pub use registry::{Tool, ToolDefinition, ToolRegistry, ToolResult};
