//! ChatBro Core - agent orchestration and sessions
//!
//! This crate routes every user message through one orchestrating agent that
//! delegates to a fixed set of domain agents, each exposed to it as a tool:
//! - Catalog: builds the orchestrator and domain agents once per process
//! - Tooling: binds each domain agent to the user's domain session per turn
//! - Context: instructions, routing prompt and location slot-filling
//! - Store: durable, TTL-bounded sessions keyed per user and domain
//! - Chat: the `respond` / `reset` façade used by channels

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod reducer;
pub mod session;
pub mod store;
pub mod tooling;

pub use agent::Agent;
pub use catalog::{AgentCatalog, AgentProvider};
pub use chat::ChatService;
pub use config::{
    ChatSettings, DomainContextKind, DomainSettings, HistorySettings, OrchestratorSettings,
    SessionSettings,
};
pub use context::{
    ContextProvider, FileInstructions, InstructionsSource, LocationSlot, UserLocation,
};
pub use descriptor::AgentDescriptor;
pub use error::{Error, Result, UserFriendlyError};
pub use reducer::MessageCountingReducer;
pub use session::{AgentSession, SessionCodec};
pub use store::{MemoryBackend, RedisBackend, SessionBackend, SessionStore};
pub use tooling::{domain_session_key, DomainSessionHandle, DomainTooling, DomainToolingBuilder};

pub use tokio_util::sync::CancellationToken;
