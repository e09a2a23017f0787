//! Server wiring for ChatBro
//!
//! - `config`: configuration structures
//! - `loader`: layered loading from embedded defaults, files and environment
//! - `providers`: chat backend and per-domain tool provider resolution
//! - `init`: dependency wiring and the run loop

pub mod config;
mod init;
mod loader;
mod providers;

pub use init::run;
