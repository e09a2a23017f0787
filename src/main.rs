//! ChatBro - Telegram assistant with an orchestrating agent
//!
//! Binary entry point: loads configuration, wires the agent core to the
//! Telegram channel and runs until interrupted.

#![forbid(unsafe_code)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatbro=info,chatbro_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ChatBro v{}", env!("CARGO_PKG_VERSION"));

    server::run().await
}
