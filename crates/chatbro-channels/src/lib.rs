//! ChatBro Channels - messaging front-ends
//!
//! Channels turn incoming chat messages into calls on
//! [`chatbro_core::ChatService`] and deliver the replies:
//! - Telegram: long-polling bot built on teloxide
//! - Splitter: breaks long replies at natural boundaries

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod splitter;
pub mod telegram;

pub use error::{Error, Result};
pub use splitter::MessageSplitter;
pub use telegram::{TelegramAdapter, TelegramConfig};
