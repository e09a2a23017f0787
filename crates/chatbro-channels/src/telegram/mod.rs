//! Telegram - teloxide adapter
//!
//! Every chat is one user: the chat id is the user key handed to the chat
//! service.

mod adapter;
mod commands;
mod config;
mod handler;


pub use adapter::TelegramAdapter;
pub use commands::BotCommand;
pub use config::TelegramConfig;
