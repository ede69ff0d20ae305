//! Telegram Bot API transport: long polling in, inline keyboards out.

pub mod client;
pub mod poller;
pub mod types;

pub use client::{TelegramClient, TelegramError};
pub use poller::Poller;
