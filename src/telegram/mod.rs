//! Telegram bot integration.

pub mod client;
pub mod format;
pub mod transport;

pub use client::run_queue_bot;
pub use transport::TelegramTransport;
