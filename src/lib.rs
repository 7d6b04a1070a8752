//! queuebot library root.

pub mod bot;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod telegram;
pub mod transport;

pub use bot::{CommandDispatcher, IncomingCommand};
pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use crate::core::{QueueError, QueueSession, QueueStore};
pub use error::{Error, Result};
pub use telegram::run_queue_bot;
pub use transport::ChatTransport;
