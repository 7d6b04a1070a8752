//! Queue command surface: parsing and dispatch.

pub mod command;
pub mod dispatcher;

pub use command::QueueCommand;
pub use dispatcher::{CommandDispatcher, IncomingCommand};
