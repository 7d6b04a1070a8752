//! Core module - the queue state machine.
//!
//! - In-memory FIFO store of members
//! - Wait-time and message rendering
//! - The session that keeps the published message in sync

pub mod auth;
pub mod clock;
pub mod error;
pub mod render;
pub mod session;
pub mod store;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::QueueError;
pub use session::{QueueSession, SessionState};
pub use store::{Member, QueueStore};
pub use time::TimeUnit;
