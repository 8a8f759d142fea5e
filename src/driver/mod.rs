//! Driver Module
//!
//! Line-oriented command interface over a [`MemCache`](crate::cache::MemCache).
//!
//! # Commands
//! - `has`, `get`, `set`, `update`, `delete` - take `type` and `options`
//!   (`set` and `update` also take `data`)
//! - `clear` - empty the cache
//! - `stats` - counters and hit rate
//! - `parse` - rebuild the key behind an `identifier`

pub mod handlers;
pub mod session;

pub use handlers::execute;
pub use session::{run_session, SessionSummary};
