//! Cache Module
//!
//! Resource-typed in-memory caching with per-type LRU eviction and lazy expiry.

mod clock;
mod entry;
mod identifier;
mod lru;
mod options;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use identifier::{build_identifier, parse_identifier, stringify, CacheKey, UNKNOWN_CACHE_KEY};
pub use lru::{LruLedger, LruTracker};
pub use options::CacheOptions;
pub use stats::CacheStats;
pub use store::MemCache;
