//! Mem Cache - an in-process response cache
//!
//! Caches JSON-like values per resource type with LRU eviction, lazy expiry
//! and cascading invalidation of related types.

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod models;

pub use cache::{CacheKey, CacheOptions, MemCache};
pub use config::{CacheConfig, PartialConfig, RelatedResources};
pub use error::{CacheError, Result};
