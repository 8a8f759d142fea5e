//! Cache Entry Module
//!
//! Builds entry records and checks their expiry on read.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Identifier the entry is stored under
    pub identifier: String,
    /// Snapshot of the cached value
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Validity window in milliseconds, 0 = never expires
    pub expiry_ms: u64,
}

impl CacheEntry {
    // == Build ==
    /// Creates an entry holding a copy of `value`.
    ///
    /// # Arguments
    /// * `value` - The value to snapshot
    /// * `expiry_ms` - Already-resolved timeout, 0 = never expires
    /// * `identifier` - Identifier derived from the cache key
    /// * `now` - Current time in Unix milliseconds
    pub fn build(value: &Value, expiry_ms: u64, identifier: &str, now: i64) -> Self {
        Self {
            identifier: identifier.to_string(),
            value: value.clone(),
            created_at: now,
            expiry_ms,
        }
    }

    // == Parse ==
    /// Returns a copy of the entry, or None when it has expired.
    pub fn parse(&self, effective_timeout_ms: u64, now: i64) -> Option<CacheEntry> {
        if self.is_expired_at(effective_timeout_ms, now) {
            None
        } else {
            Some(self.clone())
        }
    }

    // == Is Expired ==
    /// An entry expires once strictly more than the timeout has elapsed.
    /// A zero timeout never expires.
    pub fn is_expired_at(&self, timeout_ms: u64, now: i64) -> bool {
        timeout_ms > 0 && self.age_ms(now) > i128::from(timeout_ms)
    }

    /// Milliseconds since creation; negative if the clock went backwards.
    pub fn age_ms(&self, now: i64) -> i128 {
        i128::from(now) - i128::from(self.created_at)
    }

    /// Creation time as a UTC datetime.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}
