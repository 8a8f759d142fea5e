//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Only malformed calls are
//! errors; misses, expiry and refused writes are reported through return values.

use thiserror::Error;

// == Error Catalog ==
/// Get was called without a usable type or options.
pub const CODE_INVALID_GET: u16 = 1001;
/// Update target does not exist. Reported through logs, never raised.
pub const CODE_UPDATE_MISSING: u16 = 3001;
/// Delete was called without a type.
pub const CODE_INVALID_DELETE: u16 = 4001;
/// Generic parameter error.
pub const CODE_INVALID_PARAMS: u16 = 5000;
/// No cache key to build an identifier from.
pub const CODE_MISSING_CACHE_KEY: u16 = 5001;

/// Returns the fixed catalog message for an error code.
pub fn catalog_message(code: u16) -> &'static str {
    match code {
        CODE_INVALID_GET => "failed to read cache: pass a resource type and options",
        CODE_UPDATE_MISSING => {
            "failed to update cache: no such entry, use set(type, options, data) to create it"
        }
        CODE_INVALID_DELETE => {
            "failed to delete cache: use delete(type) for a whole type or \
             delete(type, {cacheKey}) for a single entry"
        }
        CODE_INVALID_PARAMS => "invalid parameters",
        CODE_MISSING_CACHE_KEY => "pass a usable cacheKey to build the cache id",
        _ => "unknown error",
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Resource type was empty on a read path
    #[error("[memCache] {msg} ({operation})", msg = catalog_message(CODE_INVALID_GET))]
    InvalidGet { operation: &'static str },

    /// Resource type was empty on delete
    #[error("[memCache] {msg}", msg = catalog_message(CODE_INVALID_DELETE))]
    InvalidDelete,

    /// Resource type was empty on a write path
    #[error("[memCache] {msg} ({operation})", msg = catalog_message(CODE_INVALID_PARAMS))]
    InvalidParams { operation: &'static str },

    /// Cache key was missing or null
    #[error("[memCache] {msg} ({operation})", msg = catalog_message(CODE_MISSING_CACHE_KEY))]
    MissingCacheKey { operation: &'static str },
}

impl CacheError {
    /// Returns the catalog code of this error.
    pub fn code(&self) -> u16 {
        match self {
            CacheError::InvalidGet { .. } => CODE_INVALID_GET,
            CacheError::InvalidDelete => CODE_INVALID_DELETE,
            CacheError::InvalidParams { .. } => CODE_INVALID_PARAMS,
            CacheError::MissingCacheKey { .. } => CODE_MISSING_CACHE_KEY,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CacheError::InvalidDelete.code(), 4001);
        assert_eq!(CacheError::MissingCacheKey { operation: "set" }.code(), 5001);
        assert_eq!(CacheError::InvalidGet { operation: "get" }.code(), 1001);
        assert_eq!(CacheError::InvalidParams { operation: "set" }.code(), 5000);
    }

    #[test]
    fn test_error_messages_carry_catalog_text() {
        let err = CacheError::MissingCacheKey { operation: "update" };
        let msg = err.to_string();
        assert!(msg.starts_with("[memCache]"));
        assert!(msg.contains("cacheKey"));
        assert!(msg.contains("update"));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(catalog_message(9999), "unknown error");
    }
}
