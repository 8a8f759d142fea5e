//! Per-call cache options.

use serde::Deserialize;

use super::identifier::CacheKey;

// == Cache Options ==
/// Options accepted by every cache operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheOptions {
    /// Key the entry identifier is derived from
    pub cache_key: Option<CacheKey>,
    /// Per-call expiry in ms: None = store default, Some(0) = never
    pub time_out: Option<u64>,
    /// Whether delete cascades into related resource types
    pub delete_related_resource: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            cache_key: None,
            time_out: None,
            delete_related_resource: true,
        }
    }
}

impl CacheOptions {
    /// Options with no cache key, as used for a full-type delete.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the given cache key.
    pub fn key(cache_key: impl Into<CacheKey>) -> Self {
        Self {
            cache_key: Some(cache_key.into()),
            ..Self::default()
        }
    }

    pub fn with_time_out(mut self, millis: u64) -> Self {
        self.time_out = Some(millis);
        self
    }

    /// Keeps delete from cascading into related types.
    pub fn without_related(mut self) -> Self {
        self.delete_related_resource = false;
        self
    }

    pub(crate) fn usable_key(&self) -> Option<&CacheKey> {
        self.cache_key.as_ref().filter(|key| key.is_usable())
    }
}
