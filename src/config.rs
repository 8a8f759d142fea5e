//! Configuration Module
//!
//! Cache defaults, merged from a partial configuration or from environment variables.

use std::collections::HashMap;
use std::env;
use std::num::NonZeroUsize;

use serde::Deserialize;

/// Entries kept per resource type when no limit is configured.
pub const DEFAULT_LIMIT: usize = 10;

// == Capacity Limit ==
/// Maximum number of entries per resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityLimit {
    /// No eviction
    Unbounded,
    /// Evict the least recently used entry beyond this many
    Bounded(NonZeroUsize),
}

impl CapacityLimit {
    /// Maps the external integer form, where 0 means unbounded.
    pub fn from_count(count: usize) -> Self {
        match NonZeroUsize::new(count) {
            Some(n) => CapacityLimit::Bounded(n),
            None => CapacityLimit::Unbounded,
        }
    }

    /// Returns true if `len` entries overflow this limit.
    pub fn is_exceeded_by(&self, len: usize) -> bool {
        match self {
            CapacityLimit::Unbounded => false,
            CapacityLimit::Bounded(max) => len > max.get(),
        }
    }
}

impl Default for CapacityLimit {
    fn default() -> Self {
        CapacityLimit::from_count(DEFAULT_LIMIT)
    }
}

// == Related Resources ==
/// One related type or a list of them, as written in configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Maps a resource type to the types whose cache is invalidated with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedResources {
    relations: HashMap<String, Vec<String>>,
}

impl RelatedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `related` as dependents of `resource_type`.
    pub fn relate<I, S>(mut self, resource_type: &str, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relations
            .entry(resource_type.to_string())
            .or_default()
            .extend(related.into_iter().map(Into::into));
        self
    }

    /// Types directly related to `resource_type`.
    pub fn related_to(&self, resource_type: &str) -> &[String] {
        self.relations
            .get(resource_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl<'de> Deserialize<'de> for RelatedResources {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: HashMap<String, OneOrMany> = HashMap::deserialize(deserializer)?;
        let relations = raw.into_iter().map(|(k, v)| (k, v.into())).collect();
        Ok(Self { relations })
    }
}

// == Cache Config ==
/// Resolved cache configuration, immutable once handed to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum entries per resource type
    pub limit: CapacityLimit,
    /// Default expiry in milliseconds, 0 = never expires
    pub time_out: u64,
    /// Whether cache events reach the log sink
    pub cache_log: bool,
    /// Cascading invalidation map
    pub related_resources: RelatedResources,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            limit: CapacityLimit::default(),
            time_out: 0,
            cache_log: true,
            related_resources: RelatedResources::default(),
        }
    }
}

impl CacheConfig {
    pub fn with_limit(mut self, count: usize) -> Self {
        self.limit = CapacityLimit::from_count(count);
        self
    }

    pub fn with_time_out(mut self, millis: u64) -> Self {
        self.time_out = millis;
        self
    }

    pub fn with_cache_log(mut self, enabled: bool) -> Self {
        self.cache_log = enabled;
        self
    }

    pub fn with_related_resources(mut self, related: RelatedResources) -> Self {
        self.related_resources = related;
        self
    }

    /// Creates a config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMCACHE_LIMIT` - Entries per type, 0 = unbounded (default: 10)
    /// - `MEMCACHE_TIMEOUT` - Default expiry in ms, 0 = never (default: 0)
    /// - `MEMCACHE_LOG` - Emit cache logs (default: true)
    /// - `MEMCACHE_RELATED` - JSON relation map (default: empty)
    pub fn from_env() -> Self {
        let partial = PartialConfig {
            limit: env::var("MEMCACHE_LIMIT").ok().and_then(|v| v.parse().ok()),
            time_out: env::var("MEMCACHE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok()),
            cache_log: env::var("MEMCACHE_LOG").ok().and_then(|v| v.parse().ok()),
            related_resource_mapper: env::var("MEMCACHE_RELATED")
                .ok()
                .and_then(|v| serde_json::from_str(&v).ok()),
        };
        partial.merge()
    }
}

// == Partial Config ==
/// User-facing configuration; absent fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfig {
    pub limit: Option<usize>,
    pub time_out: Option<u64>,
    pub cache_log: Option<bool>,
    pub related_resource_mapper: Option<RelatedResources>,
}

impl PartialConfig {
    /// Merges over [`CacheConfig::default`].
    pub fn merge(self) -> CacheConfig {
        let defaults = CacheConfig::default();
        CacheConfig {
            limit: self
                .limit
                .map(CapacityLimit::from_count)
                .unwrap_or(defaults.limit),
            time_out: self.time_out.unwrap_or(defaults.time_out),
            cache_log: self.cache_log.unwrap_or(defaults.cache_log),
            related_resources: self
                .related_resource_mapper
                .unwrap_or(defaults.related_resources),
        }
    }
}

impl From<PartialConfig> for CacheConfig {
    fn from(partial: PartialConfig) -> Self {
        partial.merge()
    }
}
