//! Cache Store Module
//!
//! Two-level storage (resource type → identifier → entry) with per-type LRU
//! eviction, lazy expiry and cascading invalidation of related types.

use std::collections::{HashMap, HashSet};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::cache::identifier::{build_identifier, parse_identifier};
use crate::cache::{CacheEntry, CacheOptions, CacheStats, Clock, LruLedger, LruTracker, SystemClock};
use crate::config::CacheConfig;
use crate::error::{catalog_message, CacheError, Result, CODE_UPDATE_MISSING};
use crate::logging::{CacheLogger, LogSink, TracingSink};

type TypeBucket = HashMap<String, CacheEntry>;

// == Mem Cache ==
/// In-process cache of JSON-like values grouped by resource type.
///
/// Every value is copied on the way in and on the way out, so callers never
/// hold a reference into cached state. Operations take `&mut self`; share an
/// instance across threads only behind the host's own lock.
#[derive(Debug)]
pub struct MemCache {
    buckets: HashMap<String, TypeBucket>,
    ledger: LruLedger,
    stats: CacheStats,
    config: CacheConfig,
    logger: CacheLogger,
    clock: Box<dyn Clock>,
}

impl Default for MemCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl MemCache {
    // == Constructor ==
    /// Creates a cache logging through `tracing` and reading the wall clock.
    pub fn new(config: CacheConfig) -> Self {
        let logger = CacheLogger::new(config.cache_log, Box::new(TracingSink));
        Self {
            buckets: HashMap::new(),
            ledger: LruLedger::new(),
            stats: CacheStats::new(),
            config,
            logger,
            clock: Box::new(SystemClock),
        }
    }

    /// Replaces the log sink. The `cache_log` gate still applies.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.logger = CacheLogger::new(self.config.cache_log, Box::new(sink));
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Has ==
    /// Returns true if an entry exists, expired or not. Does not touch the LRU order.
    pub fn has(&self, resource_type: &str, options: &CacheOptions) -> bool {
        let Some(key) = options.usable_key() else {
            return false;
        };
        let id = build_identifier(Some(key));
        self.buckets
            .get(resource_type)
            .is_some_and(|bucket| bucket.contains_key(&id))
    }

    // == Get ==
    /// Returns a copy of the cached value, or None on a miss.
    ///
    /// An expired entry is removed and reported as a miss. A cached `null`
    /// comes back as `Some(Value::Null)`.
    pub fn get(&mut self, resource_type: &str, options: &CacheOptions) -> Result<Option<Value>> {
        if resource_type.is_empty() {
            return Err(CacheError::InvalidGet { operation: "get" });
        }
        let id = required_identifier(options, "get")?;
        let now = self.clock.now_millis();

        let parsed = match self.buckets.get(resource_type).and_then(|b| b.get(&id)) {
            Some(entry) => entry.parse(read_timeout(options, entry), now),
            None => {
                self.stats.record_miss();
                return Ok(None);
            }
        };

        match parsed {
            Some(entry) => {
                self.stats.record_hit();
                self.logger.info(
                    resource_type,
                    "cache hit",
                    json!({
                        "cacheId": id,
                        "createdAt": entry.created_at_utc().map(|t| t.to_rfc3339()),
                    }),
                );
                self.touch(resource_type, &id);
                Ok(Some(entry.value))
            }
            None => {
                self.stats.record_miss();
                self.remove_expired(resource_type, &id);
                Ok(None)
            }
        }
    }

    /// Like [`MemCache::get`], converting the copy into `T`.
    ///
    /// A value that does not fit `T` is logged and reported as a miss.
    pub fn get_as<T: DeserializeOwned>(
        &mut self,
        resource_type: &str,
        options: &CacheOptions,
    ) -> Result<Option<T>> {
        let Some(value) = self.get(resource_type, options)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(err) => {
                self.logger.error(
                    resource_type,
                    format!("cached value does not convert to the requested type: {}", err),
                    Value::Null,
                );
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Caches `data` under a new identifier.
    ///
    /// Refuses to overwrite: returns false and keeps the stored value if the
    /// identifier is already cached. Use [`MemCache::update`] to replace it.
    pub fn set(&mut self, resource_type: &str, options: &CacheOptions, data: &Value) -> Result<bool> {
        if resource_type.is_empty() {
            return Err(CacheError::InvalidParams { operation: "set" });
        }
        let id = required_identifier(options, "set")?;

        let bucket = self.buckets.entry(resource_type.to_string()).or_default();
        if bucket.contains_key(&id) {
            self.logger.warn(
                resource_type,
                "entry already cached, use update(type, options, data) to replace it",
                json!({ "cacheId": id }),
            );
            return Ok(false);
        }

        let expiry_ms = options.time_out.unwrap_or(self.config.time_out);
        let entry = CacheEntry::build(data, expiry_ms, &id, self.clock.now_millis());
        self.logger.info(
            resource_type,
            "cache set",
            json!({ "cacheId": id, "expiryMs": expiry_ms }),
        );
        bucket.insert(id.clone(), entry);

        self.touch(resource_type, &id);
        debug_assert!(self.is_consistent());
        Ok(true)
    }

    /// Serializes `data` and caches it with [`MemCache::set`].
    ///
    /// A value that cannot be represented is logged and not cached.
    pub fn set_serialized<T: Serialize>(
        &mut self,
        resource_type: &str,
        options: &CacheOptions,
        data: &T,
    ) -> Result<bool> {
        if resource_type.is_empty() {
            return Err(CacheError::InvalidParams { operation: "set" });
        }
        required_identifier(options, "set")?;
        match serde_json::to_value(data) {
            Ok(value) => self.set(resource_type, options, &value),
            Err(err) => {
                self.logger.error(
                    resource_type,
                    format!("value could not be copied into the cache: {}", err),
                    Value::Null,
                );
                Ok(false)
            }
        }
    }

    // == Update ==
    /// Replaces the value of an existing, unexpired entry.
    ///
    /// Returns false without creating anything when there is no such entry.
    pub fn update(
        &mut self,
        resource_type: &str,
        options: &CacheOptions,
        data: &Value,
    ) -> Result<bool> {
        if resource_type.is_empty() {
            return Err(CacheError::InvalidParams { operation: "update" });
        }
        let id = required_identifier(options, "update")?;
        let now = self.clock.now_millis();

        let expired = self
            .buckets
            .get(resource_type)
            .and_then(|b| b.get(&id))
            .map(|entry| entry.is_expired_at(read_timeout(options, entry), now));

        match expired {
            Some(false) => {}
            Some(true) | None => {
                if expired == Some(true) {
                    self.remove_expired(resource_type, &id);
                }
                self.logger.error(
                    resource_type,
                    catalog_message(CODE_UPDATE_MISSING),
                    json!({ "cacheId": id }),
                );
                return Ok(false);
            }
        }

        let expiry_ms = options.time_out.unwrap_or(self.config.time_out);
        let entry = CacheEntry::build(data, expiry_ms, &id, now);
        self.logger.info(
            resource_type,
            "cache update",
            json!({ "cacheId": id, "expiryMs": expiry_ms }),
        );
        if let Some(bucket) = self.buckets.get_mut(resource_type) {
            bucket.insert(id.clone(), entry);
        }

        self.touch(resource_type, &id);
        debug_assert!(self.is_consistent());
        Ok(true)
    }

    // == Delete ==
    /// Deletes one entry, or the whole type when the options carry no cache key.
    ///
    /// Related types from the configuration are deleted first, recursively,
    /// unless `delete_related_resource` is false. Each type is visited at most
    /// once per call, so cyclic relations terminate.
    ///
    /// Returns whether the entry (or the type's bucket) existed.
    pub fn delete(&mut self, resource_type: &str, options: &CacheOptions) -> Result<bool> {
        if resource_type.is_empty() {
            return Err(CacheError::InvalidDelete);
        }
        let mut visited = HashSet::new();
        let existed = self.delete_cascading(resource_type, options, &mut visited);
        debug_assert!(self.is_consistent());
        Ok(existed)
    }

    fn delete_cascading(
        &mut self,
        resource_type: &str,
        options: &CacheOptions,
        visited: &mut HashSet<String>,
    ) -> bool {
        visited.insert(resource_type.to_string());

        if options.delete_related_resource {
            let related = self.config.related_resources.related_to(resource_type).to_vec();
            let whole_type = CacheOptions::new();
            for other in related {
                if other.is_empty() || visited.contains(&other) {
                    continue;
                }
                self.delete_cascading(&other, &whole_type, visited);
            }
        }

        match options.usable_key() {
            Some(key) => {
                let id = build_identifier(Some(key));
                self.logger.info(
                    resource_type,
                    "cache delete entry",
                    json!({ "cacheId": id }),
                );
                self.remove_entry(resource_type, &id)
            }
            None => {
                self.logger.info(resource_type, "cache delete type", Value::Null);
                self.ledger.remove(resource_type, None);
                self.buckets.remove(resource_type).is_some()
            }
        }
    }

    // == Clear ==
    /// Empties every bucket and LRU queue. Does not cascade.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.ledger.clear();
        self.logger.info("*", "cache cleared", Value::Null);
    }

    // == Inspection ==
    /// Returns a copy of the raw entry without checking expiry or touching the LRU order.
    pub fn peek_entry(&self, resource_type: &str, options: &CacheOptions) -> Option<CacheEntry> {
        let id = build_identifier(Some(options.usable_key()?));
        self.buckets
            .get(resource_type)
            .and_then(|bucket| bucket.get(&id))
            .cloned()
    }

    /// Identifiers of a type from most to least recently used.
    pub fn recency(&self, resource_type: &str) -> Vec<String> {
        self.ledger
            .queue(resource_type)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Rebuilds the key structure an identifier was derived from.
    pub fn parse_identifier(identifier: &str) -> Value {
        parse_identifier(identifier)
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.len();
        stats.total_types = self.buckets.len();
        stats
    }

    /// Entries across all types.
    pub fn len(&self) -> usize {
        self.buckets.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of one type.
    pub fn len_of(&self, resource_type: &str) -> usize {
        self.buckets.get(resource_type).map_or(0, HashMap::len)
    }

    /// Types that currently have a bucket, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.buckets.keys().cloned().collect();
        types.sort();
        types
    }

    /// Checks that every bucket matches its LRU queue one-to-one and that no
    /// queue is over the limit.
    pub fn is_consistent(&self) -> bool {
        let buckets_match = self.buckets.iter().all(|(resource_type, bucket)| {
            let queue = self.ledger.queue(resource_type);
            queue.map_or(0, LruTracker::len) == bucket.len()
                && bucket
                    .keys()
                    .all(|id| queue.is_some_and(|q| q.contains(id)))
        });
        let queues_match = self.ledger.iter().all(|(resource_type, queue)| {
            let within_limit = !self.config.limit.is_exceeded_by(queue.len());
            match self.buckets.get(resource_type) {
                Some(bucket) => within_limit && queue.iter().all(|id| bucket.contains_key(id)),
                None => queue.is_empty(),
            }
        });
        buckets_match && queues_match
    }

    // == Internal ==
    fn touch(&mut self, resource_type: &str, id: &str) {
        let evicted = self.ledger.touch(resource_type, id, self.config.limit);
        for tail in evicted {
            if let Some(bucket) = self.buckets.get_mut(resource_type) {
                bucket.remove(&tail);
            }
            self.stats.record_eviction();
            self.logger.info(
                resource_type,
                "queue full, evicted least recently used entry",
                json!({ "cacheId": tail }),
            );
        }
    }

    fn remove_entry(&mut self, resource_type: &str, id: &str) -> bool {
        self.ledger.remove(resource_type, Some(id));
        self.buckets
            .get_mut(resource_type)
            .is_some_and(|bucket| bucket.remove(id).is_some())
    }

    fn remove_expired(&mut self, resource_type: &str, id: &str) {
        if self.remove_entry(resource_type, id) {
            self.stats.record_expiration();
            self.logger.info(resource_type, "cache expired", json!({ "cacheId": id }));
        }
    }
}

/// Per-call timeout wins over the one recorded on the entry.
fn read_timeout(options: &CacheOptions, entry: &CacheEntry) -> u64 {
    options.time_out.unwrap_or(entry.expiry_ms)
}

fn required_identifier(options: &CacheOptions, operation: &'static str) -> Result<String> {
    options
        .usable_key()
        .map(|key| build_identifier(Some(key)))
        .ok_or(CacheError::MissingCacheKey { operation })
}
