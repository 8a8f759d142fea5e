//! LRU Ledger Module
//!
//! Per-resource-type recency queues used for cache eviction.

use std::collections::{HashMap, VecDeque};

use crate::config::CapacityLimit;

// == LRU Tracker ==
/// Tracks access order of the identifiers of one resource type.
///
/// Identifiers are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default, Clone)]
pub struct LruTracker {
    order: VecDeque<String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Moves an identifier to the front, inserting it if new.
    pub fn touch(&mut self, id: &str) {
        self.remove(id);
        self.order.push_front(id.to_string());
    }

    // == Remove ==
    /// Removes an identifier. Returns true if it was tracked.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.order.len();
        self.order.retain(|k| k != id);
        self.order.len() != before
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used identifier.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.order.iter().any(|k| k == id)
    }

    /// Identifiers from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }
}

// == LRU Ledger ==
/// One [`LruTracker`] per resource type.
#[derive(Debug, Default)]
pub struct LruLedger {
    queues: HashMap<String, LruTracker>,
}

impl LruLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as most recently used within `resource_type`.
    ///
    /// Returns the identifiers pushed out by `limit`, oldest first. The caller
    /// owns the entries and must drop them from its bucket.
    pub fn touch(&mut self, resource_type: &str, id: &str, limit: CapacityLimit) -> Vec<String> {
        let queue = self.queues.entry(resource_type.to_string()).or_default();
        queue.touch(id);

        let mut evicted = Vec::new();
        while limit.is_exceeded_by(queue.len()) {
            match queue.evict_oldest() {
                Some(tail) => evicted.push(tail),
                None => break,
            }
        }
        evicted
    }

    /// Removes one identifier, or the whole queue of the type when `id` is None.
    pub fn remove(&mut self, resource_type: &str, id: Option<&str>) -> bool {
        match id {
            Some(id) => self
                .queues
                .get_mut(resource_type)
                .map(|queue| queue.remove(id))
                .unwrap_or(false),
            None => self.queues.remove(resource_type).is_some(),
        }
    }

    pub fn queue(&self, resource_type: &str) -> Option<&LruTracker> {
        self.queues.get(resource_type)
    }

    pub fn clear(&mut self) {
        self.queues.clear();
    }

    /// Iterates over `(resource_type, queue)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LruTracker)> {
        self.queues.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(n: usize) -> CapacityLimit {
        CapacityLimit::from_count(n)
    }

    #[test]
    fn test_lru_new() {
        let lru = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch("key1");
        lru.touch("key2");
        lru.touch("key3");
        lru.touch("key1");

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some(&"key2".to_string()));
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        lru.touch("a");
        lru.touch("b");
        lru.touch("c");
        lru.touch("a");
        lru.touch("c");
        lru.touch("b");

        // front=[b, c, a]=back
        let order: Vec<&str> = lru.iter().map(String::as_str).collect();
        assert_eq!(order, ["b", "c", "a"]);
        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
    }

    #[test]
    fn test_lru_remove_reports_presence() {
        let mut lru = LruTracker::new();
        lru.touch("key1");

        assert!(!lru.remove("nonexistent"));
        assert!(lru.remove("key1"));
        assert!(lru.is_empty());
    }

    #[test]
    fn test_ledger_evicts_tail_when_over_limit() {
        let mut ledger = LruLedger::new();

        assert!(ledger.touch("user", "a", bounded(2)).is_empty());
        assert!(ledger.touch("user", "b", bounded(2)).is_empty());
        assert_eq!(ledger.touch("user", "c", bounded(2)), vec!["a".to_string()]);

        let queue = ledger.queue("user").unwrap();
        assert_eq!(queue.len(), 2);
        assert!(!queue.contains("a"));
    }

    #[test]
    fn test_ledger_retouch_at_capacity_evicts_nothing() {
        let mut ledger = LruLedger::new();
        ledger.touch("user", "a", bounded(2));
        ledger.touch("user", "b", bounded(2));

        assert!(ledger.touch("user", "a", bounded(2)).is_empty());
        assert_eq!(ledger.queue("user").unwrap().peek_oldest(), Some(&"b".to_string()));
    }

    #[test]
    fn test_ledger_unbounded() {
        let mut ledger = LruLedger::new();
        for i in 0..100 {
            assert!(ledger.touch("user", &i.to_string(), CapacityLimit::Unbounded).is_empty());
        }
        assert_eq!(ledger.queue("user").unwrap().len(), 100);
    }

    #[test]
    fn test_ledger_types_are_independent() {
        let mut ledger = LruLedger::new();
        ledger.touch("user", "a", bounded(1));
        assert!(ledger.touch("meta", "b", bounded(1)).is_empty());

        assert!(ledger.queue("user").unwrap().contains("a"));
        assert!(ledger.queue("meta").unwrap().contains("b"));
    }

    #[test]
    fn test_ledger_remove() {
        let mut ledger = LruLedger::new();
        ledger.touch("user", "a", bounded(5));
        ledger.touch("user", "b", bounded(5));

        assert!(ledger.remove("user", Some("a")));
        assert!(!ledger.remove("user", Some("a")));
        assert!(!ledger.remove("meta", Some("a")));
        assert!(ledger.remove("user", None));
        assert!(ledger.queue("user").is_none());
        assert!(!ledger.remove("user", None));
    }
}
