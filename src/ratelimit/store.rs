//! In-memory counter store.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::trace;

use super::counter::Counter;

/// Keyed store of decaying attempt counters.
///
/// Every operation, including the janitor's sweep, runs under one
/// store-wide mutex, so charges to the same key are applied in a total
/// order and a sweep never observes a half-applied charge.
///
/// Keys live in a single flat namespace: an IP, a login and a password with
/// the same text share one counter.
#[derive(Debug)]
pub struct CounterStore {
    /// Counters indexed by raw key
    counters: Mutex<HashMap<String, Counter>>,
}

impl CounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Charge one attempt to `key` and return the post-charge count.
    pub fn charge(&self, key: &str) -> u64 {
        self.charge_at(key, Instant::now())
    }

    fn charge_at(&self, key: &str, now: Instant) -> u64 {
        let mut counters = self.counters.lock();

        let count = match counters.get_mut(key) {
            Some(counter) => counter.charge(now),
            None => {
                counters.insert(key.to_string(), Counter::new(now));
                1
            }
        };

        trace!(key = %key, count = count, "Charged counter");
        count
    }

    /// Remove the counters for `keys`. Absent keys are ignored.
    pub fn clear_keys<K: AsRef<str>>(&self, keys: &[K]) {
        let mut counters = self.counters.lock();
        for key in keys {
            counters.remove(key.as_ref());
        }
    }

    /// Drop every counter.
    pub fn clear_all(&self) {
        let mut counters = self.counters.lock();
        *counters = HashMap::new();
    }

    /// Evict counters that have not been charged for longer than `max_idle`.
    ///
    /// Returns the number of evicted counters.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        self.sweep_at(Instant::now(), max_idle)
    }

    fn sweep_at(&self, now: Instant, max_idle: Duration) -> usize {
        let mut counters = self.counters.lock();
        let before = counters.len();
        counters.retain(|_, counter| !counter.is_stale(now, max_idle));
        before - counters.len()
    }

    /// Get the current count for a key without charging it.
    ///
    /// Returns `None` if no counter exists for the key.
    pub fn current_count(&self, key: &str) -> Option<u64> {
        let counters = self.counters.lock();
        counters.get(key).map(|c| c.current_count())
    }

    /// Whether a counter exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.counters.lock().contains_key(key)
    }

    /// Get the number of live counters.
    pub fn len(&self) -> usize {
        self.counters.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_store_creation() {
        let store = CounterStore::new();
        assert!(store.is_empty());
        assert_eq!(store.current_count("anything"), None);
    }

    #[test]
    fn test_first_charge_returns_one() {
        let store = CounterStore::new();

        assert_eq!(store.charge("10.0.0.1/32"), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_count("10.0.0.1/32"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_charges_accumulate_and_decay() {
        let store = CounterStore::new();

        for expected in 1..=5 {
            assert_eq!(store.charge("user"), expected);
        }

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.charge("user"), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_charge_fully_decays_after_one_second() {
        let store = CounterStore::new();
        store.charge("user");

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.charge("user"), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = CounterStore::new();

        store.charge("a");
        store.charge("a");
        store.charge("b");

        assert_eq!(store.current_count("a"), Some(2));
        assert_eq!(store.current_count("b"), Some(1));
    }

    #[test]
    fn test_clear_keys_is_idempotent() {
        let store = CounterStore::new();
        store.charge("ip");
        store.charge("login");
        store.charge("password");

        store.clear_keys(&["ip", "login", "missing"]);
        store.clear_keys(&["ip", "login"]);

        assert!(!store.contains("ip"));
        assert!(!store.contains("login"));
        assert!(store.contains("password"));
    }

    #[test]
    fn test_clear_all_empties_store() {
        let store = CounterStore::new();
        store.charge("a");
        store.charge("a");
        store.charge("b");

        store.clear_all();

        assert!(store.is_empty());
        assert_eq!(store.charge("a"), 1);
    }

    #[test]
    fn test_sweep_evicts_only_stale_counters() {
        let store = CounterStore::new();
        let t0 = Instant::now();
        store.charge_at("stale", t0);
        store.charge_at("fresh", t0 + Duration::from_secs(4));

        let evicted = store.sweep_at(t0 + Duration::from_secs(6), Duration::from_secs(5));

        assert_eq!(evicted, 1);
        assert!(!store.contains("stale"));
        assert!(store.contains("fresh"));
    }

    #[test]
    fn test_sweep_keeps_counter_idle_exactly_max_idle() {
        let store = CounterStore::new();
        let t0 = Instant::now();
        store.charge_at("edge", t0);

        let evicted = store.sweep_at(t0 + Duration::from_secs(5), Duration::from_secs(5));

        assert_eq!(evicted, 0);
        assert!(store.contains("edge"));
    }

    #[test]
    fn test_concurrent_charges_are_serialized() {
        let store = Arc::new(CounterStore::new());
        let t0 = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.charge_at("shared", t0);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.current_count("shared"), Some(800));
    }
}
