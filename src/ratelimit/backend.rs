//! Attempt limiter trait for abstracting the counter store.

use async_trait::async_trait;

use crate::error::Result;

use super::store::CounterStore;

/// Trait for attempt counter backends.
///
/// The decision engine only talks to counters through this trait, which
/// lets a backend that can fail (for example one backed by a remote store)
/// surface its errors to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptLimiter: Send + Sync {
    /// Charge one attempt to `key` and return the post-charge count.
    async fn charge(&self, key: &str) -> Result<u64>;

    /// Remove the counters for `keys`. Absent keys are not an error.
    async fn clear_keys(&self, keys: &[String]) -> Result<()>;

    /// Remove every counter.
    async fn clear_all(&self) -> Result<()>;
}

#[async_trait]
impl AttemptLimiter for CounterStore {
    async fn charge(&self, key: &str) -> Result<u64> {
        Ok(CounterStore::charge(self, key))
    }

    async fn clear_keys(&self, keys: &[String]) -> Result<()> {
        CounterStore::clear_keys(self, keys);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        CounterStore::clear_all(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_store_backend_charges() {
        let store = CounterStore::new();
        let limiter: &dyn AttemptLimiter = &store;

        assert_eq!(assert_ok!(limiter.charge("key").await), 1);
        assert_eq!(assert_ok!(limiter.charge("key").await), 2);
    }

    #[tokio::test]
    async fn test_store_backend_clears() {
        let store = CounterStore::new();
        let limiter: &dyn AttemptLimiter = &store;
        store.charge("ip");
        store.charge("login");

        assert_ok!(limiter.clear_keys(&["ip".to_string()]).await);
        assert!(!store.contains("ip"));
        assert!(store.contains("login"));

        assert_ok!(limiter.clear_all().await);
        assert!(store.is_empty());
    }
}
