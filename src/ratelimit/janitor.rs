//! Background eviction of idle counters.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{GuardError, Result};

use super::store::CounterStore;

/// Periodically sweeps a [`CounterStore`], evicting counters that have not
/// been charged for longer than the sweep frequency.
#[derive(Debug)]
pub struct Janitor {
    /// The store to sweep
    store: Arc<CounterStore>,
    /// Sweep period, also the idle threshold for eviction
    frequency: Duration,
}

impl Janitor {
    /// Create a janitor sweeping `store` every `frequency`.
    ///
    /// A zero frequency is rejected.
    pub fn new(store: Arc<CounterStore>, frequency: Duration) -> Result<Self> {
        if frequency.is_zero() {
            return Err(GuardError::Config(
                "janitor frequency must be greater than zero".to_string(),
            ));
        }

        Ok(Self { store, frequency })
    }

    /// Get the sweep frequency.
    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    /// Run one sweep now and return the number of evicted counters.
    pub fn sweep(&self) -> usize {
        let evicted = self.store.sweep(self.frequency);
        debug!(
            evicted = evicted,
            remaining = self.store.len(),
            "Janitor sweep finished"
        );
        evicted
    }

    /// Sweep on every tick until `shutdown` resolves.
    ///
    /// The first sweep happens one period after start. A sweep that is in
    /// progress when shutdown fires runs to completion; no further tick is
    /// scheduled afterwards.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = time::interval_at(Instant::now() + self.frequency, self.frequency);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(frequency_secs = self.frequency.as_secs(), "Janitor started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }

        info!("Janitor stopped");
    }

    /// Spawn the janitor on the current runtime.
    pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(self.run_until(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use tokio_test::assert_err;

    async fn settle() {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let store = Arc::new(CounterStore::new());
        let result = Janitor::new(store, Duration::ZERO);

        assert!(matches!(assert_err!(result), GuardError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_sweep() {
        let store = Arc::new(CounterStore::new());
        let janitor = Janitor::new(store.clone(), Duration::from_secs(5)).unwrap();

        store.charge("old");
        time::advance(Duration::from_secs(6)).await;
        store.charge("new");

        assert_eq!(janitor.sweep(), 1);
        assert!(!store.contains("old"));
        assert!(store.contains("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_evicts_idle_counters_on_tick() {
        let store = Arc::new(CounterStore::new());
        let janitor = Janitor::new(store.clone(), Duration::from_secs(5)).unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = janitor.spawn(async {
            let _ = rx.await;
        });
        settle().await;

        store.charge("stale");
        time::advance(Duration::from_secs(3)).await;
        store.charge("fresh");

        // Crosses the first tick at t=5
        time::advance(Duration::from_secs(3)).await;
        settle().await;

        assert!(!store.contains("stale"));
        assert!(store.contains("fresh"));

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_keeps_ticking() {
        let store = Arc::new(CounterStore::new());
        let janitor = Janitor::new(store.clone(), Duration::from_secs(5)).unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = janitor.spawn(async {
            let _ = rx.await;
        });
        settle().await;

        for round in 0..3 {
            let key = format!("key-{}", round);
            store.charge(&key);
            time::advance(Duration::from_secs(11)).await;
            settle().await;
            assert!(!store.contains(&key), "round {} was not swept", round);
        }

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_stops_on_shutdown() {
        let store = Arc::new(CounterStore::new());
        let janitor = Janitor::new(store, Duration::from_secs(5)).unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = janitor.spawn(async {
            let _ = rx.await;
        });
        settle().await;

        tx.send(()).unwrap();

        let stopped = time::timeout(Duration::from_secs(5), handle).await;
        assert!(stopped.is_ok(), "janitor did not stop within one period");
    }
}
