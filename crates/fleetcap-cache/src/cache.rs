//! Keyed TTL cache over async loaders.
//!
//! Each key holds at most one entry: a shared handle to the load that
//! produced (or is producing) its value, tagged with a generation number
//! and an expiry timestamp taken when the load started. Callers arriving
//! while the load is in flight await the same handle, so the loader runs
//! once per key per validity window.
//!
//! Every load is driven by its own tokio task, so it runs to completion
//! even if all of its callers are dropped. The driver also evicts a failed
//! entry when no caller is left to do it.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::clock::Clock;

type SharedLoad<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

struct Entry<V, E> {
    /// Distinguishes this load from later loads of the same key.
    generation: u64,
    /// Clock reading (ms) at which this entry stops being served.
    expires_at: u64,
    load: SharedLoad<V, E>,
}

struct Table<K, V, E> {
    entries: HashMap<K, Entry<V, E>>,
    next_generation: u64,
}

/// Time-boxed memoizer keyed by `K`.
///
/// Values and errors are cloned out to every caller sharing a load. A
/// failed load is dropped from the table so the next call retries.
pub struct CapacityCache<K, V, E> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    table: Arc<Mutex<Table<K, V, E>>>,
}

impl<K, V, E> CapacityCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cache. `name` labels log lines.
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            table: Arc::new(Mutex::new(Table {
                entries: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    /// Return the cached value for `key`, running `loader` on a miss.
    ///
    /// `loader` is only called when no live entry exists; otherwise the
    /// existing (possibly still running) load is awaited. Must be called
    /// from within a tokio runtime.
    pub async fn get<F, Fut>(&self, key: K, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (generation, load) = self.lookup_or_start(&key, loader);
        let outcome = load.await;
        if outcome.is_err() {
            discard_failed(&self.table, self.name, &key, generation);
        }
        outcome
    }

    /// Number of entries currently held, live or not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup_or_start<F, Fut>(&self, key: &K, loader: F) -> (u64, SharedLoad<V, E>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let now = self.clock.now_millis();
        let mut table = self.lock();

        match table.entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                debug!(
                    cache = self.name,
                    key = ?key,
                    generation = entry.generation,
                    "cache hit"
                );
                return (entry.generation, entry.load.clone());
            }
            Some(entry) => {
                debug!(
                    cache = self.name,
                    key = ?key,
                    generation = entry.generation,
                    "cache entry expired"
                );
            }
            None => {
                debug!(cache = self.name, key = ?key, "cache miss");
            }
        }

        table.next_generation += 1;
        let generation = table.next_generation;
        let load = loader().boxed().shared();
        let ttl_millis = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        table.entries.insert(
            key.clone(),
            Entry {
                generation,
                expires_at: now.saturating_add(ttl_millis),
                load: load.clone(),
            },
        );
        drop(table);

        let driver = load.clone();
        let table = Arc::clone(&self.table);
        let name = self.name;
        let key = key.clone();
        tokio::spawn(async move {
            if driver.await.is_err() {
                discard_failed(&table, name, &key, generation);
            }
        });

        (generation, load)
    }

    fn lock(&self) -> MutexGuard<'_, Table<K, V, E>> {
        lock_table(&self.table)
    }
}

fn lock_table<K, V, E>(table: &Mutex<Table<K, V, E>>) -> MutexGuard<'_, Table<K, V, E>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Remove the entry for `key` if it still belongs to `generation`.
fn discard_failed<K, V, E>(table: &Mutex<Table<K, V, E>>, name: &str, key: &K, generation: u64)
where
    K: Eq + Hash + fmt::Debug,
{
    let mut table = lock_table(table);
    if table
        .entries
        .get(key)
        .is_some_and(|entry| entry.generation == generation)
    {
        table.entries.remove(key);
        debug!(cache = name, key = ?key, generation, "failed load discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Semaphore;
    use tokio::time::{sleep, timeout};

    const TTL: Duration = Duration::from_secs(300);

    fn test_cache() -> (Arc<ManualClock>, CapacityCache<String, u32, String>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = CapacityCache::new("test", TTL, clock.clone());
        (clock, cache)
    }

    /// Loader returning the invocation count, optionally gated.
    fn counting_loader(
        calls: &Arc<AtomicU32>,
        gate: Option<Arc<Semaphore>>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if let Some(gate) = gate {
                    let _permit = gate.acquire().await.map_err(|e| e.to_string())?;
                }
                Ok::<u32, String>(n)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let (_clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let (a, b, c, _) = tokio::join!(
            cache.get("us-east-1".to_string(), counting_loader(&calls, Some(gate.clone()))),
            cache.get("us-east-1".to_string(), counting_loader(&calls, Some(gate.clone()))),
            cache.get("us-east-1".to_string(), counting_loader(&calls, Some(gate.clone()))),
            async {
                tokio::task::yield_now().await;
                gate.add_permits(1);
            },
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, Ok(1));
        assert_eq!(b, Ok(1));
        assert_eq!(c, Ok(1));
    }

    #[tokio::test]
    async fn reloads_exactly_once_after_ttl() {
        let (clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let key = "eu-west-1".to_string();

        assert_eq!(cache.get(key.clone(), counting_loader(&calls, None)).await, Ok(1));

        clock.advance(TTL - Duration::from_millis(1));
        assert_eq!(cache.get(key.clone(), counting_loader(&calls, None)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(key.clone(), counting_loader(&calls, None)).await, Ok(2));
        assert_eq!(cache.get(key.clone(), counting_loader(&calls, None)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_not_cached() {
        let (_clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let failing = {
            let calls = calls.clone();
            let gate = gate.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let _permit = gate.acquire().await.map_err(|e| e.to_string())?;
                    Err::<u32, _>("throttled".to_string())
                }
                .boxed()
            }
        };

        let (first, second, _) = tokio::join!(
            cache.get("us-west-2".to_string(), failing),
            cache.get("us-west-2".to_string(), counting_loader(&calls, None)),
            async {
                tokio::task::yield_now().await;
                gate.add_permits(1);
            },
        );

        assert_eq!(first, Err("throttled".to_string()));
        assert_eq!(second, Err("throttled".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());

        let retry = cache
            .get("us-west-2".to_string(), counting_loader(&calls, None))
            .await;
        assert_eq!(retry, Ok(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let (_clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let (slow, fast) = tokio::join!(
            cache.get("slow".to_string(), counting_loader(&calls, Some(gate.clone()))),
            async {
                let fast = cache
                    .get("fast".to_string(), counting_loader(&calls, None))
                    .await;
                gate.add_permits(1);
                fast
            },
        );

        assert_eq!(slow, Ok(1));
        assert_eq!(fast, Ok(2));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn stale_failure_does_not_evict_newer_load() {
        let (clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let gate = Arc::new(Semaphore::new(0));

        let failing = {
            let gate = gate.clone();
            move || {
                async move {
                    let _permit = gate.acquire().await.map_err(|e| e.to_string())?;
                    Err::<u32, _>("late failure".to_string())
                }
                .boxed()
            }
        };

        let (old, fresh) = tokio::join!(
            cache.get("k".to_string(), failing),
            async {
                tokio::task::yield_now().await;
                clock.advance(TTL);
                let fresh = cache.get("k".to_string(), counting_loader(&calls, None)).await;
                gate.add_permits(1);
                fresh
            },
        );

        assert!(old.is_err());
        assert_eq!(fresh, Ok(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("k".to_string(), counting_loader(&calls, None)).await,
            Ok(1)
        );
    }

    #[tokio::test]
    async fn load_finishes_after_its_only_caller_is_dropped() {
        let (_clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let completed = Arc::new(AtomicU32::new(0));

        let slow = {
            let completed = completed.clone();
            move || {
                async move {
                    sleep(Duration::from_millis(20)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, String>(7)
                }
                .boxed()
            }
        };

        let abandoned = timeout(Duration::from_millis(5), cache.get("k".to_string(), slow)).await;
        assert!(abandoned.is_err());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 1);

        let value = cache
            .get("k".to_string(), counting_loader(&calls, None))
            .await;
        assert_eq!(value, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_load_without_callers_is_evicted() {
        let (_clock, cache) = test_cache();
        let calls = Arc::new(AtomicU32::new(0));

        let failing = || {
            async {
                sleep(Duration::from_millis(20)).await;
                Err::<u32, _>("throttled".to_string())
            }
            .boxed()
        };

        let abandoned =
            timeout(Duration::from_millis(5), cache.get("k".to_string(), failing)).await;
        assert!(abandoned.is_err());
        assert_eq!(cache.len(), 1);

        sleep(Duration::from_millis(100)).await;
        assert!(cache.is_empty());

        let retry = cache
            .get("k".to_string(), counting_loader(&calls, None))
            .await;
        assert_eq!(retry, Ok(1));
    }
}
