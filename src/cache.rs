// src/cache.rs
//! Short-TTL in-memory cache with per-key single-flight.
//!
//! Entries are absolute-TTL (no sliding refresh). Expired entries are dropped
//! lazily on the next lookup. Errors from the compute closure are returned as-is
//! and never cached, so the next call retries upstream.

use metrics::counter;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cached<V> {
    pub value: V,
    pub status: CacheStatus,
}

#[derive(Debug)]
struct CacheEntry<K, V> {
    key: K,
    value: V,
    created_at: Instant,
}

type Gate = Arc<tokio::sync::Mutex<()>>;

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, CacheEntry<K, V>>>,
    gates: Mutex<HashMap<K, Gate>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Valid entry for `key`, evicting it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = lock(&self.entries);
        let expired = match entries.get(key) {
            Some(e) if e.created_at.elapsed() < self.ttl => return Some(e.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            if let Some(old) = entries.remove(key) {
                tracing::debug!(key = %old.key, "cache entry expired");
            }
        }
        None
    }

    fn store(&self, key: K, value: V) {
        let entry = CacheEntry {
            key: key.clone(),
            value,
            created_at: Instant::now(),
        };
        lock(&self.entries).insert(key, entry);
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `compute` once and store its
    /// result. Concurrent misses on the same key wait for the first caller and
    /// then read what it stored.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<Cached<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(self.hit(&key, value));
        }

        let gate = lock(&self.gates).entry(key.clone()).or_default().clone();
        let result = {
            let _flight = gate.lock().await;
            match self.get(&key) {
                Some(value) => Ok(self.hit(&key, value)),
                None => {
                    counter!("live_score_cache_total", "result" => "miss").increment(1);
                    tracing::debug!(%key, "cache miss");
                    compute().await.map(|value| {
                        self.store(key.clone(), value.clone());
                        Cached {
                            value,
                            status: CacheStatus::Miss,
                        }
                    })
                }
            }
        };
        self.release_gate(&key, gate);
        result
    }

    fn hit(&self, key: &K, value: V) -> Cached<V> {
        counter!("live_score_cache_total", "result" => "hit").increment(1);
        tracing::debug!(%key, "cache hit");
        Cached {
            value,
            status: CacheStatus::Hit,
        }
    }

    // Drop the gate once nobody else holds it (map + our clone == 2).
    fn release_gate(&self, key: &K, gate: Gate) {
        let mut gates = lock(&self.gates);
        if Arc::strong_count(&gate) == 2 {
            gates.remove(key);
        }
        drop(gate);
    }
}
