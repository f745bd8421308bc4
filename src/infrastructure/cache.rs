//! Time-bounded cache for computed hierarchies.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, instrument};

pub const DEFAULT_MAX_ENTRIES: u64 = 256;

/// String-keyed cache with a fixed time-to-live.
///
/// Concurrent misses for the same key run the computation once; the other
/// callers wait for and share its result. Failed computations are not cached.
#[derive(Clone)]
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<String, V>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_entries)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    /// Cached value for `key`, or the result of `compute` which is then stored.
    #[instrument(level = "debug", skip(self, compute))]
    pub fn get_or_compute<E, F>(&self, key: &str, compute: F) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Result<V, E>,
        E: Send + Sync + 'static,
    {
        self.inner.try_get_with(key.to_string(), || {
            debug!("cache miss, computing");
            compute()
        })
    }

    /// Drop every entry whose key starts with `prefix`.
    #[instrument(level = "debug", skip(self))]
    pub fn invalidate_prefix(&self, prefix: &str) {
        let stale: Vec<Arc<String>> = self
            .inner
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.inner.invalidate(key.as_str());
        }
        debug!("invalidated {} entries", stale.len());
    }
}
