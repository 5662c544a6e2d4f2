//! Hit-ratio bookkeeping.

use crate::cache::backend::Cache;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub requests: u64,
    pub hits: u64,
    pub puts: u64,
    pub removes: u64,
}

impl CacheStats {
    pub fn misses(&self) -> u64 {
        self.requests - self.hits
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.requests as f64
        }
    }
}

/// Counts lookups and hits and logs the running hit ratio at debug level.
pub struct LoggingCache<C> {
    delegate: C,
    stats: CacheStats,
}

impl<C> LoggingCache<C> {
    pub fn new(delegate: C) -> Self {
        Self {
            delegate,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }
}

impl<C, K, V> Cache<K, V> for LoggingCache<C>
where
    C: Cache<K, V>,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&mut self) -> usize {
        self.delegate.size()
    }

    fn put(&mut self, key: K, value: V) {
        self.stats.puts += 1;
        self.delegate.put(key, value);
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.stats.requests += 1;
        let value = self.delegate.get(key);
        if value.is_some() {
            self.stats.hits += 1;
        }
        debug!(
            cache = %self.delegate.id(),
            hit_ratio = self.stats.hit_ratio(),
            "cache hit ratio"
        );
        value
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.stats.removes += 1;
        self.delegate.remove(key)
    }

    fn clear(&mut self) {
        self.delegate.clear();
    }
}
