//! Assembles decorator chains over the in-memory base store.

use super::backend::{Cache, MemoryCache};
use super::config::{CacheConfig, LayerConfig};
use super::decorators::{LoggingCache, LruCache, WeakCache};
use super::reference::{ReferenceQueue, WeakEntry};
use crate::Result;
use std::hash::Hash;
use std::sync::Arc;

type Chain<K, T> = Box<dyn Cache<K, T> + Send>;

/// Builds a chain from the base store outward: layers wrap in the order they
/// were added, and the logging decorator, when enabled, goes outermost.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            config: CacheConfig::new()
                .with_id(id)
                .with_layers(Vec::new())
                .with_logging(false),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn lru(mut self, capacity: usize) -> Self {
        self.config.layers.push(LayerConfig::Lru { capacity });
        self
    }

    pub fn weak(mut self, pin_count: usize) -> Self {
        self.config.layers.push(LayerConfig::Weak { pin_count });
        self
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.logging = enabled;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn build<K, V>(&self) -> Result<CacheChain<K, V>>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Send + Sync + 'static,
    {
        self.config.validate()?;
        let id = self.config.id.as_str();
        let layers = self.config.layers.as_slice();

        let weak_at = layers.iter().enumerate().find_map(|(i, layer)| match *layer {
            LayerConfig::Weak { pin_count } => Some((i, pin_count)),
            LayerConfig::Lru { .. } => None,
        });

        let (mut cache, reference_queue): (Chain<K, Arc<V>>, _) = match weak_at {
            Some((split, pin_count)) => {
                let base: Chain<K, WeakEntry<K, V>> = Box::new(MemoryCache::new(id));
                let inner = wrap_lru(base, &layers[..split]);
                let queue = ReferenceQueue::new();
                let weak: Chain<K, Arc<V>> =
                    Box::new(WeakCache::with_queue(inner, pin_count, queue.clone()));
                (wrap_lru(weak, &layers[split + 1..]), Some(queue))
            }
            None => {
                let base: Chain<K, Arc<V>> = Box::new(MemoryCache::new(id));
                (wrap_lru(base, layers), None)
            }
        };

        if self.config.logging {
            cache = Box::new(LoggingCache::new(cache));
        }

        tracing::debug!(
            cache = %id,
            layers = layers.len(),
            logging = self.config.logging,
            weak = reference_queue.is_some(),
            "built cache chain"
        );

        Ok(CacheChain {
            cache,
            reference_queue,
        })
    }
}

fn wrap_lru<K, T>(mut chain: Chain<K, T>, layers: &[LayerConfig]) -> Chain<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: 'static,
{
    for layer in layers {
        if let LayerConfig::Lru { capacity } = *layer {
            chain = Box::new(LruCache::with_capacity(chain, capacity));
        }
    }
    chain
}

/// A built chain. Values go in and come out as `Arc<V>`.
pub struct CacheChain<K, V> {
    cache: Chain<K, Arc<V>>,
    reference_queue: Option<ReferenceQueue<K, V>>,
}

impl<K, V> CacheChain<K, V> {
    /// Queue for the host reclaimer; present when the chain has a weak layer.
    pub fn reference_queue(&self) -> Option<ReferenceQueue<K, V>> {
        self.reference_queue.clone()
    }
}

impl<K, V> Cache<K, Arc<V>> for CacheChain<K, V> {
    fn id(&self) -> &str {
        self.cache.id()
    }
    fn size(&mut self) -> usize {
        self.cache.size()
    }
    fn put(&mut self, key: K, value: Arc<V>) {
        self.cache.put(key, value)
    }
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        self.cache.get(key)
    }
    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        self.cache.remove(key)
    }
    fn clear(&mut self) {
        self.cache.clear()
    }
}
