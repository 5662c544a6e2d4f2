//! The cache capability and the in-memory base store.

use std::collections::HashMap;
use std::hash::Hash;

/// Minimal capability every store and decorator implements.
///
/// Decorators hold one owned delegate and report the delegate's `id` and
/// `size`; policy only lives in `get`/`put`/`remove`/`clear`. Implementations
/// do no internal locking.
pub trait Cache<K, V> {
    /// Identity of the cache chain.
    fn id(&self) -> &str;

    /// Number of entries; takes `&mut self` because some layers clean up
    /// before counting.
    fn size(&mut self) -> usize;

    /// Store `value` under `key`. May evict other entries as a side effect.
    fn put(&mut self, key: K, value: V);

    fn get(&mut self, key: &K) -> Option<V>;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn clear(&mut self);
}

impl<K, V, C> Cache<K, V> for Box<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn id(&self) -> &str {
        (**self).id()
    }
    fn size(&mut self) -> usize {
        (**self).size()
    }
    fn put(&mut self, key: K, value: V) {
        (**self).put(key, value)
    }
    fn get(&mut self, key: &K) -> Option<V> {
        (**self).get(key)
    }
    fn remove(&mut self, key: &K) -> Option<V> {
        (**self).remove(key)
    }
    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Unbounded base store. Never evicts on its own.
#[derive(Debug, Clone)]
pub struct MemoryCache<K, V> {
    id: String,
    entries: HashMap<K, V>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: HashMap::new(),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}

impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn id(&self) -> &str {
        &self.id
    }
    fn size(&mut self) -> usize {
        self.entries.len()
    }
    fn put(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }
    fn get(&mut self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }
    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }
    fn clear(&mut self) {
        self.entries.clear();
    }
}
