//! Weak-reference retention that cooperates with the host reclaimer.

use crate::cache::backend::Cache;
use crate::cache::reference::{ReferenceQueue, WeakEntry};
use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

pub const DEFAULT_PIN_COUNT: usize = 256;

/// Stores values behind weak handles so the host reclaimer can release them
/// once nobody else owns them.
///
/// A stored value stays available until a [`ReferenceQueue::collect`] pass
/// finds it unowned; callers dropping their copies does not evict anything.
/// The most recently retrieved live values are pinned in a bounded ring so a
/// reclaimer pass does not take them during a burst of reuse. Reclaimed keys
/// are dropped from the delegate whenever the notification queue is drained,
/// which happens at the start of `put`, `get`, `remove`, `size` and `clear`;
/// a lookup that finds a reclaimed handle removes it on the spot.
pub struct WeakCache<C, K, V> {
    delegate: C,
    pins: VecDeque<Arc<V>>,
    pin_count: usize,
    queue: ReferenceQueue<K, V>,
}

impl<C, K, V> WeakCache<C, K, V>
where
    C: Cache<K, WeakEntry<K, V>>,
    K: Eq + Hash + Clone,
{
    pub fn new(delegate: C) -> Self {
        Self::with_pin_count(delegate, DEFAULT_PIN_COUNT)
    }

    pub fn with_pin_count(delegate: C, pin_count: usize) -> Self {
        Self::with_queue(delegate, pin_count, ReferenceQueue::new())
    }

    /// Use an existing queue, e.g. one the host reclaimer already holds.
    pub fn with_queue(delegate: C, pin_count: usize, queue: ReferenceQueue<K, V>) -> Self {
        Self {
            delegate,
            pins: VecDeque::new(),
            pin_count,
            queue,
        }
    }

    pub fn pin_count(&self) -> usize {
        self.pin_count
    }

    /// Applies from the next successful `get` on.
    pub fn set_pin_count(&mut self, pin_count: usize) {
        self.pin_count = pin_count;
    }

    /// Values currently held strongly by the ring.
    pub fn pinned(&self) -> usize {
        self.pins.len()
    }

    /// Handle for the host reclaimer.
    pub fn reference_queue(&self) -> ReferenceQueue<K, V> {
        self.queue.clone()
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    fn remove_reclaimed_items(&mut self) {
        let mut drained = 0usize;
        while let Some(key) = self.queue.poll() {
            self.delegate.remove(&key);
            drained += 1;
        }
        if drained > 0 {
            trace!(cache = %self.delegate.id(), reclaimed = drained, "dropped reclaimed entries");
        }
    }

    fn pin(&mut self, value: Arc<V>) {
        self.pins.push_front(value);
        if self.pins.len() > self.pin_count {
            self.pins.pop_back();
        }
    }
}

impl<C, K, V> Cache<K, Arc<V>> for WeakCache<C, K, V>
where
    C: Cache<K, WeakEntry<K, V>>,
    K: Eq + Hash + Clone,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&mut self) -> usize {
        self.remove_reclaimed_items();
        self.delegate.size()
    }

    fn put(&mut self, key: K, value: Arc<V>) {
        self.remove_reclaimed_items();
        let entry = self.queue.register(key.clone(), value);
        self.delegate.put(key, entry);
    }

    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        self.remove_reclaimed_items();
        let entry = self.delegate.get(key)?;
        match entry.get() {
            Some(value) => {
                self.pin(Arc::clone(&value));
                Some(value)
            }
            None => {
                self.delegate.remove(key);
                None
            }
        }
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        self.remove_reclaimed_items();
        let value = self.delegate.remove(key).and_then(|entry| entry.get());
        self.queue.unregister(key);
        value
    }

    fn clear(&mut self) {
        self.pins.clear();
        self.remove_reclaimed_items();
        self.queue.clear();
        self.delegate.clear();
    }
}
