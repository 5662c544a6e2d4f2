//! Weak handles and the reclamation notification queue.
//!
//! Values enter the weak tier as `Arc<V>`. The delegate only stores a
//! [`Weak`] to them, while the queue's registration table keeps one strong
//! owner per key until the host reclaimer runs. [`ReferenceQueue::collect`]
//! is that reclaimer pass: every registration nobody else owns (no caller,
//! no pin ring) is released and its key reported for the cache to poll.
//! Dropping the last outside `Arc` therefore never loses a value on its own.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A weak handle tagged with the key it was stored under.
pub struct WeakEntry<K, V> {
    key: K,
    referent: Weak<V>,
}

impl<K, V> WeakEntry<K, V> {
    pub fn new(key: K, value: &Arc<V>) -> Self {
        Self {
            key,
            referent: Arc::downgrade(value),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// The value, if it has not been reclaimed.
    pub fn get(&self) -> Option<Arc<V>> {
        self.referent.upgrade()
    }

    pub fn is_reclaimed(&self) -> bool {
        self.referent.strong_count() == 0
    }
}

impl<K: Clone, V> Clone for WeakEntry<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            referent: self.referent.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for WeakEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEntry")
            .field("key", &self.key)
            .field("reclaimed", &self.is_reclaimed())
            .finish()
    }
}

struct QueueState<K, V> {
    /// Latest value per key, owned until released by `collect`; a newer
    /// registration replaces the older one.
    registered: HashMap<K, Arc<V>>,
    pending: VecDeque<K>,
}

/// Shared handle to a reclamation notification queue.
///
/// Cloning yields another handle to the same queue, so the cache and the
/// host reclaimer can each hold one.
pub struct ReferenceQueue<K, V> {
    state: Arc<Mutex<QueueState<K, V>>>,
}

impl<K, V> Clone for ReferenceQueue<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V> ReferenceQueue<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                registered: HashMap::new(),
                pending: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<K, V>> {
        // bookkeeping only; a panic elsewhere leaves it consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wrap `value` in a weak handle and register it for notification.
    ///
    /// The queue holds `value` until a `collect` pass finds it unowned.
    pub fn register(&self, key: K, value: Arc<V>) -> WeakEntry<K, V> {
        let entry = WeakEntry::new(key, &value);
        self.lock().registered.insert(entry.key.clone(), value);
        entry
    }

    /// Drop the registration for `key` without reporting it.
    pub fn unregister(&self, key: &K) -> Option<Arc<V>> {
        self.lock().registered.remove(key)
    }

    /// Drop every registration and pending report.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.registered.clear();
        st.pending.clear();
    }

    /// Reclaimer pass: release every registration whose value has no owner
    /// besides the queue and report its key. Returns the number of newly
    /// reported keys.
    pub fn collect(&self) -> usize {
        let mut st = self.lock();
        let reclaimed: Vec<K> = st
            .registered
            .iter()
            .filter(|(_, value)| Arc::strong_count(value) == 1)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &reclaimed {
            st.registered.remove(key);
        }
        st.pending.extend(reclaimed.iter().cloned());
        reclaimed.len()
    }

    /// Next reported key, if any.
    pub fn poll(&self) -> Option<K> {
        self.lock().pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn registered(&self) -> usize {
        self.lock().registered.len()
    }
}

impl<K, V> Default for ReferenceQueue<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ReferenceQueue<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceQueue").finish_non_exhaustive()
    }
}
