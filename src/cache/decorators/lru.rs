//! Capacity-bounded least-recently-used eviction.

use crate::cache::backend::Cache;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

pub const DEFAULT_LRU_CAPACITY: usize = 1024;

type NodeIndex = usize;

const NULL_INDEX: NodeIndex = usize::MAX;

#[derive(Debug)]
struct Node<K> {
    key: K,
    /// Toward the eldest end.
    prev: NodeIndex,
    /// Toward the newest end.
    next: NodeIndex,
}

/// Access-ordered key index: an intrusive doubly linked list threaded through
/// a node arena, plus a map from key to node. Touch and eviction are O(1).
/// Ties between equally old keys resolve by touch sequence.
#[derive(Debug)]
struct RecencyList<K> {
    arena: Vec<Node<K>>,
    free_list: Vec<NodeIndex>,
    map: HashMap<K, NodeIndex>,
    /// Least recently touched.
    head: NodeIndex,
    /// Most recently touched.
    tail: NodeIndex,
}

impl<K> RecencyList<K>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            arena: Vec::new(),
            free_list: Vec::new(),
            map: HashMap::new(),
            head: NULL_INDEX,
            tail: NULL_INDEX,
        }
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Move an already tracked key to the newest end. Untracked keys are ignored.
    fn touch(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&idx) => {
                self.unlink(idx);
                self.push_back(idx);
                true
            }
            None => false,
        }
    }

    /// Track `key` as the newest entry, inserting it if needed.
    fn insert(&mut self, key: K) {
        if self.touch(&key) {
            return;
        }
        let node = Node {
            key: key.clone(),
            prev: NULL_INDEX,
            next: NULL_INDEX,
        };
        let idx = match self.free_list.pop() {
            Some(idx) => {
                self.arena[idx] = node;
                idx
            }
            None => {
                self.arena.push(node);
                self.arena.len() - 1
            }
        };
        self.map.insert(key, idx);
        self.push_back(idx);
    }

    fn pop_eldest(&mut self) -> Option<K> {
        if self.head == NULL_INDEX {
            return None;
        }
        let idx = self.head;
        self.unlink(idx);
        self.free_list.push(idx);
        let key = self.arena[idx].key.clone();
        self.map.remove(&key);
        Some(key)
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.free_list.clear();
        self.map.clear();
        self.head = NULL_INDEX;
        self.tail = NULL_INDEX;
    }

    fn unlink(&mut self, idx: NodeIndex) {
        let (prev, next) = (self.arena[idx].prev, self.arena[idx].next);
        if prev == NULL_INDEX {
            self.head = next;
        } else {
            self.arena[prev].next = next;
        }
        if next == NULL_INDEX {
            self.tail = prev;
        } else {
            self.arena[next].prev = prev;
        }
        self.arena[idx].prev = NULL_INDEX;
        self.arena[idx].next = NULL_INDEX;
    }

    fn push_back(&mut self, idx: NodeIndex) {
        self.arena[idx].prev = self.tail;
        self.arena[idx].next = NULL_INDEX;
        if self.tail == NULL_INDEX {
            self.head = idx;
        } else {
            self.arena[self.tail].next = idx;
        }
        self.tail = idx;
    }

    #[cfg(test)]
    fn keys_eldest_first(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while cursor != NULL_INDEX {
            keys.push(self.arena[cursor].key.clone());
            cursor = self.arena[cursor].next;
        }
        keys
    }
}

/// Keeps a bounded hot set of keys over any delegate.
///
/// `put` and `get` touch the key; once more than `capacity` distinct keys are
/// tracked, the least recently touched one is removed from the delegate.
/// `remove` goes straight to the delegate and leaves the key tracked, so a
/// removed key can later be chosen as the eviction victim.
pub struct LruCache<C, K> {
    delegate: C,
    keys: RecencyList<K>,
    capacity: usize,
}

impl<C, K> LruCache<C, K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(delegate: C) -> Self {
        Self::with_capacity(delegate, DEFAULT_LRU_CAPACITY)
    }

    pub fn with_capacity(delegate: C, capacity: usize) -> Self {
        Self {
            delegate,
            keys: RecencyList::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Applies from the next `put` on; at most one key is evicted per `put`.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Number of keys in the recency index, which can include removed keys.
    pub fn tracked(&self) -> usize {
        self.keys.len()
    }

    pub fn is_tracked(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    pub fn delegate(&self) -> &C {
        &self.delegate
    }

    pub fn into_inner(self) -> C {
        self.delegate
    }

    /// Record `key` as newest and return the eldest key once over capacity.
    fn cycle_key_list(&mut self, key: K) -> Option<K> {
        self.keys.insert(key);
        if self.keys.len() > self.capacity {
            self.keys.pop_eldest()
        } else {
            None
        }
    }
}

impl<C, K, V> Cache<K, V> for LruCache<C, K>
where
    C: Cache<K, V>,
    K: Eq + Hash + Clone,
{
    fn id(&self) -> &str {
        self.delegate.id()
    }

    fn size(&mut self) -> usize {
        self.delegate.size()
    }

    fn put(&mut self, key: K, value: V) {
        self.delegate.put(key.clone(), value);
        if let Some(eldest) = self.cycle_key_list(key) {
            trace!(
                cache = %self.delegate.id(),
                capacity = self.capacity,
                "evicting least recently used key"
            );
            self.delegate.remove(&eldest);
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.keys.touch(key);
        self.delegate.get(key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.delegate.remove(key)
    }

    fn clear(&mut self) {
        self.delegate.clear();
        self.keys.clear();
    }
}
