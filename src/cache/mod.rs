//! 查询结果缓存模块：语句指纹与可组合的淘汰策略装饰器。
//!
//! # Query Result Caching Module
//!
//! This module answers one question for the execution engine: do we already
//! have a result for this exact statement, parameter set and paging window?
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKey`] | Order-sensitive fingerprint used as the lookup key |
//! | [`QueryKeyBuilder`] | Builds a statement's fingerprint in a fixed order |
//! | [`Cache`] | Capability every store and decorator implements |
//! | [`MemoryCache`] | Unbounded in-memory base store |
//! | [`LruCache`] | Capacity-bounded least-recently-used eviction |
//! | [`WeakCache`] | Weak-reference retention with a pin ring |
//! | [`LoggingCache`] | Hit-ratio statistics |
//! | [`CacheBuilder`] | Assembles a chain from [`CacheConfig`] |
//!
//! ## Example
//!
//! ```rust
//! use sqlmap_cache::cache::{Cache, CacheBuilder, CacheKey, QueryKeyBuilder};
//! use std::sync::Arc;
//!
//! // Weak -> LRU -> base store
//! let mut cache = CacheBuilder::new("UserMapper")
//!     .lru(1024)
//!     .weak(256)
//!     .build::<CacheKey, Vec<String>>()
//!     .unwrap();
//!
//! let key = QueryKeyBuilder::new("UserMapper.selectByName")
//!     .with_sql("select name from users where name = ?")
//!     .with_param("ada")
//!     .build();
//!
//! let rows = Arc::new(vec!["ada".to_string()]);
//! if cache.get(&key).is_none() {
//!     cache.put(key.clone(), Arc::clone(&rows));
//! }
//! assert_eq!(cache.get(&key), Some(rows));
//! ```
//!
//! ## Decorator Order
//!
//! Decorators only see their own delegate. An LRU layer inside the weak
//! layer tracks puts and lookups of weak handles; outside it, it tracks
//! lookups of live values only, because a reclaimed value never reaches it.

mod backend;
mod builder;
mod config;
mod decorators;
mod key;
mod part;
mod query;
mod reference;

pub use backend::{Cache, MemoryCache};
pub use builder::{CacheBuilder, CacheChain};
pub use config::{CacheConfig, LayerConfig};
pub use decorators::{
    CacheStats, LoggingCache, LruCache, WeakCache, DEFAULT_LRU_CAPACITY, DEFAULT_PIN_COUNT,
};
pub use key::{CacheKey, NULL_CACHE_KEY};
pub use part::KeyPart;
pub use query::QueryKeyBuilder;
pub use reference::{ReferenceQueue, WeakEntry};
