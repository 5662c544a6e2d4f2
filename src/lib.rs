//! # sqlmap-cache
//!
//! SQL 映射执行引擎下的查询结果缓存层。
//!
//! Query-result cache layer for SQL-mapping execution engines.
//!
//! ## Overview
//!
//! Given a logical query identity (statement, bound parameters, paging
//! window), the engine builds a [`cache::CacheKey`], asks a decorator chain
//! whether a result already exists, and on a miss executes the statement and
//! stores the result through the same chain.
//!
//! ## Core Philosophy
//!
//! - **Exact Keys**: Fingerprints compare their full update history, never the hash alone
//! - **Reproducible**: Fingerprint hashes do not depend on process state
//! - **Composable**: Eviction policies are independent decorators over one capability
//! - **In-Process**: No I/O, no locking, no background work
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlmap_cache::cache::{Cache, LruCache, MemoryCache, QueryKeyBuilder};
//!
//! let mut cache = LruCache::with_capacity(MemoryCache::new("OrderMapper"), 2);
//!
//! let key = QueryKeyBuilder::new("OrderMapper.selectRecent")
//!     .with_paging(0, 20)
//!     .with_sql("select * from orders order by created_at desc")
//!     .build();
//!
//! cache.put(key.clone(), vec![101u64, 102, 103]);
//! assert_eq!(cache.get(&key), Some(vec![101, 102, 103]));
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Fingerprints, the cache capability, decorators and chain builder |
//! | [`error`] | Error types |

pub mod cache;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
