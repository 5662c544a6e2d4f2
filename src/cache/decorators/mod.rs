//! Policy decorators. Each wraps exactly one owned delegate and adds one
//! policy; they stack without knowing each other, and stacking order matters.

mod logging;
mod lru;
mod weak;

pub use logging::{CacheStats, LoggingCache};
pub use lru::{LruCache, DEFAULT_LRU_CAPACITY};
pub use weak::{WeakCache, DEFAULT_PIN_COUNT};
