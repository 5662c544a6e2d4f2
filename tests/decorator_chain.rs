//! Decorator chains driven the way an execution engine drives them

use sqlmap_cache::cache::{
    Cache, CacheBuilder, CacheKey, LoggingCache, LruCache, MemoryCache, QueryKeyBuilder,
    WeakCache, WeakEntry,
};
use std::sync::Arc;

type Rows = Vec<String>;

fn key(name: &str) -> CacheKey {
    QueryKeyBuilder::new("UserMapper.selectByName")
        .with_sql("select * from users where name = ?")
        .with_param(name)
        .build()
}

fn rows(name: &str) -> Arc<Rows> {
    Arc::new(vec![name.to_string()])
}

/// Look up, and on a miss "execute" and store.
fn query<C: Cache<CacheKey, Arc<Rows>>>(
    cache: &mut C,
    name: &str,
    executions: &mut u32,
) -> Arc<Rows> {
    let k = key(name);
    if let Some(hit) = cache.get(&k) {
        return hit;
    }
    *executions += 1;
    let result = rows(name);
    cache.put(k, Arc::clone(&result));
    result
}

#[test]
fn test_lru_eviction_prefers_least_recently_touched() {
    let mut cache = LruCache::with_capacity(MemoryCache::new("users"), 2);
    cache.put("a", 1);
    cache.put("b", 2);
    cache.get(&"a");
    cache.put("c", 3);

    assert_eq!(cache.get(&"a"), Some(1));
    assert_eq!(cache.get(&"b"), None);
}

#[test]
fn test_lru_remove_bypasses_tracking() {
    let mut cache = LruCache::with_capacity(MemoryCache::new("users"), 2);
    cache.put("a", 1);
    cache.put("b", 2);
    cache.remove(&"a");
    assert!(cache.is_tracked(&"a"));

    // "a" is already gone from the store but still picked as eldest
    cache.put("c", 3);
    assert_eq!(cache.size(), 2);
    assert_eq!(cache.get(&"b"), Some(2));
    assert_eq!(cache.get(&"c"), Some(3));

    // next eviction goes back to real keys
    cache.put("d", 4);
    assert_eq!(cache.get(&"b"), None);
}

#[test]
fn test_engine_flow_through_weak_over_lru() {
    let mut chain = CacheBuilder::new("UserMapper")
        .lru(1024)
        .weak(256)
        .logging(true)
        .build::<CacheKey, Rows>()
        .unwrap();
    let mut executions = 0;

    let first = query(&mut chain, "ada", &mut executions);
    let second = query(&mut chain, "ada", &mut executions);
    assert_eq!(executions, 1);
    assert!(Arc::ptr_eq(&first, &second));

    query(&mut chain, "grace", &mut executions);
    assert_eq!(executions, 2);
    assert_eq!(chain.size(), 2);
}

#[test]
fn test_repeated_queries_execute_once_through_weak_over_lru() {
    let mut chain = CacheBuilder::new("UserMapper")
        .lru(4)
        .weak(256)
        .build::<CacheKey, Rows>()
        .unwrap();
    let mut executions = 0;

    // the engine hands the rows out and forgets them each time
    for _ in 0..5 {
        drop(query(&mut chain, "ada", &mut executions));
    }
    assert_eq!(executions, 1);

    // retrieved rows are pinned, so a reclaimer pass keeps them
    assert_eq!(chain.reference_queue().unwrap().collect(), 0);
    drop(query(&mut chain, "ada", &mut executions));
    assert_eq!(executions, 1);
}

#[test]
fn test_weak_tier_liveness_and_reclamation() {
    // no pinning, and the caller lets go right after storing
    let mut cache: WeakCache<MemoryCache<CacheKey, WeakEntry<CacheKey, Rows>>, _, _> =
        WeakCache::with_pin_count(MemoryCache::new("weak"), 0);
    let k = key("ada");
    cache.put(k.clone(), rows("ada"));

    let hit = cache.get(&k).unwrap();
    assert_eq!(*hit, vec!["ada".to_string()]);
    assert_eq!(cache.pinned(), 0);
    assert_eq!(cache.size(), 1);

    // an outside owner keeps it through a reclaimer pass
    let reclaimer = cache.reference_queue();
    assert_eq!(reclaimer.collect(), 0);
    drop(hit);

    assert_eq!(reclaimer.collect(), 1);
    assert_eq!(reclaimer.pending(), 1);

    assert_eq!(cache.size(), 0);
    assert_eq!(reclaimer.pending(), 0);
    assert_eq!(cache.get(&k), None);
}

#[test]
fn test_pin_ring_releases_oldest() {
    let pin_count = 3usize;
    let mut cache: WeakCache<MemoryCache<u32, WeakEntry<u32, String>>, _, _> =
        WeakCache::with_pin_count(MemoryCache::new("pins"), pin_count);

    for i in 0..=pin_count as u32 {
        let value = Arc::new(format!("row-{}", i));
        cache.put(i, Arc::clone(&value));
        assert!(cache.get(&i).is_some());
    }
    assert_eq!(cache.pinned(), pin_count);

    let reclaimed = cache.reference_queue().collect();
    assert_eq!(reclaimed, 1);
    assert_eq!(cache.get(&0), None);
    for i in 1..=pin_count as u32 {
        assert!(cache.get(&i).is_some(), "key {} should still be pinned", i);
    }
}

#[test]
fn test_decorator_order_changes_recency() {
    // LRU outside the weak tier only ever sees live values
    let weak = WeakCache::with_pin_count(MemoryCache::<u32, WeakEntry<u32, u32>>::new("outer"), 0);
    let mut outer = LruCache::with_capacity(weak, 2);
    let held: Vec<Arc<u32>> = (0..3).map(Arc::new).collect();
    for (i, v) in held.iter().enumerate() {
        outer.put(i as u32, Arc::clone(v));
    }
    assert_eq!(outer.size(), 2);
    assert_eq!(outer.get(&0), None);
    assert_eq!(outer.get(&2).as_deref(), Some(&2));

    // LRU inside the weak tier bounds the handles it stores
    let lru = LruCache::with_capacity(MemoryCache::<u32, WeakEntry<u32, u32>>::new("inner"), 2);
    let mut inner = WeakCache::with_pin_count(lru, 0);
    for (i, v) in held.iter().enumerate() {
        inner.put(i as u32, Arc::clone(v));
    }
    assert_eq!(inner.size(), 2);
    assert_eq!(inner.id(), "inner");
}

#[test]
fn test_logging_decorator_reports_hits() {
    let mut cache = LoggingCache::new(LruCache::with_capacity(MemoryCache::new("logged"), 8));
    let mut executions = 0;
    for name in ["ada", "ada", "grace", "ada"] {
        query(&mut cache, name, &mut executions);
    }
    let stats = cache.stats();
    assert_eq!(executions, 2);
    assert_eq!(stats.requests, 4);
    assert_eq!(stats.hits, 2);
    assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_decorators_are_transparent_for_identity() {
    let mut chain = LoggingCache::new(LruCache::with_capacity(
        MemoryCache::<u32, u32>::new("identity"),
        4,
    ));
    chain.put(1, 1);
    chain.put(2, 2);
    assert_eq!(chain.id(), "identity");
    assert_eq!(chain.size(), 2);
}
