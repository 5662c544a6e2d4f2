//! Drives a Weak -> LRU -> base chain the way a mapper execution engine would.
//!
//! Run with `RUST_LOG=sqlmap_cache=trace` to see evictions and hit ratios.

use sqlmap_cache::cache::{Cache, CacheBuilder, CacheConfig, CacheKey, QueryKeyBuilder};
use std::sync::Arc;

type Rows = Vec<(i64, String)>;

fn execute(customer_id: i64) -> Arc<Rows> {
    Arc::new(vec![(customer_id, format!("order-for-{}", customer_id))])
}

fn main() -> sqlmap_cache::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = CacheConfig::from_yaml_str(
        r#"
id: OrderMapper
logging: true
layers:
  - type: lru
    capacity: 4
  - type: weak
    pin_count: 2
"#,
    )?;
    let mut cache = CacheBuilder::from_config(&config).build::<CacheKey, Rows>()?;
    let reclaimer = cache.reference_queue();

    for customer_id in [1, 2, 1, 3, 4, 5, 1, 2] {
        let key = QueryKeyBuilder::new("OrderMapper.selectByCustomer")
            .with_sql("select * from orders where customer_id = ?")
            .with_param(customer_id)
            .build();

        let rows = match cache.get(&key) {
            Some(rows) => {
                println!("hit  customer={} rows={:?}", customer_id, rows);
                rows
            }
            None => {
                let rows = execute(customer_id);
                println!("miss customer={} executing statement", customer_id);
                cache.put(key, Arc::clone(&rows));
                rows
            }
        };
        drop(rows);
    }

    // host reclaimer pass: anything not pinned and not held elsewhere goes
    if let Some(queue) = &reclaimer {
        println!("reclaimer released {} result(s)", queue.collect());
    }

    println!("entries still cached: {}", cache.size());
    Ok(())
}
