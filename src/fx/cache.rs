//! TTL cache for provider rate tables

use super::provider::RateTable;
use chrono::{DateTime, Duration, Utc};
use hashbrown::HashMap;
use std::sync::RwLock;

struct CachedTable {
    fetched_at: DateTime<Utc>,
    table: RateTable,
}

/// Time-bounded cache for fetched rate tables
///
/// Keyed by (provider id, base currency). Concurrent estimate calls may
/// race on a miss and fetch twice; that costs a redundant provider call
/// and nothing else, so no coordination beyond the lock is needed.
pub struct RateCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedTable>>,
}

impl RateCache {
    /// Create a cache with the given TTL in hours
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            ttl: Duration::hours(ttl_hours),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache key for a (provider, base) pair
    pub fn key(provider_id: &str, base: &str) -> String {
        format!("{}:{}", provider_id, base)
    }

    /// Get a table if present and not past its TTL
    pub fn get(&self, key: &str) -> Option<RateTable> {
        let entries = self.entries.read().unwrap();
        let cached = entries.get(key)?;
        if Utc::now() - cached.fetched_at > self.ttl {
            return None;
        }
        Some(cached.table.clone())
    }

    /// Store a freshly fetched table
    pub fn put(&self, key: &str, table: RateTable) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.to_string(),
            CachedTable {
                fetched_at: Utc::now(),
                table,
            },
        );
    }

    /// Drop one entry (manual refresh)
    pub fn invalidate(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }

    /// Drop everything
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}
