//! Time-bounded response cache for the geodata proxy

use std::time::{Duration, Instant};

use hashbrown::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Keyed cache whose entries expire after a fixed TTL.
///
/// When full, expired entries are dropped first, then the oldest one.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
            ttl,
            capacity,
        }
    }

    /// Returns a fresh entry, if any
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: String, value: V) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.write().await;
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

            if entries.len() >= self.capacity
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(60), 4);
        cache.insert("q".to_string(), 7).await;

        assert_eq!(cache.get("q").await, Some(7));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = TtlCache::new(Duration::ZERO, 4);
        cache.insert("q".to_string(), 7).await;

        assert_eq!(cache.get("q").await, None);
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), 1).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        cache.insert("b".to_string(), 2).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        cache.insert("c".to_string(), 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn zero_capacity_stores_nothing() {
        let cache = TtlCache::new(Duration::from_secs(60), 0);
        cache.insert("q".to_string(), 1).await;
        assert_eq!(cache.len().await, 0);
    }
}
