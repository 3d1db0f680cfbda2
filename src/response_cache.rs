use actix_web::web::Bytes;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::Clock;

pub const DEFAULT_TTL_SECONDS: i64 = 5 * 60;

#[derive(Debug)]
struct CacheEntry {
    payload: Bytes,
    expires_at: DateTime<Utc>,
}

/// Process local memo of serialized responses, keyed by request path and query.
///
/// Every entry expires `ttl` after it was stored. Expired entries are dropped
/// when their key is read and swept out on every insert; once the map holds
/// `capacity` live entries the one closest to expiry is evicted to make room.
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        ResponseCache {
            ttl,
            capacity: capacity.max(1),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.payload.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            tracing::debug!(cache_key = %key, "Dropped expired cache entry");
        }

        None
    }

    pub fn insert(&self, key: String, payload: Bytes) {
        let now = self.clock.now();
        let mut entries = self.lock();

        entries.retain(|_, entry| entry.expires_at > now);

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());

            if let Some(oldest) = oldest {
                tracing::debug!(cache_key = %oldest, "Evicted cache entry, cache is full");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
