use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;

struct CacheEntry {
    embedded: bool,
    expires_at: Instant,
}

/// Bounded cache for live-probe results, keyed by URL.
///
/// Capacity eviction is LRU, freshness is a fixed TTL. Both bounds are
/// approximate by design; the only hard requirement is boundedness. Cheap to
/// clone, shared across requests.
#[derive(Clone)]
pub struct ProbeCache {
    entries: Arc<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Duration,
}

impl ProbeCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn get(&self, url: &str) -> Option<bool> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(url) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.embedded),
            Some(_) => {
                entries.pop(url);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, url: &str, embedded: bool) {
        let entry = CacheEntry {
            embedded,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(url.to_string(), entry);
    }
}
