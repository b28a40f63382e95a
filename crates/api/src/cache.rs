// ABOUTME: In-memory TTL cache of parsed feeds keyed by feed URL.
// ABOUTME: Holds Arc<ParsedFeed> so both data routes share one parse per TTL window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use podcast_feed::ParsedFeed;

#[derive(Clone)]
struct CachedFeed {
    feed: Arc<ParsedFeed>,
    created_at: Instant,
}

/// Thread-safe feed cache. A zero TTL disables it.
#[derive(Default)]
pub struct FeedCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedFeed>>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// The cached feed for `url` if it is younger than the TTL.
    pub fn get(&self, url: &str) -> Option<Arc<ParsedFeed>> {
        if !self.is_enabled() {
            return None;
        }
        self.lock()
            .get(url)
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.feed))
    }

    /// Stores `feed` and drops every expired entry.
    pub fn insert(&self, url: &str, feed: Arc<ParsedFeed>) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        entries.insert(
            url.to_string(),
            CachedFeed {
                feed,
                created_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedFeed>> {
        match self.entries.lock() {
            Ok(locked) => locked,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
