//! `HashMap`-backed cache guarded by a read/write lock

use crate::cache::ImageCache;
use crate::decode::DecodedImage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::trace;

/// Hit/miss counters for a cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits, 0.0 when nothing was looked up
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

/// Process-lifetime image cache with no eviction
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, DecodedImage>>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached URLs
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check for a key without touching the hit/miss counters
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl ImageCache for MemoryCache {
    fn get(&self, key: &str) -> Option<DecodedImage> {
        // A panic while holding the lock cannot leave a half-written entry,
        // so a poisoned map is still consistent.
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn put(&self, key: &str, image: DecodedImage) {
        trace!("Caching {} ({}x{})", key, image.width(), image.height());
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), image);
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    fn image(side: u32) -> DecodedImage {
        DecodedImage::new(RgbaImage::new(side, side))
    }

    #[test]
    fn get_missing_returns_none() {
        let cache = MemoryCache::new();
        assert!(cache.get("https://cdn.example.com/logos/team42.png").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn put_then_get_returns_same_image() {
        let cache = MemoryCache::new();
        let img = image(4);
        cache.put("https://cdn.example.com/logos/team42.png", img.clone());

        let hit = cache.get("https://cdn.example.com/logos/team42.png").unwrap();
        assert!(hit.same_as(&img));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn keys_are_not_normalized() {
        let cache = MemoryCache::new();
        cache.put("https://cdn.example.com/a.png", image(1));

        assert!(cache.get("https://CDN.example.com/a.png").is_none());
        assert!(cache.get("https://cdn.example.com/a.png?").is_none());
        assert!(cache.contains("https://cdn.example.com/a.png"));
    }

    #[test]
    fn last_writer_wins() {
        let cache = MemoryCache::new();
        let first = image(1);
        let second = image(2);
        cache.put("k", first.clone());
        cache.put("k", second.clone());

        assert_eq!(cache.len(), 1);
        let hit = cache.get("k").unwrap();
        assert!(hit.same_as(&second));
        assert!(!hit.same_as(&first));
    }

    #[test]
    fn concurrent_puts_for_distinct_keys() {
        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        cache.put(&format!("https://cdn/{}/{}.png", i, j), image(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cache.len(), 400);
        assert_eq!(cache.stats().inserts, 400);
    }

    #[test]
    fn hit_ratio() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            inserts: 1,
            entries: 1,
        };
        assert_eq!(stats.hit_ratio(), 0.75);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }
}
