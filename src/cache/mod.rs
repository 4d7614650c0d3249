//! In-memory image cache keyed by URL string
//!
//! The cache is an injected service: the composition root creates one
//! instance and hands an `Arc<dyn ImageCache>` to every loader that should
//! share it. Nothing here is process-global.
//!
//! # Semantics
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | `get` | Exact string match, no URL normalization |
//! | `put` | Insert or replace, last writer wins |
//! | eviction | None, entries live as long as the cache |
//!
//! Neither operation can fail.

pub mod memory;

pub use memory::{CacheStats, MemoryCache};

use crate::decode::DecodedImage;

/// Storage for decoded images, keyed by the URL string they came from
///
/// Implementations must be safe to call from the UI context and from fetch
/// tasks at the same time.
pub trait ImageCache: Send + Sync {
    /// Look up a decoded image by its exact URL string
    fn get(&self, key: &str) -> Option<DecodedImage>;

    /// Store a decoded image, replacing any previous entry for the key
    fn put(&self, key: &str, image: DecodedImage);
}
