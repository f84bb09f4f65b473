use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_64;

use super::config::{LayoutConfig, StretchDistribution};
use super::engine::LayoutEngine;
use super::error::LayoutResult;
use crate::models::{GalleryItem, GalleryLayout, Group};

/// Maximum number of cached layouts to keep in memory.
const MAX_CACHE_ENTRIES: usize = 8;

/// Key for the layout cache.
///
/// Row breaks depend on every layout setting, so the key carries the whole
/// config. Floating-point settings are keyed by their bit patterns rather
/// than bucketed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct CacheKey {
    width_bits: u64,
    height_bits: u64,
    heading_bits: u64,
    distribution: StretchDistribution,
    stretch_across_group_boundary: bool,
    max_pullback_probes: u32,
    list_hash: u64,
}

impl CacheKey {
    pub fn new(config: &LayoutConfig, list_hash: u64) -> Self {
        Self {
            width_bits: config.gallery_width.to_bits(),
            height_bits: config.target_row_height.to_bits(),
            heading_bits: config.heading_height.to_bits(),
            distribution: config.stretch_distribution,
            stretch_across_group_boundary: config.stretch_across_group_boundary,
            max_pullback_probes: config.max_pullback_probes,
            list_hash,
        }
    }
}

/// Appends the bytes that identify `item` for list hashing.
pub(crate) fn encode_item(buf: &mut Vec<u8>, item: &GalleryItem) {
    buf.extend_from_slice(&item.width.to_bits().to_le_bytes());
    buf.extend_from_slice(&item.height.to_bits().to_le_bytes());
    match &item.group {
        Group::Ungrouped => buf.push(0),
        Group::Labeled(label) => {
            buf.push(1);
            buf.extend_from_slice(&(label.len() as u64).to_le_bytes());
            buf.extend_from_slice(label.as_bytes());
        }
    }
}

/// Cache of finished layouts.
///
/// Entries are keyed by the layout config and a list hash. The list hash
/// covers each item's dimensions and group in order, so any change to the item
/// stream misses the cache.
pub struct LayoutCache {
    cache: Mutex<LruCache<CacheKey, GalleryLayout>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computes a fast hash of the item list.
    pub fn compute_list_hash(items: &[GalleryItem]) -> u64 {
        let mut hasher_input = Vec::with_capacity(items.len() * 24);
        for item in items {
            encode_item(&mut hasher_input, item);
        }
        xxh3_64(&hasher_input)
    }

    /// Returns a copy of the cached layout, marking it recently used.
    pub fn get(&self, key: &CacheKey) -> Option<GalleryLayout> {
        self.cache.lock().get(key).cloned()
    }

    /// Stores a layout, evicting the least recently used entry at capacity.
    pub fn set(&self, key: CacheKey, layout: GalleryLayout) {
        if let Some((evicted, _)) = self.cache.lock().push(key, layout) {
            if evicted != key {
                trace!(?evicted, "Evicted cached layout");
            }
        }
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Full-gallery layout computation backed by a [`LayoutCache`].
///
/// Use this when the whole item list is known up front, for example when the
/// gallery width changes and every row has to be laid out again.
pub struct CachedLayoutComputer {
    pub engine: LayoutEngine,
    pub cache: LayoutCache,
}

impl CachedLayoutComputer {
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        Ok(Self {
            engine: LayoutEngine::new(config)?,
            cache: LayoutCache::new(),
        })
    }

    /// Lays out and finishes `items`, reusing a cached result when the same
    /// list was laid out with the same config.
    pub fn compute(&self, items: &[GalleryItem]) -> LayoutResult<GalleryLayout> {
        let key = CacheKey::new(self.engine.config(), LayoutCache::compute_list_hash(items));

        if let Some(layout) = self.cache.get(&key) {
            trace!(items = items.len(), "Layout cache hit");
            return Ok(layout);
        }

        let mut layout = GalleryLayout::new();
        self.engine.extend(&mut layout, items.to_vec())?;
        self.engine.finish(&mut layout);
        debug!(
            items = items.len(),
            rows = layout.rows.len(),
            "Layout cache miss, computed layout"
        );

        self.cache.set(key, layout.clone());
        Ok(layout)
    }

    /// Invalidates the cache, forcing recomputation on next call.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}
