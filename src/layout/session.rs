//! Single-writer handle around a growing gallery layout.
//!
//! A [`LayoutSession`] lets one producer (for example a directory scan that
//! delivers items in batches) extend a layout while other threads read
//! snapshots. Every append holds the lock for the whole engine call, so calls
//! sharing the layout are serialised.

use parking_lot::Mutex;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use super::config::LayoutConfig;
use super::engine::LayoutEngine;
use super::error::{LayoutError, LayoutResult};
use super::layout_cache::{encode_item, CacheKey};
use crate::models::{GalleryItem, GalleryLayout};

struct SessionState {
    layout: GalleryLayout,
    /// Encoded identity of every item appended so far.
    hash_input: Vec<u8>,
}

pub struct LayoutSession {
    engine: LayoutEngine,
    state: Mutex<SessionState>,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        Self::resume(config, GalleryLayout::new(), &[])
    }

    /// Continues a layout produced earlier. `items` must be the items the
    /// layout already holds, in order, so the list hash stays comparable.
    pub fn resume(
        config: LayoutConfig,
        layout: GalleryLayout,
        items: &[GalleryItem],
    ) -> LayoutResult<Self> {
        if items.len() != layout.item_count() {
            return Err(LayoutError::InvalidLayoutParameters {
                reason: format!(
                    "resume got {} items for a layout holding {}",
                    items.len(),
                    layout.item_count()
                ),
            });
        }
        let mut hash_input = Vec::new();
        for item in items {
            encode_item(&mut hash_input, item);
        }
        Ok(Self {
            engine: LayoutEngine::new(config)?,
            state: Mutex::new(SessionState { layout, hash_input }),
        })
    }

    /// Appends a batch and returns the number of closed rows afterwards.
    pub fn append(&self, items: Vec<GalleryItem>) -> LayoutResult<usize> {
        let mut batch_input = Vec::with_capacity(items.len() * 24);
        for item in &items {
            encode_item(&mut batch_input, item);
        }

        let mut state = self.state.lock();
        self.engine.extend(&mut state.layout, items)?;
        state.hash_input.extend_from_slice(&batch_input);

        let closed = state.layout.closed_rows().len();
        debug!(
            closed_rows = closed,
            gallery_height = state.layout.gallery_height,
            "Appended batch to session"
        );
        Ok(closed)
    }

    /// Closes the trailing row and returns the final layout.
    pub fn finish(&self) -> GalleryLayout {
        let mut state = self.state.lock();
        self.engine.finish(&mut state.layout);
        state.layout.clone()
    }

    pub fn snapshot(&self) -> GalleryLayout {
        self.state.lock().layout.clone()
    }

    pub fn gallery_height(&self) -> f64 {
        self.state.lock().layout.gallery_height
    }

    /// Hash of every item appended so far, compatible with
    /// [`LayoutCache::compute_list_hash`](super::LayoutCache::compute_list_hash).
    pub fn list_hash(&self) -> u64 {
        xxh3_64(&self.state.lock().hash_input)
    }

    /// Cache key for the current item list under this session's config.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.engine.config(), self.list_hash())
    }

    pub fn into_layout(self) -> GalleryLayout {
        self.state.into_inner().layout
    }
}
