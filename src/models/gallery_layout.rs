use serde::{Deserialize, Serialize};

use super::{GalleryItem, GalleryRow};

/// Caller-owned layout state carried between incremental calls.
///
/// Every row except the last is closed. The last row stays open until more
/// items arrive or the layout is finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryLayout {
    pub rows: Vec<GalleryRow>,
    /// Cumulative height of all closed rows.
    pub gallery_height: f64,
    /// Set once the trailing row has been closed; no more items are accepted.
    #[serde(default)]
    pub finished: bool,
}

impl GalleryLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row still accepting items, if any.
    pub fn open_row(&self) -> Option<&GalleryRow> {
        if self.finished {
            None
        } else {
            self.rows.last()
        }
    }

    /// Rows that are positioned and will not change again.
    pub fn closed_rows(&self) -> &[GalleryRow] {
        if self.finished {
            &self.rows
        } else {
            &self.rows[..self.rows.len().saturating_sub(1)]
        }
    }

    /// Total number of items placed so far.
    pub fn item_count(&self) -> usize {
        self.rows
            .iter()
            .rev()
            .find(|row| row.is_content())
            .map_or(0, GalleryRow::next_asset_index)
    }

    pub fn heading_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_heading()).count()
    }

    /// Iterate over every placed item in stream order.
    pub fn items(&self) -> impl Iterator<Item = &GalleryItem> {
        self.rows.iter().flat_map(|row| row.items.iter())
    }
}
