use serde::{Deserialize, Serialize};

use super::{GalleryItem, Group};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// A row of images.
    Content,
    /// A zero-item row marking the start of a group.
    Heading,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryRow {
    pub kind: RowKind,
    pub items: Vec<GalleryItem>,
    /// Index of the first item of this row in the overall item stream.
    pub starting_asset_index: usize,
    /// Sum of item thumb widths.
    pub width: f64,
    pub height: f64,
    pub offset_y: f64,
    pub group: Group,
}

impl GalleryRow {
    /// An empty content row waiting for items.
    pub fn content(starting_asset_index: usize, height: f64, group: Group) -> Self {
        Self {
            kind: RowKind::Content,
            items: Vec::new(),
            starting_asset_index,
            width: 0.0,
            height,
            offset_y: 0.0,
            group,
        }
    }

    /// A heading row announcing the group of `before`.
    pub fn heading(before: &GalleryRow, height: f64) -> Self {
        Self {
            kind: RowKind::Heading,
            items: Vec::new(),
            starting_asset_index: before.starting_asset_index,
            width: 0.0,
            height,
            offset_y: 0.0,
            group: before.group.clone(),
        }
    }

    pub fn is_heading(&self) -> bool {
        self.kind == RowKind::Heading
    }

    pub fn is_content(&self) -> bool {
        self.kind == RowKind::Content
    }

    /// Index one past the last item of this row in the item stream.
    pub fn next_asset_index(&self) -> usize {
        self.starting_asset_index + self.items.len()
    }

    /// Re-derive every item at a uniform `height`, recomputing the row width.
    pub fn resize_to_height(&mut self, height: f64) {
        self.height = height;
        self.width = 0.0;
        for item in &mut self.items {
            item.thumb_height = height;
            item.thumb_width = height * item.aspect_ratio;
            self.width += item.thumb_width;
        }
    }

    /// Lay items out left to right starting at 0.
    pub(crate) fn assign_item_offsets(&mut self) {
        let mut accumulated = 0.0;
        for item in &mut self.items {
            item.offset_x = accumulated;
            accumulated += item.thumb_width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(ratios: &[f64]) -> GalleryRow {
        let mut row = GalleryRow::content(0, 100.0, Group::Ungrouped);
        for &ratio in ratios {
            let mut item = GalleryItem::new(ratio * 100.0, 100.0);
            item.aspect_ratio = ratio;
            row.items.push(item);
        }
        row
    }

    #[test]
    fn test_resize_to_height() {
        let mut row = row_with(&[2.0, 1.0, 0.5]);
        row.resize_to_height(120.0);

        assert_eq!(row.height, 120.0);
        assert!((row.width - 420.0).abs() < 1e-9);
        for item in &row.items {
            assert_eq!(item.thumb_height, 120.0);
        }
        assert!((row.items[0].thumb_width - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_item_offsets() {
        let mut row = row_with(&[2.0, 1.0, 0.5]);
        row.resize_to_height(100.0);
        row.assign_item_offsets();

        let offsets: Vec<f64> = row.items.iter().map(|i| i.offset_x).collect();
        assert_eq!(offsets, vec![0.0, 200.0, 300.0]);
    }

    #[test]
    fn test_heading_copies_position_and_group() {
        let mut row = GalleryRow::content(7, 100.0, Group::labeled("a"));
        row.items.push(GalleryItem::new(10.0, 10.0));
        let heading = GalleryRow::heading(&row, 45.0);

        assert!(heading.is_heading());
        assert!(heading.items.is_empty());
        assert_eq!(heading.starting_asset_index, 7);
        assert_eq!(heading.group, Group::labeled("a"));
        assert_eq!(heading.height, 45.0);
        assert_eq!(row.next_asset_index(), 8);
    }
}
