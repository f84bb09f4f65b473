//! Property-based invariant tests for the incremental gallery layout.
//!
//! 1. Appending nothing leaves a layout unchanged.
//! 2. A closed row's width is the sum of its item widths.
//! 3. Rows closed inside a group span at least the gallery width.
//! 4. The last row of a group keeps the target height.
//! 5. One heading per group run, except a leading ungrouped run.
//! 6. Offsets are monotonic and sum to the gallery height.
//! 7. Splitting the input across calls gives the same layout.

use gallery_wall::{compute_partial_layout, GalleryItem, GalleryLayout, Group, RowKind};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn item_strategy() -> impl Strategy<Value = GalleryItem> {
    (50u32..=400, 50u32..=400, prop::option::of(0u8..3)).prop_map(|(w, h, g)| {
        GalleryItem::new(w as f64, h as f64)
            .with_group(Group::from(g.map(|g| format!("group-{g}"))))
    })
}

/// Items in contiguous group runs, the way a sorted gallery arrives.
fn run_items_strategy() -> impl Strategy<Value = Vec<GalleryItem>> {
    prop::collection::vec((prop::option::of(0u8..4), 1usize..12), 1..6).prop_flat_map(|runs| {
        let lengths: Vec<usize> = runs.iter().map(|(_, len)| *len).collect();
        let total: usize = lengths.iter().sum();
        prop::collection::vec((50u32..=400, 50u32..=400), total).prop_map(move |dims| {
            let mut items = Vec::with_capacity(dims.len());
            let mut dims = dims.into_iter();
            for (group, len) in &runs {
                let group = Group::from(group.map(|g| format!("group-{g}")));
                for (w, h) in dims.by_ref().take(*len) {
                    items.push(GalleryItem::new(w as f64, h as f64).with_group(group.clone()));
                }
            }
            items
        })
    })
}

fn layout_of(items: Vec<GalleryItem>, width: f64, height: f64) -> GalleryLayout {
    compute_partial_layout(None, items, width, height).expect("valid input must lay out")
}

fn tolerance(width: f64) -> f64 {
    width * 1e-9 + 1e-6
}

/// Content row followed by another content row: the row was stretched.
fn stretched_rows(layout: &GalleryLayout) -> impl Iterator<Item = usize> + '_ {
    let closed = layout.closed_rows().len();
    (0..closed).filter(move |&i| {
        layout.rows[i].is_content()
            && layout.rows.get(i + 1).is_some_and(|next| next.is_content())
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Appending nothing is a no-op
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_append_is_noop(
        items in prop::collection::vec(item_strategy(), 0..40),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);
        let again = compute_partial_layout(Some(layout.clone()), Vec::new(), width, height).unwrap();
        prop_assert_eq!(layout, again);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Row width equals the sum of its item widths
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn closed_row_width_is_item_sum(
        items in prop::collection::vec(item_strategy(), 1..60),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);
        for row in layout.closed_rows().iter().filter(|r| r.is_content()) {
            let sum: f64 = row.items.iter().map(|i| i.thumb_width).sum();
            prop_assert!(
                (row.width - sum).abs() <= tolerance(width),
                "row width {} != item sum {}", row.width, sum
            );
            for item in &row.items {
                prop_assert!((item.thumb_height - row.height).abs() <= 1e-9);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Stretched rows reach the gallery width
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stretched_rows_reach_gallery_width(
        items in run_items_strategy(),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);
        for index in stretched_rows(&layout) {
            let row = &layout.rows[index];
            prop_assert!(
                row.width >= width,
                "row {} width {} below gallery width {}", index, row.width, width
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Last row of a group is left ragged
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn group_last_row_is_not_stretched(
        items in run_items_strategy(),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);
        let closed = layout.closed_rows().len();
        for index in 0..closed {
            let row = &layout.rows[index];
            let ends_group = layout.rows.get(index + 1).is_some_and(|next| next.is_heading());
            if row.is_content() && ends_group {
                prop_assert_eq!(row.height, height);
                prop_assert!(row.width <= width + tolerance(width) || row.items.len() == 1);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. One heading per group run
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn one_heading_per_group_run(
        items in prop::collection::vec(item_strategy(), 1..60),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);

        let content: Vec<&Group> = layout
            .rows
            .iter()
            .filter(|r| r.kind == RowKind::Content)
            .map(|r| &r.group)
            .collect();
        let mut runs = 1 + content.windows(2).filter(|w| w[0] != w[1]).count();
        if content.first().is_some_and(|g| g.is_ungrouped()) {
            runs -= 1;
        }
        prop_assert_eq!(layout.heading_count(), runs);

        for (index, row) in layout.rows.iter().enumerate() {
            if row.is_heading() {
                let next = &layout.rows[index + 1];
                prop_assert!(next.is_content());
                prop_assert_eq!(&next.group, &row.group);
                prop_assert_eq!(next.starting_asset_index, row.starting_asset_index);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Offsets are monotonic and sum to the gallery height
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_monotonic(
        items in prop::collection::vec(item_strategy(), 1..60),
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let layout = layout_of(items, width, height);
        let closed = layout.closed_rows();

        let mut expected_offset = 0.0;
        for row in closed {
            prop_assert!((row.offset_y - expected_offset).abs() <= 1e-6);
            expected_offset += row.height;

            let mut x = 0.0;
            for item in &row.items {
                prop_assert!((item.offset_x - x).abs() <= 1e-6);
                x += item.thumb_width;
            }
        }
        prop_assert!(closed.windows(2).all(|w| w[0].offset_y <= w[1].offset_y));
        prop_assert!((layout.gallery_height - expected_offset).abs() <= 1e-6);

        let starts: Vec<usize> = layout
            .rows
            .iter()
            .filter(|r| r.is_content())
            .map(|r| r.starting_asset_index)
            .collect();
        prop_assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Incremental equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_append_matches_single_call(
        items in prop::collection::vec(item_strategy(), 1..60),
        split in 0usize..60,
        width in 300.0f64..1500.0,
        height in 80.0f64..300.0,
    ) {
        let split = split.min(items.len());
        let whole = layout_of(items.clone(), width, height);

        let first = layout_of(items[..split].to_vec(), width, height);
        let resumed =
            compute_partial_layout(Some(first), items[split..].to_vec(), width, height).unwrap();

        prop_assert_eq!(whole, resumed);
    }
}
