use tracing::{debug, trace, warn};

use super::config::{LayoutConfig, StretchDistribution};
use super::error::{LayoutError, LayoutResult};
use crate::models::{GalleryItem, GalleryLayout, GalleryRow, Group};

/// Incremental justified layout engine.
///
/// Each call to [`LayoutEngine::extend`] appends a batch of items to a layout,
/// closing every row that can no longer change and leaving the last row open.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Appends `items` to `layout`.
    ///
    /// # Algorithm
    /// 1. Assign items to rows, breaking on width overflow or group change.
    /// 2. Stretch each closable row towards the gallery width.
    /// 3. Pull the row height back until the width is minimally above target.
    /// 4. Insert a heading row at every group boundary.
    /// 5. Position closed rows and accumulate the gallery height.
    ///
    /// Only the previously open row and the rows created by this call are
    /// touched. On error the layout is left exactly as it was.
    pub fn extend(&self, layout: &mut GalleryLayout, items: Vec<GalleryItem>) -> LayoutResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        if layout.finished {
            return Err(LayoutError::LayoutFinished);
        }
        validate_items(&items, layout.item_count())?;

        let resume = layout.rows.len().saturating_sub(1);
        let preceding_group = layout.rows[..resume]
            .last()
            .map_or(Group::Ungrouped, |row| row.group.clone());
        let mut tail = layout.rows.split_off(resume);
        let saved_tail = tail.clone();
        let mut gallery_height = layout.gallery_height;
        let item_count = items.len();

        match self.layout_tail(&mut tail, items, &preceding_group, &mut gallery_height) {
            Ok(()) => {
                layout.rows.append(&mut tail);
                layout.gallery_height = gallery_height;
                debug!(
                    items = item_count,
                    resume_row = resume,
                    rows = layout.rows.len(),
                    gallery_height = layout.gallery_height,
                    "Extended gallery layout"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Gallery layout call failed, restoring previous state");
                layout.rows.extend(saved_tail);
                Err(e)
            }
        }
    }

    /// Closes the trailing open row so it receives final offsets.
    ///
    /// The row is not stretched. The layout rejects further items afterwards.
    /// Does nothing on an empty or already finished layout.
    pub fn finish(&self, layout: &mut GalleryLayout) {
        if layout.finished || layout.rows.is_empty() {
            return;
        }
        if let Some(row) = layout.rows.last_mut() {
            row.offset_y = layout.gallery_height;
            layout.gallery_height += row.height;
            row.assign_item_offsets();
        }
        layout.finished = true;
        debug!(
            rows = layout.rows.len(),
            gallery_height = layout.gallery_height,
            "Finished gallery layout"
        );
    }

    fn layout_tail(
        &self,
        rows: &mut Vec<GalleryRow>,
        items: Vec<GalleryItem>,
        preceding_group: &Group,
        gallery_height: &mut f64,
    ) -> LayoutResult<()> {
        self.build_rows(rows, items);

        let closable = rows.len() - 1;
        for index in 0..closable {
            if self.is_stretchable(&rows[index], &rows[index + 1]) {
                self.stretch_row(&mut rows[index]);
            }
        }
        for index in 0..closable {
            if self.is_stretchable(&rows[index], &rows[index + 1]) {
                self.pull_back_row(&mut rows[index])?;
            }
        }

        self.insert_headings(rows, preceding_group);
        assign_offsets(rows, gallery_height);
        Ok(())
    }

    /// Assigns items to rows at the target height.
    ///
    /// Resumes the open row left in `rows`, or starts the first row of the
    /// gallery when `rows` is empty.
    fn build_rows(&self, rows: &mut Vec<GalleryRow>, items: Vec<GalleryItem>) {
        let target_height = self.config.target_row_height;
        let gallery_width = self.config.gallery_width;
        let mut current = rows
            .pop()
            .unwrap_or_else(|| GalleryRow::content(0, target_height, Group::Ungrouped));

        for mut item in items {
            let aspect_ratio = item.source_aspect_ratio();
            let computed_width = target_height * aspect_ratio;

            if current.items.is_empty() {
                current.group = item.group.clone();
            } else if current.width + computed_width > gallery_width || current.group != item.group {
                let next = GalleryRow::content(
                    current.next_asset_index(),
                    target_height,
                    item.group.clone(),
                );
                rows.push(std::mem::replace(&mut current, next));
            }

            item.aspect_ratio = aspect_ratio;
            item.thumb_width = computed_width;
            item.thumb_height = target_height;
            current.items.push(item);
            current.width += computed_width;
        }

        rows.push(current);
    }

    fn is_stretchable(&self, row: &GalleryRow, next: &GalleryRow) -> bool {
        self.config.stretch_across_group_boundary || row.group == next.group
    }

    /// Distributes the row's slack over its items, then re-derives a uniform
    /// height from the tallest stretched item.
    fn stretch_row(&self, row: &mut GalleryRow) {
        let gap = self.config.gallery_width - row.width;
        let item_count = row.items.len() as f64;
        let row_width = row.width;
        let mut max_thumb_height = 0.0f64;

        for item in &mut row.items {
            let delta_width = match self.config.stretch_distribution {
                StretchDistribution::Flat => gap / item_count,
                StretchDistribution::Proportional => gap * item.thumb_width / row_width,
            };
            item.thumb_width += delta_width;
            item.thumb_height = item.thumb_width / item.aspect_ratio;
            max_thumb_height = max_thumb_height.max(item.thumb_height);
        }

        row.resize_to_height(max_thumb_height);
        trace!(
            start = row.starting_asset_index,
            height = row.height,
            width = row.width,
            "Stretched row"
        );
    }

    /// Lowers the row height in doubling steps while the width stays at or
    /// above the gallery width, keeping the last height that fit.
    fn pull_back_row(&self, row: &mut GalleryRow) -> LayoutResult<()> {
        let gallery_width = self.config.gallery_width;
        let original_height = row.height;
        let mut previous_height = original_height;
        let mut pullback = 1.0f64;

        for probe in 1..=self.config.max_pullback_probes {
            let height = original_height - pullback;
            if height <= 0.0 {
                // Width at a non-positive height can never reach the target.
                settle_at_or_above(row, previous_height, gallery_width);
                return Ok(());
            }

            row.resize_to_height(height);
            if !height.is_finite() || !row.width.is_finite() {
                break;
            }
            if row.width < gallery_width {
                settle_at_or_above(row, previous_height, gallery_width);
                trace!(
                    start = row.starting_asset_index,
                    probes = probe,
                    height = row.height,
                    width = row.width,
                    "Pulled back row"
                );
                return Ok(());
            }

            previous_height = height;
            pullback *= 2.0;
        }

        Err(LayoutError::LayoutConvergenceFailure {
            starting_asset_index: row.starting_asset_index,
            probes: self.config.max_pullback_probes,
            height: row.height,
        })
    }

    /// Inserts a heading before every row whose group differs from the row
    /// above it. The first row is compared against `preceding_group`.
    fn insert_headings(&self, rows: &mut Vec<GalleryRow>, preceding_group: &Group) {
        let mut index = 0;
        while index < rows.len() {
            let previous = match index {
                0 => preceding_group,
                _ => &rows[index - 1].group,
            };
            if rows[index].group != *previous {
                let heading = GalleryRow::heading(&rows[index], self.config.heading_height);
                rows.insert(index, heading);
                index += 1;
            }
            index += 1;
        }
    }
}

/// Resizes `row` to `height`, then raises the height one ulp at a time while
/// rounding leaves the width just short of `gallery_width`.
fn settle_at_or_above(row: &mut GalleryRow, height: f64, gallery_width: f64) {
    const MAX_NUDGES: u32 = 64;

    row.resize_to_height(height);
    let mut nudges = 0;
    while row.width < gallery_width && nudges < MAX_NUDGES {
        row.resize_to_height(f64::from_bits(row.height.to_bits() + 1));
        nudges += 1;
    }
    if nudges > 0 {
        trace!(nudges, width = row.width, "Nudged row height up to gallery width");
    }
}

/// Positions every row except the last, which stays open.
fn assign_offsets(rows: &mut [GalleryRow], gallery_height: &mut f64) {
    let closable = rows.len().saturating_sub(1);
    for row in &mut rows[..closable] {
        row.offset_y = *gallery_height;
        *gallery_height += row.height;
        row.assign_item_offsets();
    }
}

fn validate_items(items: &[GalleryItem], first_index: usize) -> LayoutResult<()> {
    for (offset, item) in items.iter().enumerate() {
        if !item.has_valid_dimensions() {
            return Err(LayoutError::InvalidItemDimensions {
                index: first_index + offset,
                width: item.width,
                height: item.height,
            });
        }
    }
    Ok(())
}

/// Creates or extends a layout with the default stretch policies.
///
/// An empty `new_items` returns the layout unchanged, or a fresh empty layout
/// when none was supplied.
pub fn compute_partial_layout(
    existing: Option<GalleryLayout>,
    new_items: Vec<GalleryItem>,
    gallery_width: f64,
    target_row_height: f64,
) -> LayoutResult<GalleryLayout> {
    let mut layout = existing.unwrap_or_default();
    if new_items.is_empty() {
        return Ok(layout);
    }

    let engine = LayoutEngine::new(LayoutConfig::new(gallery_width, target_row_height))?;
    engine.extend(&mut layout, new_items)?;
    Ok(layout)
}
