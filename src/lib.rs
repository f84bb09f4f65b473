//! Incremental justified layout for image galleries.
//!
//! Items with fixed aspect ratios are packed into rows that fill a gallery
//! width, split into labelled groups with heading rows, and given final pixel
//! geometry. Layouts grow append-only: rows closed by an earlier call are never
//! revisited.

pub mod layout;
pub mod models;
pub mod scanner;

pub use layout::{
    compute_partial_layout, LayoutConfig, LayoutEngine, LayoutError, LayoutResult, LayoutSession,
    StretchDistribution,
};
pub use models::{AssetRecord, GalleryItem, GalleryLayout, GalleryRow, Group, RowKind};
