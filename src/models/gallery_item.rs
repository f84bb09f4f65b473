use std::fmt;

use serde::{Deserialize, Serialize};

/// Section label an item belongs to.
///
/// Items without a label share the `Ungrouped` default group, which keeps
/// group comparisons total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    #[default]
    Ungrouped,
    Labeled(String),
}

impl Group {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::Labeled(label.into())
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Ungrouped => None,
            Self::Labeled(label) => Some(label),
        }
    }

    pub fn is_ungrouped(&self) -> bool {
        matches!(self, Self::Ungrouped)
    }
}

impl From<Option<String>> for Group {
    fn from(label: Option<String>) -> Self {
        label.map_or(Self::Ungrouped, Self::Labeled)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ungrouped => f.write_str("(ungrouped)"),
            Self::Labeled(label) => f.write_str(label),
        }
    }
}

/// An image placed on the gallery wall.
///
/// `width`, `height` and `group` are supplied by the caller. The remaining
/// fields are computed by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Source pixel width.
    pub width: f64,
    /// Source pixel height.
    pub height: f64,
    pub group: Group,
    /// Caller reference carried through the layout untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub aspect_ratio: f64,
    pub thumb_width: f64,
    pub thumb_height: f64,
    pub offset_x: f64,
}

impl GalleryItem {
    /// Create an ungrouped item from source dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            group: Group::Ungrouped,
            src: None,
            aspect_ratio: 0.0,
            thumb_width: 0.0,
            thumb_height: 0.0,
            offset_x: 0.0,
        }
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.group = group;
        self
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Both source dimensions are finite and strictly positive, and so is
    /// their ratio.
    pub fn has_valid_dimensions(&self) -> bool {
        let ratio = self.source_aspect_ratio();
        self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
            && ratio.is_finite()
            && ratio > 0.0
    }

    pub(crate) fn source_aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Asset metadata as recorded by the upload side of the system.
///
/// Only `width`, `height` and `group` matter to the layout; the rest is
/// carried so the caller can map a laid-out tile back to its asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub file_name: String,
    pub content_type: String,
    pub hash: String,
    pub width: u32,
    pub height: u32,
    /// Retrieval reference for the asset bytes.
    pub src: String,
    #[serde(default)]
    pub group: Group,
}

impl From<&AssetRecord> for GalleryItem {
    fn from(record: &AssetRecord) -> Self {
        GalleryItem::new(record.width as f64, record.height as f64)
            .with_group(record.group.clone())
            .with_src(record.src.clone())
    }
}

impl From<AssetRecord> for GalleryItem {
    fn from(record: AssetRecord) -> Self {
        GalleryItem::new(record.width as f64, record.height as f64)
            .with_group(record.group)
            .with_src(record.src)
    }
}
