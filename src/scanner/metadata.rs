//! Metadata extraction for gallery assets.
//!
//! Reads only image headers for dimensions, and hashes file contents so the
//! caller can recognise the same asset later.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use image::ImageReader;
use tracing::{trace, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::models::{AssetRecord, Group};

/// Error state marker for broken image files.
pub const ERROR_DIMENSION: u32 = 0;

/// Returns the MIME type for a supported image extension.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tiff" | "tif" => Some("image/tiff"),
        _ => None,
    }
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extracts image dimensions by reading only the header.
    ///
    /// Returns `(0, 0)` for broken/unreadable files instead of erroring, so a
    /// scan can skip them and carry on.
    pub fn extract_dimensions(path: &Path) -> (u32, u32) {
        trace!("Extracting image dimensions from {:?}", path);

        let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Failed to open image {:?}: {}", path, e);
                return (ERROR_DIMENSION, ERROR_DIMENSION);
            }
        };

        match reader.into_dimensions() {
            Ok((width, height)) => {
                trace!("Got dimensions {}x{} for {:?}", width, height, path);
                (width, height)
            }
            Err(e) => {
                warn!("Failed to read image dimensions for {:?}: {}", path, e);
                (ERROR_DIMENSION, ERROR_DIMENSION)
            }
        }
    }

    /// Hashes the file contents with xxh3, as lowercase hex.
    pub fn content_hash(path: &Path) -> Result<String> {
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut reader = BufReader::new(file);
        let mut hasher = Xxh3::new();
        let mut buffer = [0u8; 64 * 1024];

        loop {
            let read = reader
                .read(&mut buffer)
                .with_context(|| format!("Failed to read {:?}", path))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(format!("{:016x}", hasher.digest()))
    }

    /// Builds the asset record for an image under `root`.
    ///
    /// The group is the image's parent directory relative to `root`; images
    /// directly in `root` are ungrouped.
    pub fn extract_record(root: &Path, path: &Path) -> Result<AssetRecord> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let content_type = content_type_for_extension(ext)
            .with_context(|| format!("Unsupported image type: {:?}", path))?;

        let (width, height) = Self::extract_dimensions(path);
        let hash = Self::content_hash(path)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(AssetRecord {
            file_name,
            content_type: content_type.to_string(),
            hash,
            width,
            height,
            src: path.to_string_lossy().into_owned(),
            group: group_for(root, path),
        })
    }
}

fn group_for(root: &Path, path: &Path) -> Group {
    let relative = path
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .filter(|rel| !rel.as_os_str().is_empty());

    match relative {
        Some(rel) => {
            let label: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Group::Labeled(label.join("/"))
        }
        None => Group::Ungrouped,
    }
}
