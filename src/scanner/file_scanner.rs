//! File scanner that turns an image directory into batches of asset records.
//!
//! - Recursive directory scanning using walkdir
//! - Image type detection by file extension
//! - Header-only dimension probing and content hashing
//! - Batched delivery over a tokio channel so the layout can grow while the
//!   scan is still running

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::AssetRecord;
use crate::scanner::metadata::{content_type_for_extension, MetadataExtractor};

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Number of records per delivered batch.
    pub batch_size: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            batch_size: 100,
            follow_symlinks: false,
        }
    }
}

/// Events sent while scanning.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Discovery finished; `count` images will be probed.
    Discovered { count: usize },
    /// A batch of usable records, in path order.
    Batch(Vec<AssetRecord>),
    /// A file was left out of the gallery.
    Skipped { path: PathBuf, reason: String },
}

/// Result of a completed scan operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Number of image files found.
    pub total_files: usize,
    /// Number of records delivered.
    pub accepted: usize,
    /// Number of files skipped as unreadable.
    pub skipped: usize,
}

pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    /// Creates a new file scanner with default configuration.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Creates a new file scanner with custom configuration.
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans a directory and returns every usable record.
    pub async fn scan(&self, dir: &Path) -> Result<(Vec<AssetRecord>, ScanResult)> {
        let dir = dir.to_path_buf();
        let config = self.config.clone();

        task::spawn_blocking(move || -> Result<(Vec<AssetRecord>, ScanResult)> {
            let mut records = Vec::new();
            let result = Self::scan_sync(&dir, &config, |event| {
                if let ScanEvent::Batch(batch) = event {
                    records.extend(batch);
                }
                true
            })?;
            Ok((records, result))
        })
        .await
        .context("Scan task panicked")?
    }

    /// Scans a directory, delivering events over a channel.
    ///
    /// Returns a receiver for the events and a handle to await the result.
    /// Dropping the receiver stops the scan at the next event.
    pub fn scan_with_progress(
        &self,
        dir: PathBuf,
    ) -> (mpsc::Receiver<ScanEvent>, task::JoinHandle<Result<ScanResult>>) {
        let config = self.config.clone();
        let (tx, rx) = mpsc::channel(16);

        let handle = task::spawn_blocking(move || {
            Self::scan_sync(&dir, &config, |event| tx.blocking_send(event).is_ok())
        });

        let wrapped_handle =
            task::spawn(async move { handle.await.context("Scan task panicked")? });

        (rx, wrapped_handle)
    }

    /// Runs the scan, handing each event to `emit`. The scan stops early,
    /// returning the counts so far, once `emit` returns `false`.
    fn scan_sync(
        dir: &Path,
        config: &ScanConfig,
        mut emit: impl FnMut(ScanEvent) -> bool,
    ) -> Result<ScanResult> {
        info!("Starting scan of {:?}", dir);

        let discovered = Self::discover_files(dir, config)?;
        info!("Discovered {} image files", discovered.len());

        let batch_size = config.batch_size.max(1);
        let mut result = ScanResult {
            total_files: discovered.len(),
            ..Default::default()
        };
        if !emit(ScanEvent::Discovered {
            count: discovered.len(),
        }) {
            info!("Event consumer stopped, ending scan early");
            return Ok(result);
        }
        let mut batch = Vec::with_capacity(batch_size);

        for path in discovered {
            match Self::process_file(dir, &path) {
                Ok(record) => {
                    batch.push(record);
                    result.accepted += 1;
                    if batch.len() >= batch_size {
                        debug!("Delivering batch of {}", batch.len());
                        if !emit(ScanEvent::Batch(std::mem::take(&mut batch))) {
                            info!("Event consumer stopped, ending scan early");
                            return Ok(result);
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping {:?}: {:#}", path, e);
                    result.skipped += 1;
                    if !emit(ScanEvent::Skipped {
                        path,
                        reason: format!("{e:#}"),
                    }) {
                        info!("Event consumer stopped, ending scan early");
                        return Ok(result);
                    }
                }
            }
        }

        if !batch.is_empty() && !emit(ScanEvent::Batch(batch)) {
            info!("Event consumer stopped, ending scan early");
            return Ok(result);
        }

        info!(
            "Scan complete: {} total, {} accepted, {} skipped",
            result.total_files, result.accepted, result.skipped
        );
        Ok(result)
    }

    /// Discovers all image files in a directory, sorted by path.
    fn discover_files(dir: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            anyhow::bail!("Not a directory: {:?}", dir);
        }

        let mut walker = WalkDir::new(dir).follow_links(config.follow_symlinks);
        if !config.recursive {
            walker = walker.max_depth(1);
        } else if config.max_depth > 0 {
            walker = walker.max_depth(config.max_depth);
        }

        let mut entries: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| !entry.file_type().is_dir())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(content_type_for_extension)
                    .is_some()
            })
            .map(|entry| entry.into_path())
            .collect();

        entries.sort();
        Ok(entries)
    }

    /// Probes one file, rejecting images the layout could not place.
    fn process_file(root: &Path, path: &Path) -> Result<AssetRecord> {
        let record = MetadataExtractor::extract_record(root, path)?;
        if record.width == 0 || record.height == 0 {
            anyhow::bail!("unreadable image dimensions");
        }
        Ok(record)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
