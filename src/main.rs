use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use gallery_wall::scanner::{FileScanner, ScanConfig, ScanEvent};
use gallery_wall::{GalleryItem, GalleryLayout, LayoutConfig, LayoutSession, StretchDistribution};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Full layout as JSON
    Json,
    /// One line per row
    Summary,
}

#[derive(Parser)]
#[command(name = "gallery-wall")]
#[command(about = "Lay out an image directory as a justified gallery wall", long_about = None)]
struct Cli {
    /// Directory to scan for images
    dir: PathBuf,

    /// Gallery width in pixels
    #[arg(short, long, default_value = "1200")]
    width: f64,

    /// Target row height in pixels
    #[arg(short = 'r', long, default_value = "200")]
    row_height: f64,

    /// Height of group heading rows
    #[arg(long, default_value = "45")]
    heading_height: f64,

    /// Share row slack in proportion to item width instead of equally
    #[arg(long)]
    proportional: bool,

    /// Also stretch the last row of every group
    #[arg(long)]
    stretch_group_ends: bool,

    /// Pullback probes allowed per row
    #[arg(long, default_value = "64")]
    max_probes: u32,

    /// Images per layout batch
    #[arg(short, long, default_value = "100")]
    batch_size: usize,

    /// Only scan the top-level directory
    #[arg(long)]
    no_recursive: bool,

    #[arg(short, long, value_enum, default_value = "summary")]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn layout_config(&self) -> LayoutConfig {
        let distribution = if self.proportional {
            StretchDistribution::Proportional
        } else {
            StretchDistribution::Flat
        };
        LayoutConfig::new(self.width, self.row_height)
            .with_heading_height(self.heading_height)
            .with_stretch_distribution(distribution)
            .with_stretch_across_group_boundary(self.stretch_group_ends)
            .with_max_pullback_probes(self.max_probes)
    }

    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            recursive: !self.no_recursive,
            batch_size: self.batch_size,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "gallery_wall=debug"
    } else {
        "gallery_wall=info"
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?),
        )
        .init();

    let session = LayoutSession::new(cli.layout_config()).context("Invalid layout options")?;
    let scanner = FileScanner::with_config(cli.scan_config());
    let (mut events, handle) = scanner.scan_with_progress(cli.dir.clone());

    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::Discovered { count } => info!("Laying out {} images", count),
            ScanEvent::Batch(records) => {
                let items: Vec<GalleryItem> = records.into_iter().map(GalleryItem::from).collect();
                let closed = session.append(items).context("Layout failed")?;
                info!(
                    closed_rows = closed,
                    gallery_height = session.gallery_height(),
                    "Layout extended"
                );
            }
            ScanEvent::Skipped { path, reason } => warn!("Skipped {:?}: {}", path, reason),
        }
    }

    let result = handle.await.context("Scan task panicked")??;
    let layout = session.finish();
    info!(
        "Laid out {} of {} images in {} rows, {}px tall",
        result.accepted,
        result.total_files,
        layout.rows.len(),
        layout.gallery_height
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &layout)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => write_summary(&mut out, &layout)?,
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, layout: &GalleryLayout) -> io::Result<()> {
    for row in &layout.rows {
        if row.is_heading() {
            writeln!(out, "{:>8.1}  == {} ==", row.offset_y, row.group)?;
        } else {
            writeln!(
                out,
                "{:>8.1}  {:>3} items  {:>7.1} x {:>6.1}  from #{}",
                row.offset_y,
                row.items.len(),
                row.width,
                row.height,
                row.starting_asset_index
            )?;
        }
    }
    writeln!(out, "total height {:.1}", layout.gallery_height)
}
