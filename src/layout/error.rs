use thiserror::Error;

/// Errors raised by the layout engine.
///
/// A failed call leaves the caller's layout as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("item {index} has invalid dimensions {width}x{height}")]
    InvalidItemDimensions { index: usize, width: f64, height: f64 },

    #[error("invalid layout parameters: {reason}")]
    InvalidLayoutParameters { reason: String },

    #[error(
        "row starting at asset {starting_asset_index} did not converge after {probes} pullback probes (height {height})"
    )]
    LayoutConvergenceFailure {
        starting_asset_index: usize,
        probes: u32,
        height: f64,
    },

    #[error("layout is finished and accepts no more items")]
    LayoutFinished,
}

pub type LayoutResult<T> = Result<T, LayoutError>;
