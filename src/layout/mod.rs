pub mod config;
pub mod engine;
pub mod error;
pub mod layout_cache;
pub mod session;

pub use config::{LayoutConfig, StretchDistribution};
pub use engine::{compute_partial_layout, LayoutEngine};
pub use error::{LayoutError, LayoutResult};
pub use layout_cache::{CacheKey, CachedLayoutComputer, LayoutCache};
pub use session::LayoutSession;
