use serde::{Deserialize, Serialize};

use super::error::{LayoutError, LayoutResult};

/// Default height of a group heading row in pixels.
pub const HEADING_HEIGHT: f64 = 45.0;

/// Default cap on pullback probes per row.
pub const MAX_PULLBACK_PROBES: u32 = 64;

/// How a row's leftover width is shared between its items when stretching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StretchDistribution {
    /// Every item gains the same number of pixels.
    #[default]
    Flat,
    /// Items gain width in proportion to their current width.
    Proportional,
}

/// Configuration for the justified gallery layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Width every full row is fitted to (default: 1200)
    pub gallery_width: f64,
    /// Nominal row height before stretching (default: 200)
    pub target_row_height: f64,
    /// Height of group heading rows (default: 45)
    pub heading_height: f64,
    pub stretch_distribution: StretchDistribution,
    /// Also stretch the last row of each group (default: false)
    pub stretch_across_group_boundary: bool,
    /// Probes allowed per row before pullback gives up (default: 64)
    pub max_pullback_probes: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gallery_width: 1200.0,
            target_row_height: 200.0,
            heading_height: HEADING_HEIGHT,
            stretch_distribution: StretchDistribution::Flat,
            stretch_across_group_boundary: false,
            max_pullback_probes: MAX_PULLBACK_PROBES,
        }
    }
}

impl LayoutConfig {
    pub fn new(gallery_width: f64, target_row_height: f64) -> Self {
        Self {
            gallery_width,
            target_row_height,
            ..Default::default()
        }
    }

    pub fn with_heading_height(mut self, height: f64) -> Self {
        self.heading_height = height;
        self
    }

    pub fn with_stretch_distribution(mut self, distribution: StretchDistribution) -> Self {
        self.stretch_distribution = distribution;
        self
    }

    pub fn with_stretch_across_group_boundary(mut self, enabled: bool) -> Self {
        self.stretch_across_group_boundary = enabled;
        self
    }

    pub fn with_max_pullback_probes(mut self, probes: u32) -> Self {
        self.max_pullback_probes = probes;
        self
    }

    pub fn validate(&self) -> LayoutResult<()> {
        check_positive("gallery width", self.gallery_width)?;
        check_positive("target row height", self.target_row_height)?;
        check_positive("heading height", self.heading_height)?;
        if self.max_pullback_probes == 0 {
            return Err(LayoutError::InvalidLayoutParameters {
                reason: "max pullback probes must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn check_positive(name: &str, value: f64) -> LayoutResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::InvalidLayoutParameters {
            reason: format!("{name} must be finite and positive, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LayoutConfig::default();
        assert_eq!(config.heading_height, 45.0);
        assert_eq!(config.stretch_distribution, StretchDistribution::Flat);
        assert!(!config.stretch_across_group_boundary);
        assert_eq!(config.max_pullback_probes, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = LayoutConfig::new(800.0, 150.0)
            .with_heading_height(30.0)
            .with_stretch_distribution(StretchDistribution::Proportional)
            .with_stretch_across_group_boundary(true)
            .with_max_pullback_probes(8);

        assert_eq!(config.gallery_width, 800.0);
        assert_eq!(config.target_row_height, 150.0);
        assert_eq!(config.heading_height, 30.0);
        assert_eq!(config.stretch_distribution, StretchDistribution::Proportional);
        assert!(config.stretch_across_group_boundary);
        assert_eq!(config.max_pullback_probes, 8);
    }

    #[test]
    fn test_config_rejects_bad_dimensions() {
        for (width, height) in [(0.0, 100.0), (-5.0, 100.0), (500.0, 0.0), (f64::NAN, 100.0)] {
            let result = LayoutConfig::new(width, height).validate();
            assert!(
                matches!(result, Err(LayoutError::InvalidLayoutParameters { .. })),
                "expected rejection for {width}x{height}"
            );
        }
    }

    #[test]
    fn test_config_rejects_zero_pullback_cap() {
        let config = LayoutConfig::default().with_max_pullback_probes(0);
        assert!(config.validate().is_err());
    }
}
