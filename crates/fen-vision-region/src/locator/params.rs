use serde::{Deserialize, Serialize};

/// Configuration for the region locator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    /// Padding added on each side, as a fraction of the box width
    /// (horizontally) and height (vertically).
    pub pad_frac: f32,
    /// Grow the padded box to a square around its center.
    pub enforce_square: bool,
    /// Side of the square output crop in pixels; zero is rejected by `locate`.
    pub output_size: u32,
    /// Regions whose clamped width or height is at or below this are rejected.
    pub min_side_px: f32,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            pad_frac: 0.05,
            enforce_square: true,
            output_size: 800,
            min_side_px: 2.0,
        }
    }
}
