use fen_vision_core::{OwnedImage, Point2, Rect, Size};
use serde::{Deserialize, Serialize};

/// Where the board lives in the source frame and how it maps to the crop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardRegion {
    /// Size of the image the locator actually ran on.
    pub source_size: Size,
    /// Index of the selected candidate in the input slice.
    pub candidate_index: usize,
    /// Padded candidate box, before square expansion and clamping.
    pub padded_rect: Rect,
    /// Final crop rectangle in source pixels; always inside `source_size`.
    pub rect_in_source: Rect,
    /// Size of the resampled crop.
    pub crop_size: Size,
}

impl BoardRegion {
    /// Map a point in crop pixels back into source pixels.
    pub fn crop_to_source(&self, p: Point2<f32>) -> Point2<f32> {
        let r = &self.rect_in_source;
        Point2::new(
            r.x + p.x * r.width / self.crop_size.width,
            r.y + p.y * r.height / self.crop_size.height,
        )
    }

    /// Map a point in source pixels into crop pixels.
    pub fn source_to_crop(&self, p: Point2<f32>) -> Point2<f32> {
        let r = &self.rect_in_source;
        Point2::new(
            (p.x - r.x) * self.crop_size.width / r.width,
            (p.y - r.y) * self.crop_size.height / r.height,
        )
    }
}

/// A located region together with its resampled pixels.
#[derive(Clone, Debug)]
pub struct CroppedBoard {
    pub region: BoardRegion,
    pub image: OwnedImage,
}
