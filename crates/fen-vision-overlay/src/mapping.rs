//! The three coordinate spaces a move indicator passes through.
//!
//! * crop: the square board crop, top-left origin, rank 8 at the top;
//! * source: the full frame the crop was cut from;
//! * view: the on-screen surface showing the source with aspect-fill.
//!
//! Each hop is a separate function so that a mapping bug shows up in
//! exactly one place.

use fen_vision_core::{Point2, Rect, Size};
use fen_vision_position::Square;
use serde::{Deserialize, Serialize};

/// Center of `square` in crop pixels.
pub fn square_center(square: Square, crop_size: Size) -> Point2<f32> {
    let side = crop_size.square_side();
    Point2::new(
        (f32::from(square.file()) + 0.5) * side,
        (f32::from(8 - square.rank()) + 0.5) * side,
    )
}

/// Crop pixel cell covered by `square`.
pub fn square_cell(square: Square, crop_size: Size) -> Rect {
    let side = crop_size.square_side();
    Rect::new(
        f32::from(square.file()) * side,
        f32::from(8 - square.rank()) * side,
        side,
        side,
    )
}

/// Crop pixels to source pixels, given where the crop sits in the source.
pub fn map_crop_to_source(p: Point2<f32>, crop_rect_in_source: Rect, crop_size: Size) -> Point2<f32> {
    let r = crop_rect_in_source;
    Point2::new(
        r.x + p.x * (r.width / crop_size.width),
        r.y + p.y * (r.height / crop_size.height),
    )
}

/// Uniform scale and centering offset of an aspect-fill presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AspectFill {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl AspectFill {
    /// `None` when the source is 1 px or less on either axis.
    pub fn new(source_size: Size, view_size: Size) -> Option<Self> {
        if !(source_size.width > 1.0 && source_size.height > 1.0) {
            return None;
        }
        let scale = (view_size.width / source_size.width).max(view_size.height / source_size.height);
        Some(Self {
            scale,
            offset_x: (view_size.width - source_size.width * scale) * 0.5,
            offset_y: (view_size.height - source_size.height * scale) * 0.5,
        })
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            self.offset_x + p.x * self.scale,
            self.offset_y + p.y * self.scale,
        )
    }

    pub fn apply_rect(&self, r: Rect) -> Rect {
        let o = self.apply(r.origin());
        Rect::new(o.x, o.y, r.width * self.scale, r.height * self.scale)
    }
}

/// Source pixels to view points under aspect-fill.
pub fn map_source_to_view(p: Point2<f32>, source_size: Size, view_size: Size) -> Option<Point2<f32>> {
    AspectFill::new(source_size, view_size).map(|fill| fill.apply(p))
}
