use fen_vision_core::{Point2, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::mapping::{map_crop_to_source, square_center, AspectFill};
use crate::{ArrowShape, MalformedMove, UciMove};

/// A move's endpoints in crop pixels plus the frames needed to render it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveGeometry {
    pub mv: UciMove,
    pub from_crop: Point2<f32>,
    pub to_crop: Point2<f32>,
    pub source_size: Size,
    pub crop_rect_in_source: Rect,
    pub crop_size: Size,
}

impl MoveGeometry {
    pub fn new(mv: UciMove, source_size: Size, crop_rect_in_source: Rect, crop_size: Size) -> Self {
        Self {
            mv,
            from_crop: square_center(mv.from, crop_size),
            to_crop: square_center(mv.to, crop_size),
            source_size,
            crop_rect_in_source,
            crop_size,
        }
    }

    pub fn from_uci(
        uci: &str,
        source_size: Size,
        crop_rect_in_source: Rect,
        crop_size: Size,
    ) -> Result<Self, MalformedMove> {
        let mv = UciMove::parse(uci)?;
        Ok(Self::new(mv, source_size, crop_rect_in_source, crop_size))
    }

    /// Endpoints in source pixels.
    pub fn in_source(&self) -> (Point2<f32>, Point2<f32>) {
        let map = |p| map_crop_to_source(p, self.crop_rect_in_source, self.crop_size);
        (map(self.from_crop), map(self.to_crop))
    }

    /// Endpoints in view points, or `None` for a degenerate source frame.
    pub fn project(&self, view_size: Size) -> Option<(Point2<f32>, Point2<f32>)> {
        let fill = AspectFill::new(self.source_size, view_size)?;
        let (from, to) = self.in_source();
        Some((fill.apply(from), fill.apply(to)))
    }

    /// Where the board itself lands in the view.
    pub fn board_in_view(&self, view_size: Size) -> Option<Rect> {
        AspectFill::new(self.source_size, view_size)
            .map(|fill| fill.apply_rect(self.crop_rect_in_source))
    }

    /// Arrow in view space with the default head.
    pub fn arrow(&self, view_size: Size) -> Option<ArrowShape> {
        self.project(view_size)
            .map(|(from, to)| ArrowShape::with_default_tip(from, to))
    }

    /// Arrow in crop space, for drawing onto the crop itself.
    pub fn crop_arrow(&self) -> ArrowShape {
        ArrowShape::with_default_tip(self.from_crop, self.to_crop)
    }
}
