use fen_vision_core::{Point2, Rect};
use serde::{Deserialize, Serialize};

/// One piece box reported by the external piece detector, in crop pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceDetection {
    /// Box center x.
    pub x: f32,
    /// Box center y.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Raw class label, e.g. `w-king` or `b-queen-v2`.
    #[serde(rename = "class")]
    pub label: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl PieceDetection {
    pub fn new(
        label: impl Into<String>,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        confidence: Option<f32>,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: label.into(),
            confidence,
        }
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.x, self.y, self.width, self.height)
    }
}
