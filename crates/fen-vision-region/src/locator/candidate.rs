use fen_vision_core::Rect;
use serde::{Deserialize, Serialize};

/// Board box reported by the external board detector, in source pixels.
///
/// Coordinates follow the detector convention: `(x, y)` is the box center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardCandidate {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl BoardCandidate {
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: Option<f32>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Confidence with a missing value read as zero.
    #[inline]
    pub fn score(&self) -> f32 {
        self.confidence.unwrap_or(0.0)
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.x, self.y, self.width, self.height)
    }
}

/// Index of the most confident candidate; the earliest one wins ties.
pub(crate) fn select_best(candidates: &[BoardCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, c) in candidates.iter().enumerate() {
        let score = c.score();
        match best {
            Some((_, s)) if score <= s || score.is_nan() => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
