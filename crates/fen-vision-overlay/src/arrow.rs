use std::f32::consts::FRAC_PI_6;

use fen_vision_core::{OwnedImage, Point2};
use serde::{Deserialize, Serialize};

/// Head barb length used by the live overlay, in view points.
pub const DEFAULT_TIP_LENGTH: f32 = 18.0;

/// A straight arrow: shaft from `tail` to `tip` and two head barbs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowShape {
    pub tail: Point2<f32>,
    pub tip: Point2<f32>,
    /// Barb ends, at -30 and +30 degrees from the shaft direction.
    pub barbs: [Point2<f32>; 2],
}

impl ArrowShape {
    pub fn new(tail: Point2<f32>, tip: Point2<f32>, tip_length: f32) -> Self {
        let angle = (tip.y - tail.y).atan2(tip.x - tail.x);
        let barb = |a: f32| Point2::new(tip.x - tip_length * a.cos(), tip.y - tip_length * a.sin());
        Self {
            tail,
            tip,
            barbs: [barb(angle - FRAC_PI_6), barb(angle + FRAC_PI_6)],
        }
    }

    pub fn with_default_tip(tail: Point2<f32>, tip: Point2<f32>) -> Self {
        Self::new(tail, tip, DEFAULT_TIP_LENGTH)
    }

    /// Shaft followed by the two barbs, as line segments.
    pub fn segments(&self) -> [(Point2<f32>, Point2<f32>); 3] {
        [
            (self.tail, self.tip),
            (self.tip, self.barbs[0]),
            (self.tip, self.barbs[1]),
        ]
    }
}

/// Stroke used when burning an arrow into pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub width: f32,
    /// RGB; gray images get the mean of the channels.
    pub color: [u8; 3],
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 6.0,
            color: [255, 59, 48],
        }
    }
}

/// Draw `arrow` onto `image` with round caps.
pub fn draw_arrow(image: &mut OwnedImage, arrow: &ArrowShape, style: &StrokeStyle) {
    for (a, b) in arrow.segments() {
        stroke_segment(image, a, b, style);
    }
}

fn stroke_segment(image: &mut OwnedImage, a: Point2<f32>, b: Point2<f32>, style: &StrokeStyle) {
    let half = style.width.max(1.0) * 0.5;
    let w = image.width as f32;
    let h = image.height as f32;
    let x0 = (a.x.min(b.x) - half).floor().clamp(0.0, w) as usize;
    let x1 = (a.x.max(b.x) + half).ceil().clamp(0.0, w) as usize;
    let y0 = (a.y.min(b.y) - half).floor().clamp(0.0, h) as usize;
    let y1 = (a.y.max(b.y) + half).ceil().clamp(0.0, h) as usize;

    let [r, g, bl] = style.color;
    let gray = ((u16::from(r) + u16::from(g) + u16::from(bl)) / 3) as u8;

    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            if distance_to_segment(p, a, b) > half {
                continue;
            }
            let px = image.pixel_mut(x, y);
            if px.len() >= 3 {
                px[..3].copy_from_slice(&style.color);
            } else if let Some(v) = px.first_mut() {
                *v = gray;
            }
        }
    }
}

fn distance_to_segment(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    let t = if len2 > 0.0 {
        ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn barbs_point_back_at_thirty_degrees() {
        let arrow = ArrowShape::with_default_tip(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0));
        let [b0, b1] = arrow.barbs;
        assert_relative_eq!(b0.x, 100.0 - 18.0 * FRAC_PI_6.cos(), epsilon = 1e-4);
        assert_relative_eq!(b0.y, 9.0, epsilon = 1e-4);
        assert_relative_eq!(b1.y, -9.0, epsilon = 1e-4);
        assert_relative_eq!((b0 - arrow.tip).norm(), 18.0, epsilon = 1e-4);
    }

    #[test]
    fn upward_arrow_barbs_sit_below_the_tip() {
        let arrow = ArrowShape::with_default_tip(Point2::new(50.0, 200.0), Point2::new(50.0, 100.0));
        for b in arrow.barbs {
            assert!(b.y > arrow.tip.y);
        }
    }

    #[test]
    fn drawing_marks_pixels_along_the_shaft() {
        let mut img = OwnedImage::blank(64, 64, 3);
        let arrow = ArrowShape::new(Point2::new(8.0, 32.0), Point2::new(56.0, 32.0), 10.0);
        draw_arrow(&mut img, &arrow, &StrokeStyle::default());
        assert_eq!(img.view().pixel(30, 32), &[255u8, 59, 48]);
        assert_eq!(img.view().pixel(30, 5), &[0u8, 0, 0]);
    }

    #[test]
    fn drawing_clips_to_the_image() {
        let mut img = OwnedImage::blank(16, 16, 1);
        let arrow = ArrowShape::with_default_tip(Point2::new(-40.0, 8.0), Point2::new(60.0, 8.0));
        draw_arrow(&mut img, &arrow, &StrokeStyle::default());
        assert_eq!(img.view().pixel(8, 8), &[120u8]);
    }
}
