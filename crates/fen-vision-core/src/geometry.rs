use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub fn long_side(&self) -> f32 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Side of one board square when this size holds an 8x8 board.
    ///
    /// Only the width is used; crops are square by construction.
    #[inline]
    pub fn square_side(&self) -> f32 {
        self.width / 8.0
    }

    /// The rectangle `[0, width] x [0, height]`.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Axis-aligned rectangle, top-left origin, y pointing down.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from a detector-style center/size box.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn origin(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom.
    /// Negative values shrink.
    pub fn expanded(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
    }

    /// Smallest square with the same center that covers this rectangle.
    pub fn squared(&self) -> Self {
        let side = self.width.max(self.height);
        let c = self.center();
        Self::from_center(c.x, c.y, side, side)
    }

    /// Half-open containment: the left/top edges are inside, the right/bottom edges are not.
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    /// `true` when this rectangle lies entirely inside `bounds`.
    pub fn is_within(&self, bounds: &Rect) -> bool {
        self.min_x() >= bounds.min_x()
            && self.min_y() >= bounds.min_y()
            && self.max_x() <= bounds.max_x()
            && self.max_y() <= bounds.max_y()
    }

    /// One clamping pass: pull the origin inside, push it back so the far
    /// edge fits, cap the size, then pull the origin inside again.
    fn clamp_once(&self, bounds: &Rect) -> Self {
        let mut r = *self;
        if r.min_x() < bounds.min_x() {
            r.x = bounds.min_x();
        }
        if r.min_y() < bounds.min_y() {
            r.y = bounds.min_y();
        }
        if r.max_x() > bounds.max_x() {
            r.x = bounds.max_x() - r.width;
        }
        if r.max_y() > bounds.max_y() {
            r.y = bounds.max_y() - r.height;
        }
        r.width = r.width.min(bounds.width);
        r.height = r.height.min(bounds.height);
        if r.min_x() < bounds.min_x() {
            r.x = bounds.min_x();
        }
        if r.min_y() < bounds.min_y() {
            r.y = bounds.min_y();
        }
        r
    }

    /// Clamp into `bounds` without moving the rectangle's relative placement
    /// more than necessary. A second pass runs if the first leaves it outside.
    pub fn clamped_to(&self, bounds: &Rect) -> Self {
        let once = self.clamp_once(bounds);
        if once.is_within(bounds) {
            once
        } else {
            once.clamp_once(bounds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_center_round_trips_center() {
        let r = Rect::from_center(100.0, 50.0, 40.0, 20.0);
        assert_eq!(r, Rect::new(80.0, 40.0, 40.0, 20.0));
        assert_eq!(r.center(), Point2::new(100.0, 50.0));
    }

    #[test]
    fn squared_keeps_center_and_takes_longer_side() {
        let r = Rect::new(10.0, 10.0, 100.0, 60.0).squared();
        assert_eq!(r.width, 100.0);
        assert_eq!(r.height, 100.0);
        assert_eq!(r.center(), Point2::new(60.0, 40.0));
    }

    #[test]
    fn clamp_shifts_rect_hanging_off_the_origin() {
        let bounds = Size::new(640.0, 480.0).bounds();
        let r = Rect::new(-20.0, -10.0, 200.0, 200.0).clamped_to(&bounds);
        assert_eq!(r, Rect::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn clamp_shifts_rect_hanging_off_the_far_edge() {
        let bounds = Size::new(640.0, 480.0).bounds();
        let r = Rect::new(600.0, 400.0, 100.0, 100.0).clamped_to(&bounds);
        assert_eq!(r, Rect::new(540.0, 380.0, 100.0, 100.0));
    }

    #[test]
    fn clamp_caps_oversized_rect() {
        let bounds = Size::new(640.0, 480.0).bounds();
        let r = Rect::new(-100.0, -100.0, 900.0, 900.0).clamped_to(&bounds);
        assert!(r.is_within(&bounds));
        assert_eq!(r, Rect::new(0.0, 0.0, 640.0, 480.0));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point2::new(0.0, 0.0)));
        assert!(!r.contains(Point2::new(10.0, 5.0)));
        assert!(!r.contains(Point2::new(-0.1, 5.0)));
    }
}
