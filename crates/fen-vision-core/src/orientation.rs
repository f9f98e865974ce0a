//! Orientation normalization, applied before any board geometry runs.
//!
//! Region coordinates are only meaningful in an upright frame, so camera
//! buffers tagged with an EXIF orientation are rotated/flipped first.

use serde::{Deserialize, Serialize};

use crate::{resample_rect, ImageView, OwnedImage, Rect};

/// EXIF orientation tag values 1..=8.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl Orientation {
    /// Parse the raw EXIF tag; anything outside 1..=8 is `None`.
    pub fn from_exif(tag: u16) -> Option<Self> {
        Some(match tag {
            1 => Self::Up,
            2 => Self::UpMirrored,
            3 => Self::Down,
            4 => Self::DownMirrored,
            5 => Self::LeftMirrored,
            6 => Self::Right,
            7 => Self::RightMirrored,
            8 => Self::Left,
            _ => return None,
        })
    }

    pub fn exif_tag(self) -> u16 {
        match self {
            Self::Up => 1,
            Self::UpMirrored => 2,
            Self::Down => 3,
            Self::DownMirrored => 4,
            Self::LeftMirrored => 5,
            Self::Right => 6,
            Self::RightMirrored => 7,
            Self::Left => 8,
        }
    }

    /// Tags 5..=8 swap width and height.
    pub fn swaps_axes(self) -> bool {
        self.exif_tag() >= 5
    }

    /// Source pixel that lands at upright pixel `(u, v)`.
    fn source_of(self, u: usize, v: usize, src_w: usize, src_h: usize) -> (usize, usize) {
        match self {
            Self::Up => (u, v),
            Self::UpMirrored => (src_w - 1 - u, v),
            Self::Down => (src_w - 1 - u, src_h - 1 - v),
            Self::DownMirrored => (u, src_h - 1 - v),
            Self::LeftMirrored => (v, u),
            Self::Right => (v, src_h - 1 - u),
            Self::RightMirrored => (src_w - 1 - v, src_h - 1 - u),
            Self::Left => (src_w - 1 - v, u),
        }
    }
}

/// Produce an upright copy of `src` given its stored orientation.
pub fn normalize_orientation(src: &ImageView<'_>, orientation: Orientation) -> OwnedImage {
    let (out_w, out_h) = if orientation.swaps_axes() {
        (src.height, src.width)
    } else {
        (src.width, src.height)
    };
    let mut out = OwnedImage::blank(out_w, out_h, src.channels);
    for v in 0..out_h {
        for u in 0..out_w {
            let (x, y) = orientation.source_of(u, v, src.width, src.height);
            out.pixel_mut(u, v).copy_from_slice(src.pixel(x, y));
        }
    }
    out
}

/// Shrink so the long side is at most `max_long_side`, keeping the aspect ratio.
///
/// Returns `None` when the image already fits or its buffer does not match
/// its dimensions. The caller must keep using the returned image's size for
/// region geometry.
pub fn downscale_if_needed(src: &ImageView<'_>, max_long_side: usize) -> Option<OwnedImage> {
    let long_side = src.width.max(src.height);
    if long_side <= max_long_side || long_side == 0 || max_long_side == 0 {
        return None;
    }
    if let Err(err) = src.validate() {
        log::warn!("not downscaling {}x{}: {err}", src.width, src.height);
        return None;
    }
    let scale = max_long_side as f32 / long_side as f32;
    let out_w = ((src.width as f32 * scale).round() as usize).max(1);
    let out_h = ((src.height as f32 * scale).round() as usize).max(1);
    log::debug!(
        "downscaling {}x{} -> {}x{}",
        src.width,
        src.height,
        out_w,
        out_h
    );
    let full = Rect::new(0.0, 0.0, src.width as f32, src.height as f32);
    Some(resample_rect(src, full, out_w, out_h))
}
