use crate::{Rect, Size};

/// Borrowed interleaved 8-bit image (1 = gray, 3 = RGB, 4 = RGBA).
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // row-major, len = w*h*channels
}

/// Owned counterpart of [`ImageView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageBufferError {
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    LengthMismatch { expected: usize, got: usize },
}

fn check_layout(
    width: usize,
    height: usize,
    channels: usize,
    len: usize,
) -> Result<(), ImageBufferError> {
    if !matches!(channels, 1 | 3 | 4) {
        return Err(ImageBufferError::UnsupportedChannels(channels));
    }
    let expected = width * height * channels;
    if len != expected {
        return Err(ImageBufferError::LengthMismatch { expected, got: len });
    }
    Ok(())
}

impl<'a> ImageView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageBufferError> {
        check_layout(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Check that `data` matches the declared dimensions.
    ///
    /// Views built from the public fields skip [`ImageView::new`]; anything
    /// that indexes pixels should call this first.
    pub fn validate(&self) -> Result<(), ImageBufferError> {
        check_layout(self.width, self.height, self.channels, self.data.len())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    #[inline]
    fn get(&self, x: i32, y: i32, c: usize) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.data[(y as usize * self.width + x as usize) * self.channels + c]
    }

    /// Channel values of the pixel at `(x, y)`; panics when out of range.
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }
}

impl OwnedImage {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, ImageBufferError> {
        check_layout(width, height, channels, data.len())?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image filled with zeros.
    pub fn blank(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        }
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let start = (y * self.width + x) * self.channels;
        let end = start + self.channels;
        &mut self.data[start..end]
    }
}

/// Bilinear sample of channel `c`; pixels outside the image read as 0.
#[inline]
pub fn sample_bilinear(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get(x0, y0, c) as f32;
    let p10 = src.get(x0 + 1, y0, c) as f32;
    let p01 = src.get(x0, y0 + 1, c) as f32;
    let p11 = src.get(x0 + 1, y0 + 1, c) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> u8 {
    sample_bilinear(src, x, y, c).clamp(0.0, 255.0).round() as u8
}

/// Resample `rect` (in `src` pixel coordinates) into an `out_w x out_h` image.
///
/// Sample positions are pixel centers, so the output covers the rectangle
/// edge-to-edge. Samples that land outside `src` are clamped to its border.
pub fn resample_rect(src: &ImageView<'_>, rect: Rect, out_w: usize, out_h: usize) -> OwnedImage {
    let mut out = OwnedImage::blank(out_w, out_h, src.channels);
    if out_w == 0 || out_h == 0 || src.width == 0 || src.height == 0 {
        return out;
    }

    let sx = rect.width / out_w as f32;
    let sy = rect.height / out_h as f32;
    let max_x = (src.width - 1) as f32;
    let max_y = (src.height - 1) as f32;

    for v in 0..out_h {
        let y = (rect.y + (v as f32 + 0.5) * sy - 0.5).clamp(0.0, max_y);
        for u in 0..out_w {
            let x = (rect.x + (u as f32 + 0.5) * sx - 0.5).clamp(0.0, max_x);
            let px = out.pixel_mut(u, v);
            for (c, value) in px.iter_mut().enumerate() {
                *value = sample_bilinear_u8(src, x, y, c);
            }
        }
    }
    out
}
