use std::path::Path;

use fen_vision_core::{normalize_orientation, ImageView, Orientation, OwnedImage};
use fen_vision_overlay::{draw_arrow, MoveGeometry, StrokeStyle};
use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, RgbImage, RgbaImage};

use crate::detectors::{BoardRegionDetector, PieceDetector};
use crate::live::CancelToken;
use crate::scanner::{BoardScanner, DetectedBoard, ScanError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the `image` adapters.
#[derive(thiserror::Error, Debug)]
pub enum ImageAdapterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("pixel buffer does not fit a {width}x{height} image")]
    Buffer { width: usize, height: usize },
}

/// Borrow an `image::RgbImage` as a core view.
pub fn rgb_view(img: &RgbImage) -> ImageView<'_> {
    ImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 3,
        data: img.as_raw(),
    }
}

/// Borrow an `image::GrayImage` as a core view.
pub fn gray_view(img: &GrayImage) -> ImageView<'_> {
    ImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 1,
        data: img.as_raw(),
    }
}

/// Convert any core buffer into an RGB image.
pub fn to_rgb_image(img: &OwnedImage) -> Result<RgbImage, ImageAdapterError> {
    let (w, h) = (img.width as u32, img.height as u32);
    let data = img.data.clone();
    let rgb = match img.channels {
        3 => RgbImage::from_raw(w, h, data),
        1 => GrayImage::from_raw(w, h, data).map(|g| DynamicImage::ImageLuma8(g).to_rgb8()),
        4 => RgbaImage::from_raw(w, h, data).map(|c| DynamicImage::ImageRgba8(c).to_rgb8()),
        _ => None,
    };
    rgb.ok_or(ImageAdapterError::Buffer {
        width: img.width,
        height: img.height,
    })
}

/// Decode an image file and rotate it upright using its EXIF orientation.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn decode_oriented(path: impl AsRef<Path>) -> Result<RgbImage, ImageAdapterError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;
    let tag = decoder.orientation()?.to_exif();
    let rgb = DynamicImage::from_decoder(decoder)?.to_rgb8();

    let orientation = Orientation::from_exif(u16::from(tag)).unwrap_or_default();
    if orientation == Orientation::Up {
        return Ok(rgb);
    }
    log::debug!("normalizing EXIF orientation {tag}");
    to_rgb_image(&normalize_orientation(&rgb_view(&rgb), orientation))
}

/// Run [`BoardScanner::detect_board`] on an RGB frame.
pub fn scan_rgb(
    scanner: &BoardScanner,
    img: &RgbImage,
    boards: &dyn BoardRegionDetector,
    pieces: &dyn PieceDetector,
    cancel: &CancelToken,
) -> Result<Option<DetectedBoard>, ScanError> {
    scanner.detect_board(&rgb_view(img), boards, pieces, cancel)
}

/// Copy of `crop` with the move arrow burned in.
pub fn annotate_move(
    crop: &OwnedImage,
    geometry: &MoveGeometry,
    style: &StrokeStyle,
) -> Result<RgbImage, ImageAdapterError> {
    let mut canvas = crop.clone();
    draw_arrow(&mut canvas, &geometry.crop_arrow(), style);
    to_rgb_image(&canvas)
}
