//! Board region selection and square cropping.
//!
//! Given a source image and the board boxes reported by an external board
//! detector, [`RegionLocator`] picks the most confident box, pads it,
//! expands it to a square, clamps it into the image and resamples it to a
//! fixed-size crop. The resulting [`BoardRegion`] keeps everything needed to
//! map crop pixels back into the source frame.
//!
//! ```
//! use fen_vision_core::{NullObserver, Size};
//! use fen_vision_region::{BoardCandidate, RegionLocator, RegionParams};
//!
//! let locator = RegionLocator::new(RegionParams::default());
//! let candidates = [BoardCandidate::new(320.0, 240.0, 300.0, 280.0, Some(0.9))];
//! let region = locator
//!     .locate(Size::new(640.0, 480.0), &candidates, &NullObserver)
//!     .expect("board");
//! assert!(region.rect_in_source.width > 300.0);
//! ```

mod locator;

pub use locator::{
    BoardCandidate, BoardRegion, CroppedBoard, LocateError, NoDetectionCause, RegionLocator,
    RegionParams,
};
