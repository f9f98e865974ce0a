//! Core types and utilities for chess position reconstruction.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete detector, image codec or chess library.

mod geometry;
mod image;
mod logger;
mod observer;
mod orientation;

pub use geometry::{Rect, Size};
pub use image::{
    resample_rect, sample_bilinear, sample_bilinear_u8, ImageBufferError, ImageView, OwnedImage,
};
pub use observer::{
    FilterCounts, LogObserver, NullObserver, PipelineEvent, PipelineObserver, RecordingObserver,
    Rejection,
};
pub use orientation::{downscale_if_needed, normalize_orientation, Orientation};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_for_verbosity};

pub use nalgebra::Point2;
