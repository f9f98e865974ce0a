//! High-level facade crate for the `fen-vision-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates (region, position, overlay) and the core types
//! - [`BoardScanner`], which runs the stages end to end against caller-supplied
//!   board and piece detectors
//! - [`LiveScanSession`], a throttled single-flight driver for camera streams
//! - JSON config, detector payload and report helpers in [`io`]
//! - (feature `image`) adapters from `image` buffers in [`detect`]
//!
//! ## Quickstart
//!
//! ```
//! use fen_vision::{BoardScanner, PieceDetection, ScanParams, Size};
//!
//! let scanner = BoardScanner::new(ScanParams::default());
//! let detections = [
//!     PieceDetection::new("white-king", 450.0, 750.0, 70.0, 90.0, Some(0.9)),
//!     PieceDetection::new("black-king", 450.0, 50.0, 70.0, 90.0, Some(0.9)),
//! ];
//! let report = scanner.build_position(&detections, Size::square(800.0));
//! assert_eq!(report.fen, "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
//! assert!(report.validation.ok);
//! ```
//!
//! ## API map
//! - `fen_vision::core`: geometry, pixel buffers, orientation, observers, logging.
//! - `fen_vision::region`: board region selection and square cropping.
//! - `fen_vision::position`: detection filter, square assignment, FEN synthesis and validation.
//! - `fen_vision::overlay`: UCI parsing and move arrow geometry.

pub use fen_vision_core as core;
pub use fen_vision_overlay as overlay;
pub use fen_vision_position as position;
pub use fen_vision_region as region;

pub use fen_vision_core::{
    ImageView, LogObserver, NullObserver, OwnedImage, PipelineEvent, PipelineObserver, Point2,
    RecordingObserver, Size,
};
pub use fen_vision_overlay::{MoveGeometry, UciMove};
pub use fen_vision_position::{PieceDetection, ValidationResult};
pub use fen_vision_region::{BoardCandidate, BoardRegion, CroppedBoard, LocateError};

mod detectors;
pub mod io;
mod live;
mod scanner;

pub use detectors::{BestMoveProvider, BoardRegionDetector, BoxError, EngineResult, PieceDetector};
pub use live::{
    CancelToken, FrameOutcome, LiveScanSession, LiveStatus, LiveUpdate, SkipReason,
    DEFAULT_MIN_INTERVAL,
};
pub use scanner::{BoardScanner, DetectedBoard, PositionReport, ScanError, ScanParams};

#[cfg(feature = "image")]
pub mod detect;
