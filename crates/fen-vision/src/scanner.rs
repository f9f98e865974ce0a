use std::sync::Arc;

use fen_vision_core::{
    downscale_if_needed, FilterCounts, ImageView, LogObserver, OwnedImage, PipelineEvent,
    PipelineObserver, Point2, Size,
};
use fen_vision_overlay::{MalformedMove, MoveGeometry};
use fen_vision_position::{
    assign_squares, synthesize, validate_fen, Collision, DetectionFilter, FilterParams,
    KingTargets, PieceDetection, Position, SynthesisParams, ValidationResult,
};
use fen_vision_region::{BoardCandidate, BoardRegion, CroppedBoard, LocateError, RegionLocator, RegionParams};
use serde::{Deserialize, Serialize};

use crate::detectors::{BoardRegionDetector, BoxError, PieceDetector};
use crate::live::CancelToken;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for the whole reconstruction pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub region: RegionParams,
    pub filter: FilterParams,
    pub synthesis: SynthesisParams,
    /// Frames with a longer side are shrunk before detection. `None` keeps
    /// full resolution.
    pub max_long_side: Option<u32>,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            region: RegionParams::default(),
            filter: FilterParams::default(),
            synthesis: SynthesisParams::default(),
            max_long_side: Some(1280),
        }
    }
}

impl ScanParams {
    /// Tighter padding and a narrower edge trim for camera frames, where the
    /// board box is usually snug and pieces sit close to the crop border.
    pub fn live() -> Self {
        let mut params = Self::default();
        params.region.pad_frac = 0.03;
        params.filter.edge_trim_squares = 0.12;
        params
    }
}

/// Failures of an end-to-end scan.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("board detector failed: {0}")]
    BoardDetector(#[source] BoxError),
    #[error("piece detector failed: {0}")]
    PieceDetector(#[source] BoxError),
    #[error("engine failed: {0}")]
    Engine(#[source] BoxError),
    #[error("scan cancelled")]
    Cancelled,
    #[error("another scan is in flight")]
    Busy,
}

/// Position built from one set of piece detections, with diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PositionReport {
    pub fen: String,
    #[serde(skip)]
    pub position: Position,
    pub validation: ValidationResult,
    pub filter: FilterCounts,
    pub collisions: Vec<Collision>,
    pub king_targets: KingTargets,
}

/// Successful end-to-end scan of a frame.
#[derive(Clone, Debug)]
pub struct DetectedBoard {
    pub region: BoardRegion,
    pub crop: OwnedImage,
    pub report: PositionReport,
}

impl DetectedBoard {
    #[inline]
    pub fn fen(&self) -> &str {
        &self.report.fen
    }
}

/// Runs the reconstruction stages with one set of parameters.
#[derive(Clone)]
pub struct BoardScanner {
    params: ScanParams,
    locator: RegionLocator,
    filter: DetectionFilter,
    observer: Arc<dyn PipelineObserver>,
}

impl std::fmt::Debug for BoardScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardScanner")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Default for BoardScanner {
    fn default() -> Self {
        Self::new(ScanParams::default())
    }
}

impl BoardScanner {
    /// Scanner reporting to [`LogObserver`].
    pub fn new(params: ScanParams) -> Self {
        Self {
            locator: RegionLocator::new(params.region.clone()),
            filter: DetectionFilter::new(params.filter.clone()),
            params,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[inline]
    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    #[inline]
    pub fn observer(&self) -> &dyn PipelineObserver {
        self.observer.as_ref()
    }

    pub fn locate_and_crop(
        &self,
        image: &ImageView<'_>,
        candidates: &[BoardCandidate],
    ) -> Result<CroppedBoard, LocateError> {
        self.locator
            .locate_and_crop(image, candidates, self.observer())
    }

    /// Filter, assign, synthesize and validate. `detections` are in pixels
    /// of a crop of `crop_size`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, detections), fields(detections = detections.len()))
    )]
    pub fn build_position(&self, detections: &[PieceDetection], crop_size: Size) -> PositionReport {
        let observer = self.observer();
        let (kept, filter) = self.filter.partition(detections, crop_size);
        observer.on_event(&PipelineEvent::DetectionsFiltered(filter));

        let assignment = assign_squares(&kept, crop_size, observer);
        let position = synthesize(&assignment, &self.params.synthesis, observer);
        let fen = position.fen();
        let validation = validate_fen(&fen, observer);

        PositionReport {
            fen,
            position,
            validation,
            filter,
            collisions: assignment.collisions,
            king_targets: assignment.king_targets,
        }
    }

    pub fn validate(&self, fen: &str) -> ValidationResult {
        validate_fen(fen, self.observer())
    }

    pub fn move_geometry(&self, uci: &str, region: &BoardRegion) -> Result<MoveGeometry, MalformedMove> {
        MoveGeometry::from_uci(uci, region.source_size, region.rect_in_source, region.crop_size)
    }

    /// Move endpoints in view points. `None` for a malformed move or a
    /// degenerate source frame.
    pub fn move_overlay(
        &self,
        uci: &str,
        region: &BoardRegion,
        view_size: Size,
    ) -> Option<(Point2<f32>, Point2<f32>)> {
        match self.move_geometry(uci, region) {
            Ok(geometry) => geometry.project(view_size),
            Err(err) => {
                log::debug!("no overlay for '{uci}': {err}");
                None
            }
        }
    }

    /// Full pass over one upright frame.
    ///
    /// Returns `Ok(None)` when the crop holds no pieces or the synthesized
    /// position does not validate. A malformed `image` fails before either
    /// detector runs. `cancel` is checked between stages.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip_all,
            fields(width = image.width, height = image.height)
        )
    )]
    pub fn detect_board(
        &self,
        image: &ImageView<'_>,
        boards: &dyn BoardRegionDetector,
        pieces: &dyn PieceDetector,
        cancel: &CancelToken,
    ) -> Result<Option<DetectedBoard>, ScanError> {
        image.validate().map_err(LocateError::from)?;
        let shrunk = self
            .params
            .max_long_side
            .and_then(|side| downscale_if_needed(image, side as usize));
        let frame = shrunk.as_ref().map_or(*image, OwnedImage::view);

        let candidates = boards
            .detect_board_regions(&frame)
            .map_err(ScanError::BoardDetector)?;
        cancel.check()?;

        let CroppedBoard { region, image: crop } = self.locate_and_crop(&frame, &candidates)?;
        cancel.check()?;

        let detections = pieces
            .detect_pieces(&crop.view())
            .map_err(ScanError::PieceDetector)?;
        cancel.check()?;
        if detections.is_empty() {
            log::debug!("piece detector returned nothing");
            return Ok(None);
        }

        let report = self.build_position(&detections, region.crop_size);
        if !report.validation.ok {
            return Ok(None);
        }
        Ok(Some(DetectedBoard {
            region,
            crop,
            report,
        }))
    }
}
