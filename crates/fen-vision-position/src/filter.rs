//! Plausibility filter for raw piece detections.

use fen_vision_core::{FilterCounts, PipelineEvent, PipelineObserver, Rect, Rejection, Size};
use serde::{Deserialize, Serialize};

use crate::{Piece, PieceDetection, PieceKind};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Thresholds for [`DetectionFilter`]. Sizes are in units of one board square.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub min_confidence: f32,
    /// Kings are too important to lose, so they get a lower bar.
    pub min_confidence_king: f32,
    /// Inset from each crop edge, e.g. 0.15 keeps centers in [0.15, 7.85] squares.
    pub edge_trim_squares: f32,
    pub min_size_frac: f32,
    pub max_size_frac: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_confidence: 0.30,
            min_confidence_king: 0.22,
            edge_trim_squares: 0.15,
            min_size_frac: 0.35,
            max_size_frac: 1.60,
        }
    }
}

/// Drops detections that are unlikely to be real on-board pieces.
#[derive(Clone, Debug, Default)]
pub struct DetectionFilter {
    params: FilterParams,
}

impl DetectionFilter {
    pub fn new(params: FilterParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Board area whose detection centers are accepted.
    pub fn interior(&self, crop_size: Size) -> Rect {
        let inset = self.params.edge_trim_squares * crop_size.square_side();
        Rect::new(
            inset,
            inset,
            crop_size.width - 2.0 * inset,
            crop_size.height - 2.0 * inset,
        )
    }

    /// Run the three checks in order: confidence, interior, size.
    pub fn check(&self, det: &PieceDetection, crop_size: Size) -> Result<(), Rejection> {
        let p = &self.params;
        let threshold = if is_king_label(&det.label) {
            p.min_confidence_king
        } else {
            p.min_confidence
        };
        let conf = det.confidence.unwrap_or(0.0);
        if conf.is_nan() || conf < threshold {
            return Err(Rejection::LowConfidence);
        }

        if !self.interior(crop_size).contains(det.center()) {
            return Err(Rejection::OutsideInterior);
        }

        let side = crop_size.square_side();
        let (wf, hf) = (det.width / side, det.height / side);
        if !(wf.min(hf) >= p.min_size_frac && wf.max(hf) <= p.max_size_frac) {
            return Err(Rejection::ImplausibleSize);
        }
        Ok(())
    }

    /// Keep the plausible detections, preserving input order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(detections = detections.len()))
    )]
    pub fn apply(
        &self,
        detections: &[PieceDetection],
        crop_size: Size,
        observer: &dyn PipelineObserver,
    ) -> Vec<PieceDetection> {
        let (kept, counts) = self.partition(detections, crop_size);
        observer.on_event(&PipelineEvent::DetectionsFiltered(counts));
        kept
    }

    /// Like [`apply`](Self::apply) but returns the counts instead of
    /// reporting them.
    pub fn partition(
        &self,
        detections: &[PieceDetection],
        crop_size: Size,
    ) -> (Vec<PieceDetection>, FilterCounts) {
        let mut counts = FilterCounts::default();
        let mut kept = Vec::with_capacity(detections.len());
        for det in detections {
            let outcome = self.check(det, crop_size);
            counts.record(outcome);
            if outcome.is_ok() {
                kept.push(det.clone());
            }
        }
        (kept, counts)
    }
}

fn is_king_label(label: &str) -> bool {
    label.to_ascii_lowercase().contains("-king")
        || Piece::parse_label(label).is_some_and(|p| p.kind == PieceKind::King)
}
