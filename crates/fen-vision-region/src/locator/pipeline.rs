use super::candidate::select_best;
use super::{BoardCandidate, BoardRegion, CroppedBoard, LocateError, NoDetectionCause, RegionParams};
use fen_vision_core::{
    resample_rect, ImageView, OwnedImage, PipelineEvent, PipelineObserver, Rect, Size,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Picks, pads, squares and clamps a board box, then crops it.
#[derive(Clone, Debug, Default)]
pub struct RegionLocator {
    params: RegionParams,
}

impl RegionLocator {
    pub fn new(params: RegionParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Compute the board region without touching pixels.
    ///
    /// `source_size` must be the size of the image the candidates were
    /// detected on; inverse mapping is only correct in that frame.
    pub fn locate(
        &self,
        source_size: Size,
        candidates: &[BoardCandidate],
        observer: &dyn PipelineObserver,
    ) -> Result<BoardRegion, LocateError> {
        if self.params.output_size == 0 {
            observer.on_event(&PipelineEvent::RegionRejected {
                reason: LocateError::EmptyOutput.to_string(),
            });
            return Err(LocateError::EmptyOutput);
        }
        let Some(index) = select_best(candidates) else {
            return Err(self.reject(NoDetectionCause::NoCandidates, observer));
        };
        let best = &candidates[index];

        let (padded, shaped) = self.shape(best);
        let rect = shaped.clamped_to(&source_size.bounds());

        let min = self.params.min_side_px;
        // Written so NaN sides are rejected too.
        if !(rect.width > min && rect.height > min) {
            let cause = NoDetectionCause::Degenerate {
                width: rect.width,
                height: rect.height,
            };
            return Err(self.reject(cause, observer));
        }

        observer.on_event(&PipelineEvent::RegionSelected {
            candidate_index: index,
            confidence: best.score(),
            rect_in_source: rect,
        });

        Ok(BoardRegion {
            source_size,
            candidate_index: index,
            padded_rect: padded,
            rect_in_source: rect,
            crop_size: Size::square(self.params.output_size as f32),
        })
    }

    /// Resample an already located region into the fixed-size crop.
    pub fn crop(&self, image: &ImageView<'_>, region: &BoardRegion) -> OwnedImage {
        let side = self.params.output_size as usize;
        let r = region.rect_in_source;
        log::debug!(
            "cropping [{:.1}, {:.1}, {:.1}x{:.1}] -> {side}x{side}",
            r.x,
            r.y,
            r.width,
            r.height
        );
        resample_rect(image, r, side, side)
    }

    /// Locate the board in `image` and produce the square crop.
    ///
    /// A view whose buffer does not match its dimensions is rejected with
    /// [`LocateError::InvalidImage`] before any pixel is read.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image, candidates, observer),
            fields(width = image.width, height = image.height, candidates = candidates.len())
        )
    )]
    pub fn locate_and_crop(
        &self,
        image: &ImageView<'_>,
        candidates: &[BoardCandidate],
        observer: &dyn PipelineObserver,
    ) -> Result<CroppedBoard, LocateError> {
        image.validate()?;
        let region = self.locate(image.size(), candidates, observer)?;
        let image = self.crop(image, &region);
        Ok(CroppedBoard { region, image })
    }

    /// Padded box and the (optionally squared) rectangle derived from it.
    fn shape(&self, candidate: &BoardCandidate) -> (Rect, Rect) {
        let b = candidate.rect();
        let padded = b.expanded(b.width * self.params.pad_frac, b.height * self.params.pad_frac);
        let shaped = if self.params.enforce_square {
            padded.squared()
        } else {
            padded
        };
        (padded, shaped)
    }

    fn reject(&self, cause: NoDetectionCause, observer: &dyn PipelineObserver) -> LocateError {
        observer.on_event(&PipelineEvent::RegionRejected {
            reason: cause.to_string(),
        });
        LocateError::NoDetection(cause)
    }
}
