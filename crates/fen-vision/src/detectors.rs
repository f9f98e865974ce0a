//! Seams for the external models the pipeline consumes.
//!
//! Board and piece detection and move search are supplied by the caller;
//! the pipeline only sees their outputs.

use fen_vision_core::ImageView;
use fen_vision_position::PieceDetection;
use fen_vision_region::BoardCandidate;
use serde::{Deserialize, Serialize};

/// Error type returned by caller-supplied collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Finds chessboard boxes in a full source frame.
pub trait BoardRegionDetector: Send + Sync {
    /// Candidates in pixels of `image`.
    fn detect_board_regions(&self, image: &ImageView<'_>) -> Result<Vec<BoardCandidate>, BoxError>;
}

/// Finds pieces on a square board crop.
pub trait PieceDetector: Send + Sync {
    /// Detections in pixels of `crop`.
    fn detect_pieces(&self, crop: &ImageView<'_>) -> Result<Vec<PieceDetection>, BoxError>;
}

/// Suggests a move for a position.
pub trait BestMoveProvider: Send + Sync {
    fn best_move(&self, fen: &str) -> Result<EngineResult, BoxError>;
}

/// Engine answer for one position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub uci: String,
    #[serde(default)]
    pub san: Option<String>,
    /// Pawn units from White's point of view.
    #[serde(default)]
    pub evaluation: Option<f64>,
    #[serde(default)]
    pub pv: Option<Vec<String>>,
}

impl EngineResult {
    /// SAN when the engine supplied one, otherwise the raw UCI move.
    pub fn display_move(&self) -> &str {
        match self.san.as_deref() {
            Some(san) if !san.is_empty() => san,
            _ => &self.uci,
        }
    }

    /// Signed evaluation with two decimals, e.g. `+0.35`.
    pub fn evaluation_text(&self) -> Option<String> {
        self.evaluation.map(|e| format!("{e:+.2}"))
    }
}
