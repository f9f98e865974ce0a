//! Square assignment with deterministic collision resolution.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use fen_vision_core::{PipelineEvent, PipelineObserver, Size};
use serde::{Deserialize, Serialize};

use crate::{Color, Piece, PieceDetection, PieceKind, Square};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A parsed detection competing for a square.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceCandidate {
    pub piece: Piece,
    /// Missing confidences count as 0.
    pub confidence: f32,
    pub area: f32,
    pub label: String,
    /// Position of the detection in the assigner input.
    pub index: usize,
}

impl PieceCandidate {
    fn describe(&self) -> String {
        format!(
            "{}[{} c:{:.3} a:{:.0}]",
            self.label,
            self.piece.kind.letter(),
            self.confidence,
            self.area
        )
    }
}

/// Total order used to pick a square's winner; `Greater` means `a` wins.
///
/// Priority (K > Q > R > B = N > P), then confidence, then box area, then
/// the earlier input index.
pub fn compare_candidates(a: &PieceCandidate, b: &PieceCandidate) -> Ordering {
    a.piece
        .kind
        .priority()
        .cmp(&b.piece.kind.priority())
        .then_with(|| a.confidence.total_cmp(&b.confidence))
        .then_with(|| a.area.total_cmp(&b.area))
        .then_with(|| b.index.cmp(&a.index))
}

/// Last square each color's king was seen on, winner or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingTargets {
    pub white: Option<Square>,
    pub black: Option<Square>,
}

impl KingTargets {
    pub fn get(&self, color: Color) -> Option<Square> {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn record(&mut self, color: Color, square: Square) {
        match color {
            Color::White => self.white = Some(square),
            Color::Black => self.black = Some(square),
        }
    }
}

/// A square claimed by more than one detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub square: Square,
    /// All contenders in input order.
    pub contenders: Vec<PieceCandidate>,
    /// Input index of the winner.
    pub winner: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SquareAssignment {
    pub winners: BTreeMap<Square, PieceCandidate>,
    pub king_targets: KingTargets,
    pub collisions: Vec<Collision>,
}

impl SquareAssignment {
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.winners.get(&square).map(|c| c.piece)
    }
}

/// Map detections to squares and keep one winner per square.
///
/// Unparseable labels are skipped and reported as
/// [`PipelineEvent::LabelIgnored`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(detections = detections.len()))
)]
pub fn assign_squares(
    detections: &[PieceDetection],
    crop_size: Size,
    observer: &dyn PipelineObserver,
) -> SquareAssignment {
    let mut by_square: BTreeMap<Square, Vec<PieceCandidate>> = BTreeMap::new();
    let mut king_targets = KingTargets::default();

    for (index, det) in detections.iter().enumerate() {
        let Some(piece) = Piece::parse_label(&det.label) else {
            observer.on_event(&PipelineEvent::LabelIgnored {
                label: det.label.clone(),
            });
            continue;
        };
        let square = Square::from_crop_point(det.x, det.y, crop_size);
        if piece.kind == PieceKind::King {
            log::debug!(
                "{} center ({:.0},{:.0}) -> {square}",
                det.label,
                det.x,
                det.y
            );
            king_targets.record(piece.color, square);
        }
        by_square.entry(square).or_default().push(PieceCandidate {
            piece,
            confidence: det.confidence.unwrap_or(0.0),
            area: det.area(),
            label: det.label.clone(),
            index,
        });
    }

    let mut winners = BTreeMap::new();
    let mut collisions = Vec::new();
    for (square, contenders) in by_square {
        let Some(best) = contenders.iter().max_by(|a, b| compare_candidates(a, b)) else {
            continue;
        };
        let best = best.clone();
        if contenders.len() > 1 {
            observer.on_event(&PipelineEvent::CollisionResolved {
                square: square.name(),
                winner: format!("{} -> {}", best.label, best.piece.fen_char()),
                contenders: contenders.iter().map(PieceCandidate::describe).collect(),
            });
            collisions.push(Collision {
                square,
                winner: best.index,
                contenders,
            });
        }
        winners.insert(square, best);
    }

    SquareAssignment {
        winners,
        king_targets,
        collisions,
    }
}
