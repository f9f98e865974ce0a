//! Board, castling and FEN synthesis from a square assignment.

use fen_vision_core::{PipelineEvent, PipelineObserver};
use serde::{Deserialize, Serialize};

use crate::{Color, Piece, PieceKind, Square, SquareAssignment};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// What to do when a color's king was detected but lost every collision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KingRecovery {
    /// Place the king on its target, replacing whatever won that square.
    #[default]
    Overwrite,
    /// Place the king only if its target square ended up empty.
    OnlyEmpty,
    /// Like `Overwrite`, but never replace the other color's only king.
    KeepSoleKings,
    /// Leave the board as assigned.
    Disabled,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    pub king_recovery: KingRecovery,
}

/// Piece placement with at most one piece per square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [Option<Piece>; 64],
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

impl Position {
    pub const fn empty() -> Self {
        Self { board: [None; 64] }
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// Put `piece` on `square`, returning the piece it replaced.
    pub fn set(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.board[square.index()].replace(piece)
    }

    pub fn has_king(&self, color: Color) -> bool {
        self.board
            .iter()
            .flatten()
            .any(|p| *p == Piece::new(color, PieceKind::King))
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.board.iter().filter(|p| **p == Some(piece)).count()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// FEN placement field: rank 8 first, empty runs written as digits.
    pub fn board_string(&self) -> String {
        let mut out = String::with_capacity(71);
        for rank in (1..=8u8).rev() {
            let mut empty = 0u8;
            for file in 0..8u8 {
                let piece = Square::new(file, rank).and_then(|sq| self.piece_at(sq));
                match piece {
                    Some(p) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(p.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 1 {
                out.push('/');
            }
        }
        out
    }

    /// Castling rights implied by placement alone: a king and rook on
    /// their home squares.
    pub fn castling_rights(&self) -> String {
        let mut rights = String::new();
        for (color, rank, [k, q]) in [(Color::White, 1, ['K', 'Q']), (Color::Black, 8, ['k', 'q'])] {
            if !self.is_at(color, PieceKind::King, 4, rank) {
                continue;
            }
            if self.is_at(color, PieceKind::Rook, 7, rank) {
                rights.push(k);
            }
            if self.is_at(color, PieceKind::Rook, 0, rank) {
                rights.push(q);
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    /// Always white; the image carries no turn information.
    pub fn side_to_move(&self) -> Color {
        Color::White
    }

    /// Full FEN: `<board> w <castling> - 0 1`.
    pub fn fen(&self) -> String {
        let side = match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {side} {} - 0 1", self.board_string(), self.castling_rights())
    }

    fn is_at(&self, color: Color, kind: PieceKind, file: u8, rank: u8) -> bool {
        Square::new(file, rank).and_then(|sq| self.piece_at(sq)) == Some(Piece::new(color, kind))
    }
}

/// Build a position from collision winners, recovering lost kings.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn synthesize(
    assignment: &SquareAssignment,
    params: &SynthesisParams,
    observer: &dyn PipelineObserver,
) -> Position {
    let mut position = Position::empty();
    for (square, cand) in &assignment.winners {
        position.set(*square, cand.piece);
    }

    // Both presence checks see the board before any king is forced in.
    let colors = [Color::White, Color::Black];
    let had_king = colors.map(|color| position.has_king(color));
    for (color, present) in colors.into_iter().zip(had_king) {
        if !present {
            recover_king(&mut position, assignment, color, params.king_recovery, observer);
        }
    }

    let fen = position.fen();
    for color in [Color::White, Color::Black] {
        if !position.has_king(color) {
            log::warn!("board is missing the {color:?} king: {fen}");
        }
    }
    observer.on_event(&PipelineEvent::PositionBuilt { fen });
    position
}

fn recover_king(
    position: &mut Position,
    assignment: &SquareAssignment,
    color: Color,
    mode: KingRecovery,
    observer: &dyn PipelineObserver,
) {
    if mode == KingRecovery::Disabled {
        return;
    }
    let Some(square) = assignment.king_targets.get(color) else {
        return;
    };
    if mode == KingRecovery::OnlyEmpty && position.piece_at(square).is_some() {
        log::debug!("{color:?} king target {square} is occupied, not recovering");
        return;
    }
    let king = Piece::new(color, PieceKind::King);
    let other_king = Piece::new(color.opposite(), PieceKind::King);
    if mode == KingRecovery::KeepSoleKings
        && position.piece_at(square) == Some(other_king)
        && position.count(other_king) == 1
    {
        log::warn!("{color:?} king target {square} holds the only {:?} king", color.opposite());
        return;
    }
    let replaced = position.set(square, king);
    observer.on_event(&PipelineEvent::KingRecovered {
        piece: king.fen_char(),
        square: square.name(),
        replaced: replaced.map(Piece::fen_char),
    });
}
