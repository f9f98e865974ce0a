use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Rank used when several detections land on one square.
    ///
    /// Bishops and knights share a level.
    pub fn priority(self) -> u8 {
        match self {
            Self::King => 5,
            Self::Queen => 4,
            Self::Rook => 3,
            Self::Bishop | Self::Knight => 2,
            Self::Pawn => 1,
        }
    }

    /// Lowercase FEN letter.
    pub fn letter(self) -> char {
        match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        }
    }

    fn from_word(token: &str) -> Option<Self> {
        Some(match token {
            "king" => Self::King,
            "queen" => Self::Queen,
            "rook" => Self::Rook,
            "bishop" => Self::Bishop,
            "knight" => Self::Knight,
            "pawn" => Self::Pawn,
            _ => return None,
        })
    }

    fn from_letter(token: &str) -> Option<Self> {
        Some(match token {
            "k" => Self::King,
            "q" => Self::Queen,
            "r" => Self::Rook,
            "b" => Self::Bishop,
            "n" => Self::Knight,
            "p" => Self::Pawn,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// FEN character: uppercase for white, lowercase for black.
    pub fn fen_char(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let mut buf = [0u8; 4];
        let kind = PieceKind::from_letter(c.to_ascii_lowercase().encode_utf8(&mut buf))?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Self::new(color, kind))
    }

    /// Parse a detector class label such as `w-king`, `white-king`,
    /// `b-queen-v2` or `black_n`.
    ///
    /// The first color token wins and is never reused as a piece alias, so
    /// `b-b` is a black bishop. Full piece words take precedence over
    /// single-letter aliases. Unknown tokens (versions, model tags) are
    /// skipped.
    pub fn parse_label(label: &str) -> Option<Self> {
        let tokens: Vec<String> = label
            .split(['-', '_', ' '])
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        let (color_idx, color) = tokens.iter().enumerate().find_map(|(i, t)| {
            let color = match t.as_str() {
                "w" | "white" => Color::White,
                "b" | "black" => Color::Black,
                _ => return None,
            };
            Some((i, color))
        })?;

        let others = || {
            tokens
                .iter()
                .enumerate()
                .filter(move |(i, _)| *i != color_idx)
                .map(|(_, t)| t.as_str())
        };
        let kind = others()
            .find_map(PieceKind::from_word)
            .or_else(|| others().find_map(PieceKind::from_letter))?;

        Some(Self::new(color, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(label: &str) -> Option<char> {
        Piece::parse_label(label).map(Piece::fen_char)
    }

    #[test]
    fn parses_short_and_long_color_tokens() {
        assert_eq!(parse("w-king"), Some('K'));
        assert_eq!(parse("white-queen"), Some('Q'));
        assert_eq!(parse("b-rook"), Some('r'));
        assert_eq!(parse("black-knight"), Some('n'));
        assert_eq!(parse("Black-Pawn"), Some('p'));
    }

    #[test]
    fn version_suffixes_do_not_block_recognition() {
        assert_eq!(parse("b-queen-v2"), Some('q'));
        assert_eq!(parse("white-bishop-v10"), Some('B'));
        assert_eq!(parse("v3-w-pawn"), Some('P'));
    }

    #[test]
    fn single_letter_aliases_do_not_reuse_the_color_token() {
        assert_eq!(parse("b-b"), Some('b'));
        assert_eq!(parse("w-b"), Some('B'));
        assert_eq!(parse("w-n"), Some('N'));
        assert_eq!(parse("b"), None);
    }

    #[test]
    fn full_words_beat_aliases() {
        assert_eq!(parse("w-q-king"), Some('K'));
    }

    #[test]
    fn other_separators_are_accepted() {
        assert_eq!(parse("white_king"), Some('K'));
        assert_eq!(parse("black rook"), Some('r'));
    }

    #[test]
    fn unparseable_labels_yield_none() {
        assert_eq!(parse("board"), None);
        assert_eq!(parse("king"), None);
        assert_eq!(parse("white-dragon"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn fen_chars_round_trip() {
        for c in "KQRBNPkqrbnp".chars() {
            assert_eq!(Piece::from_fen_char(c).map(Piece::fen_char), Some(c));
        }
        assert_eq!(Piece::from_fen_char('x'), None);
    }

    #[test]
    fn priority_orders_king_first() {
        let order = [
            PieceKind::King,
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Pawn,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].priority() > pair[1].priority());
        }
        assert_eq!(PieceKind::Bishop.priority(), PieceKind::Knight.priority());
    }
}
