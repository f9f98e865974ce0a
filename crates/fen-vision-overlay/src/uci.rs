use std::fmt;
use std::str::FromStr;

use fen_vision_position::{ParseSquareError, PieceKind, Square};
use serde::{Deserialize, Serialize};

/// Why a move string could not be turned into geometry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedMove {
    #[error("move '{0}' is too short (need at least 4 characters)")]
    TooShort(String),
    #[error("move '{0}' is too long (at most 5 characters)")]
    TooLong(String),
    #[error(transparent)]
    BadSquare(#[from] ParseSquareError),
    #[error("invalid promotion piece '{0}'")]
    BadPromotion(char),
}

/// A move in UCI long algebraic form, e.g. `e2e4` or `e7e8q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    /// Promotion piece; carried along but irrelevant for geometry.
    pub promotion: Option<PieceKind>,
}

impl UciMove {
    pub fn parse(s: &str) -> Result<Self, MalformedMove> {
        s.parse()
    }
}

impl FromStr for UciMove {
    type Err = MalformedMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() < 4 {
            return Err(MalformedMove::TooShort(s.to_string()));
        }
        if chars.len() > 5 {
            return Err(MalformedMove::TooLong(s.to_string()));
        }
        let from: Square = chars[..2].iter().collect::<String>().parse()?;
        let to: Square = chars[2..4].iter().collect::<String>().parse()?;
        let promotion = chars
            .get(4)
            .map(|&c| promotion_kind(c).ok_or(MalformedMove::BadPromotion(c)))
            .transpose()?;
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

fn promotion_kind(c: char) -> Option<PieceKind> {
    match c.to_ascii_lowercase() {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        _ => None,
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl Serialize for UciMove {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UciMove {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_promotion_moves() {
        let m = UciMove::parse("e2e4").expect("move");
        assert_eq!((m.from.name(), m.to.name()), ("e2".into(), "e4".into()));
        assert_eq!(m.promotion, None);

        let p = UciMove::parse("e7e8q").expect("promotion");
        assert_eq!(p.promotion, Some(PieceKind::Queen));
        assert_eq!(p.to_string(), "e7e8q");
    }

    #[test]
    fn short_or_garbled_moves_are_malformed() {
        assert!(matches!(UciMove::parse(""), Err(MalformedMove::TooShort(_))));
        assert!(matches!(UciMove::parse("e2e"), Err(MalformedMove::TooShort(_))));
        assert!(matches!(UciMove::parse("e2e4q1"), Err(MalformedMove::TooLong(_))));
        assert!(matches!(UciMove::parse("z2e4"), Err(MalformedMove::BadSquare(_))));
        assert!(matches!(UciMove::parse("e2e9"), Err(MalformedMove::BadSquare(_))));
        assert_eq!(UciMove::parse("e7e8k"), Err(MalformedMove::BadPromotion('k')));
    }

    #[test]
    fn multibyte_input_does_not_panic() {
        assert!(UciMove::parse("é2e4").is_err());
        assert!(UciMove::parse("e2é4").is_err());
    }
}
