use std::fmt;
use std::str::FromStr;

use fen_vision_core::Size;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the 64 board squares.
///
/// Ordered a1, b1, .., h1, a2, .., h8.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Square(u8);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid square '{0}' (expected file a-h followed by rank 1-8)")]
pub struct ParseSquareError(pub String);

impl Square {
    /// `file` in 0..8 (a..h), `rank` in 1..=8.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && (1..=8).contains(&rank) {
            Some(Self((rank - 1) * 8 + file))
        } else {
            None
        }
    }

    /// Index in 0..64, a1 = 0, h8 = 63.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// File index, 0 = a.
    #[inline]
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank number, 1..=8.
    #[inline]
    pub fn rank(self) -> u8 {
        self.0 / 8 + 1
    }

    #[inline]
    pub fn file_char(self) -> char {
        (b'a' + self.file()) as char
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Square under a crop-space point, top-left origin with rank 8 at the top.
    ///
    /// Points outside the board are clamped to the nearest edge square.
    pub fn from_crop_point(x: f32, y: f32, crop_size: Size) -> Self {
        let side = crop_size.square_side();
        let file = ((x / side).floor() as i32).clamp(0, 7) as u8;
        let row = ((y / side).floor() as i32).clamp(0, 7) as u8;
        Self((7 - row) * 8 + file)
    }

    /// Algebraic name, e.g. `"e4"`.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank())
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError(s.to_string());
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        let file = file.to_ascii_lowercase();
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(err());
        }
        Square::new(file - b'a', rank - b'0').ok_or_else(err)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
