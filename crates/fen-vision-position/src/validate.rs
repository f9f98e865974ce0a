//! Structural sanity check of a FEN board field.
//!
//! This is not a legality check: castling, side to move and piece counts
//! are never looked at.

use std::fmt;

use fen_vision_core::{PipelineEvent, PipelineObserver};
use serde::{Deserialize, Serialize};

/// First structural problem found in a FEN string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionIssue {
    EmptyFen,
    WrongRankCount { found: usize },
    BadRankSum { rank: String, sum: u32 },
    MissingKings { white: bool, black: bool },
}

impl fmt::Display for PositionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFen => write!(f, "Empty FEN"),
            Self::WrongRankCount { .. } => write!(f, "FEN must have 8 ranks"),
            Self::BadRankSum { rank, .. } => write!(f, "Rank '{rank}' does not sum to 8 squares"),
            Self::MissingKings { white, black } => {
                write!(f, "Missing king(s): white={white}, black={black}")
            }
        }
    }
}

/// Outcome of [`validate_fen`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    /// Human-readable reason, present only when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn invalid(issue: &PositionIssue) -> Self {
        Self {
            ok: false,
            reason: Some(issue.to_string()),
        }
    }
}

impl From<Result<(), PositionIssue>> for ValidationResult {
    fn from(res: Result<(), PositionIssue>) -> Self {
        match res {
            Ok(()) => Self::valid(),
            Err(issue) => Self::invalid(&issue),
        }
    }
}

/// Check the board field of `fen`, stopping at the first problem.
///
/// Empty rank segments (e.g. from a trailing `/`) are skipped, so only
/// non-empty ranks are counted.
pub fn check_fen(fen: &str) -> Result<(), PositionIssue> {
    let board = fen.split_whitespace().next().ok_or(PositionIssue::EmptyFen)?;

    let ranks: Vec<&str> = board.split('/').filter(|r| !r.is_empty()).collect();
    if ranks.len() != 8 {
        return Err(PositionIssue::WrongRankCount { found: ranks.len() });
    }

    let (mut white, mut black) = (false, false);
    for rank in ranks {
        let mut sum = 0u32;
        for ch in rank.chars() {
            match ch.to_digit(10) {
                Some(n) => sum += n,
                None => {
                    sum += 1;
                    white |= ch == 'K';
                    black |= ch == 'k';
                }
            }
        }
        if sum != 8 {
            return Err(PositionIssue::BadRankSum {
                rank: rank.to_string(),
                sum,
            });
        }
    }

    if !white || !black {
        return Err(PositionIssue::MissingKings { white, black });
    }
    Ok(())
}

/// [`check_fen`] as a [`ValidationResult`], reporting failures to `observer`.
pub fn validate_fen(fen: &str, observer: &dyn PipelineObserver) -> ValidationResult {
    let res = check_fen(fen);
    if let Err(issue) = &res {
        observer.on_event(&PipelineEvent::ValidationFailed {
            reason: issue.to_string(),
        });
    }
    res.into()
}
