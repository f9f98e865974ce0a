//! Injectable diagnostics for pipeline stages.
//!
//! Stages never log directly; they report [`PipelineEvent`]s to whatever
//! observer the caller hands them. [`LogObserver`] forwards to the `log`
//! facade, [`RecordingObserver`] keeps events for inspection.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::Rect;

/// Why a piece detection was dropped by the plausibility filter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    LowConfidence,
    OutsideInterior,
    ImplausibleSize,
}

/// Counts reported once per filter pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub total: usize,
    pub kept: usize,
    pub low_confidence: usize,
    pub outside_interior: usize,
    pub implausible_size: usize,
}

impl FilterCounts {
    pub fn dropped(&self) -> usize {
        self.low_confidence + self.outside_interior + self.implausible_size
    }

    pub fn record(&mut self, outcome: Result<(), Rejection>) {
        self.total += 1;
        match outcome {
            Ok(()) => self.kept += 1,
            Err(Rejection::LowConfidence) => self.low_confidence += 1,
            Err(Rejection::OutsideInterior) => self.outside_interior += 1,
            Err(Rejection::ImplausibleSize) => self.implausible_size += 1,
        }
    }
}

/// Diagnostic emitted by a pipeline stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    RegionSelected {
        candidate_index: usize,
        confidence: f32,
        rect_in_source: Rect,
    },
    RegionRejected {
        reason: String,
    },
    DetectionsFiltered(FilterCounts),
    LabelIgnored {
        label: String,
    },
    CollisionResolved {
        square: String,
        winner: String,
        contenders: Vec<String>,
    },
    KingRecovered {
        piece: char,
        square: String,
        replaced: Option<char>,
    },
    PositionBuilt {
        fen: String,
    },
    ValidationFailed {
        reason: String,
    },
}

impl PipelineEvent {
    /// Severity used by [`LogObserver`].
    pub fn level(&self) -> log::Level {
        match self {
            Self::RegionRejected { .. } | Self::KingRecovered { .. } => log::Level::Warn,
            Self::ValidationFailed { .. } => log::Level::Warn,
            Self::LabelIgnored { .. } | Self::CollisionResolved { .. } => log::Level::Debug,
            Self::RegionSelected { .. }
            | Self::DetectionsFiltered(_)
            | Self::PositionBuilt { .. } => log::Level::Info,
        }
    }
}

impl std::fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RegionSelected {
                candidate_index,
                confidence,
                rect_in_source: r,
            } => write!(
                f,
                "board region #{candidate_index} (conf {confidence:.3}) -> \
                 [{:.1}, {:.1}, {:.1}x{:.1}]",
                r.x, r.y, r.width, r.height
            ),
            Self::RegionRejected { reason } => write!(f, "board region rejected: {reason}"),
            Self::DetectionsFiltered(c) => write!(
                f,
                "filter: kept {} / {} (dropped {}: conf={} edge={} size={})",
                c.kept,
                c.total,
                c.dropped(),
                c.low_confidence,
                c.outside_interior,
                c.implausible_size
            ),
            Self::LabelIgnored { label } => write!(f, "ignoring unrecognized label '{label}'"),
            Self::CollisionResolved {
                square,
                winner,
                contenders,
            } => write!(
                f,
                "collision @{square}: {} -> chose {winner}",
                contenders.join(" | ")
            ),
            Self::KingRecovered {
                piece,
                square,
                replaced,
            } => match replaced {
                Some(prev) => write!(
                    f,
                    "king detected but missing; forcing {piece} at {square} (replacing {prev})"
                ),
                None => write!(f, "king detected but missing; forcing {piece} at {square}"),
            },
            Self::PositionBuilt { fen } => write!(f, "position: {fen}"),
            Self::ValidationFailed { reason } => write!(f, "position rejected: {reason}"),
        }
    }
}

/// Sink for pipeline diagnostics.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn on_event(&self, _event: &PipelineEvent) {}
}

/// Forwards events to the `log` facade under the `fen_vision` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_event(&self, event: &PipelineEvent) {
        log::log!(target: "fen_vision", event.level(), "{event}");
    }
}

/// Stores every event; mostly useful in tests and reports.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
