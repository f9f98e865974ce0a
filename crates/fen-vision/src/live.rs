//! Single-flight scanning of a camera stream.
//!
//! A [`LiveScanSession`] accepts every frame the camera produces but runs at
//! most one scan at a time, and no more often than `min_interval`. Frames
//! that arrive while a scan is running, or too soon after the last one, are
//! skipped rather than queued.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use fen_vision_core::ImageView;
use fen_vision_overlay::MoveGeometry;
use fen_vision_region::{BoardRegion, LocateError};
use serde::{Deserialize, Serialize};

use crate::detectors::{BestMoveProvider, BoardRegionDetector, PieceDetector};
use crate::scanner::{BoardScanner, ScanError};

/// Default spacing between scan starts.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(800);

/// Cooperative cancellation flag shared between a caller and a running scan.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> Result<(), ScanError> {
        if self.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// What the overlay should show after a frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum LiveStatus {
    #[default]
    Searching,
    NoBoard,
    Live,
    Error(String),
    Cancelled,
}

impl fmt::Display for LiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Searching => f.write_str("Searching for board…"),
            Self::NoBoard => f.write_str("No board found"),
            Self::Live => f.write_str("Live"),
            Self::Error(msg) => write!(f, "Error: {msg}"),
            Self::Cancelled => f.write_str("Cancelled"),
        }
    }
}

/// Overlay state produced by one processed frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdate {
    pub status: LiveStatus,
    pub fen: Option<String>,
    pub best_move_display: Option<String>,
    pub evaluation_text: Option<String>,
    pub region: Option<BoardRegion>,
    /// Move geometry; project it with the current view size.
    pub arrow: Option<MoveGeometry>,
}

impl LiveUpdate {
    fn status(status: LiveStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Throttled,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    Skipped(SkipReason),
    Processed(LiveUpdate),
}

/// Releases the in-flight flag when a scan ends, however it ends.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Throttled, single-flight driver for board scans on a frame stream.
pub struct LiveScanSession {
    scanner: BoardScanner,
    boards: Arc<dyn BoardRegionDetector>,
    pieces: Arc<dyn PieceDetector>,
    engine: Arc<dyn BestMoveProvider>,
    min_interval: Duration,
    in_flight: AtomicBool,
    last_started: Mutex<Option<Instant>>,
    current: Mutex<CancelToken>,
}

impl LiveScanSession {
    pub fn new(
        scanner: BoardScanner,
        boards: Arc<dyn BoardRegionDetector>,
        pieces: Arc<dyn PieceDetector>,
        engine: Arc<dyn BestMoveProvider>,
    ) -> Self {
        Self {
            scanner,
            boards,
            pieces,
            engine,
            min_interval: DEFAULT_MIN_INTERVAL,
            in_flight: AtomicBool::new(false),
            last_started: Mutex::new(None),
            current: Mutex::new(CancelToken::new()),
        }
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    #[inline]
    pub fn scanner(&self) -> &BoardScanner {
        &self.scanner
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Cancel the scan currently running, if any. The scan stops at its
    /// next stage boundary; later frames are unaffected.
    pub fn cancel(&self) {
        lock(&self.current).cancel();
    }

    pub fn handle_frame(&self, frame: &ImageView<'_>) -> FrameOutcome {
        self.handle_frame_at(frame, Instant::now())
    }

    /// [`handle_frame`](Self::handle_frame) with an explicit clock reading.
    pub fn handle_frame_at(&self, frame: &ImageView<'_>, now: Instant) -> FrameOutcome {
        let Some((_flight, token)) = self.start() else {
            return FrameOutcome::Skipped(SkipReason::InFlight);
        };
        {
            let mut last = lock(&self.last_started);
            if let Some(prev) = *last {
                if now.saturating_duration_since(prev) < self.min_interval {
                    return FrameOutcome::Skipped(SkipReason::Throttled);
                }
            }
            *last = Some(now);
        }
        FrameOutcome::Processed(self.run(frame, &token))
    }

    /// Scan immediately, ignoring the throttle but not the single-flight rule.
    pub fn scan_now(&self, frame: &ImageView<'_>) -> Result<LiveUpdate, ScanError> {
        let (_flight, token) = self.start().ok_or(ScanError::Busy)?;
        *lock(&self.last_started) = Some(Instant::now());
        Ok(self.run(frame, &token))
    }

    /// Take the flight and install its cancel token in one step.
    ///
    /// Both happen under the `current` lock, so a [`cancel`](Self::cancel)
    /// either precedes the flight or reaches its token.
    fn start(&self) -> Option<(FlightGuard<'_>, CancelToken)> {
        let mut current = lock(&self.current);
        let flight = FlightGuard::acquire(&self.in_flight)?;
        let token = CancelToken::new();
        *current = token.clone();
        Some((flight, token))
    }

    fn run(&self, frame: &ImageView<'_>, token: &CancelToken) -> LiveUpdate {
        let board = match self.scanner.detect_board(frame, &*self.boards, &*self.pieces, token) {
            Ok(Some(board)) => board,
            Ok(None) | Err(ScanError::Locate(LocateError::NoDetection(_))) => {
                return LiveUpdate::status(LiveStatus::NoBoard)
            }
            Err(ScanError::Cancelled) => return LiveUpdate::status(LiveStatus::Cancelled),
            Err(err) => {
                log::warn!("live scan failed: {err}");
                return LiveUpdate::status(LiveStatus::Error(err.to_string()));
            }
        };

        let fen = board.report.fen.clone();
        let engine = self.engine.best_move(&fen).map_err(ScanError::Engine);
        if token.is_cancelled() {
            return LiveUpdate::status(LiveStatus::Cancelled);
        }
        let mut update = LiveUpdate {
            fen: Some(fen),
            region: Some(board.region),
            ..LiveUpdate::default()
        };
        match engine {
            Ok(res) => {
                update.status = LiveStatus::Live;
                update.best_move_display = Some(res.display_move().to_owned());
                update.evaluation_text = res.evaluation_text();
                update.arrow = match self.scanner.move_geometry(&res.uci, &board.region) {
                    Ok(geometry) => Some(geometry),
                    Err(err) => {
                        log::debug!("engine move '{}' has no arrow: {err}", res.uci);
                        None
                    }
                };
            }
            Err(err) => {
                log::warn!("{err}");
                update.status = LiveStatus::Error(err.to_string());
            }
        }
        update
    }
}
