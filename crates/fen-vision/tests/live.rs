use std::sync::{Arc, Barrier, OnceLock, Weak};
use std::thread;
use std::time::{Duration, Instant};

use fen_vision::{
    BestMoveProvider, BoardCandidate, BoardRegionDetector, BoardScanner, BoxError, EngineResult,
    FrameOutcome, ImageView, LiveScanSession, LiveStatus, OwnedImage, PieceDetection,
    PieceDetector, ScanError, ScanParams, SkipReason, Size,
};

struct OneBoard;

impl BoardRegionDetector for OneBoard {
    fn detect_board_regions(&self, image: &ImageView<'_>) -> Result<Vec<BoardCandidate>, BoxError> {
        let s = image.size();
        Ok(vec![BoardCandidate::new(s.width / 2.0, s.height / 2.0, 200.0, 200.0, Some(0.9))])
    }
}

struct NoBoards;

impl BoardRegionDetector for NoBoards {
    fn detect_board_regions(&self, _image: &ImageView<'_>) -> Result<Vec<BoardCandidate>, BoxError> {
        Ok(Vec::new())
    }
}

fn kings() -> Vec<PieceDetection> {
    vec![
        PieceDetection::new("white-king", 650.0, 750.0, 80.0, 90.0, Some(0.9)),
        PieceDetection::new("black-king", 650.0, 50.0, 80.0, 90.0, Some(0.9)),
    ]
}

struct Pieces;

impl PieceDetector for Pieces {
    fn detect_pieces(&self, _crop: &ImageView<'_>) -> Result<Vec<PieceDetection>, BoxError> {
        Ok(kings())
    }
}

/// Blocks inside detection until the test lets it go.
struct GatedPieces {
    entered: Barrier,
    release: Barrier,
}

impl GatedPieces {
    fn new() -> Self {
        Self {
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl PieceDetector for GatedPieces {
    fn detect_pieces(&self, _crop: &ImageView<'_>) -> Result<Vec<PieceDetection>, BoxError> {
        self.entered.wait();
        self.release.wait();
        Ok(kings())
    }
}

struct Engine(Result<&'static str, &'static str>);

impl BestMoveProvider for Engine {
    fn best_move(&self, fen: &str) -> Result<EngineResult, BoxError> {
        assert!(fen.starts_with("6k1/"));
        match self.0 {
            Ok(uci) => Ok(EngineResult {
                uci: uci.to_owned(),
                san: Some("Kf2".into()),
                evaluation: Some(0.0),
                pv: None,
            }),
            Err(msg) => Err(msg.into()),
        }
    }
}

fn session(
    boards: Arc<dyn BoardRegionDetector>,
    pieces: Arc<dyn PieceDetector>,
    engine: Engine,
) -> LiveScanSession {
    LiveScanSession::new(
        BoardScanner::new(ScanParams::live()),
        boards,
        pieces,
        Arc::new(engine),
    )
}

fn processed(outcome: FrameOutcome) -> fen_vision::LiveUpdate {
    match outcome {
        FrameOutcome::Processed(update) => update,
        other => panic!("expected a processed frame, got {other:?}"),
    }
}

#[test]
fn live_frame_carries_fen_move_and_arrow() {
    let frame = OwnedImage::blank(480, 360, 3);
    let s = session(Arc::new(OneBoard), Arc::new(Pieces), Engine(Ok("g1f2")));

    let update = processed(s.handle_frame(&frame.view()));
    assert_eq!(update.status, LiveStatus::Live);
    assert_eq!(update.fen.as_deref(), Some("6k1/8/8/8/8/8/8/6K1 w - - 0 1"));
    assert_eq!(update.best_move_display.as_deref(), Some("Kf2"));
    assert_eq!(update.evaluation_text.as_deref(), Some("+0.00"));

    let arrow = update.arrow.expect("arrow");
    let (from, to) = arrow.project(Size::new(390.0, 844.0)).expect("projection");
    assert!(to.x < from.x);
    assert!(to.y < from.y);
}

#[test]
fn frames_inside_the_interval_are_throttled() {
    let frame = OwnedImage::blank(320, 240, 3);
    let s = session(Arc::new(OneBoard), Arc::new(Pieces), Engine(Ok("g1f2")));
    let t0 = Instant::now();

    assert!(matches!(s.handle_frame_at(&frame.view(), t0), FrameOutcome::Processed(_)));
    assert_eq!(
        s.handle_frame_at(&frame.view(), t0 + Duration::from_millis(500)),
        FrameOutcome::Skipped(SkipReason::Throttled)
    );
    assert!(matches!(
        s.handle_frame_at(&frame.view(), t0 + Duration::from_millis(900)),
        FrameOutcome::Processed(_)
    ));
}

#[test]
fn a_second_frame_is_skipped_while_one_is_in_flight() {
    let frame = OwnedImage::blank(320, 240, 3);
    let gate = Arc::new(GatedPieces::new());
    let s = session(Arc::new(OneBoard), gate.clone(), Engine(Ok("g1f2")));
    let t0 = Instant::now();

    let view = frame.view();
    thread::scope(|scope| {
        let first = scope.spawn(|| s.handle_frame_at(&view, t0));

        gate.entered.wait();
        assert!(s.is_in_flight());
        assert_eq!(
            s.handle_frame_at(&frame.view(), t0 + Duration::from_secs(5)),
            FrameOutcome::Skipped(SkipReason::InFlight)
        );
        assert!(matches!(s.scan_now(&frame.view()), Err(ScanError::Busy)));
        gate.release.wait();

        let update = processed(first.join().expect("join"));
        assert_eq!(update.status, LiveStatus::Live);
    });
    assert!(!s.is_in_flight());
}

#[test]
fn cancel_stops_at_the_next_stage_boundary() {
    let frame = OwnedImage::blank(320, 240, 3);
    let gate = Arc::new(GatedPieces::new());
    let s = session(Arc::new(OneBoard), gate.clone(), Engine(Ok("g1f2")));

    let view = frame.view();
    thread::scope(|scope| {
        let first = scope.spawn(|| s.handle_frame(&view));
        gate.entered.wait();
        s.cancel();
        gate.release.wait();

        let update = processed(first.join().expect("join"));
        assert_eq!(update.status, LiveStatus::Cancelled);
        assert!(update.fen.is_none());
    });
}

/// Cancels its own session from inside board detection.
#[derive(Default)]
struct CancellingBoards(OnceLock<Weak<LiveScanSession>>);

impl BoardRegionDetector for CancellingBoards {
    fn detect_board_regions(&self, image: &ImageView<'_>) -> Result<Vec<BoardCandidate>, BoxError> {
        if let Some(session) = self.0.get().and_then(Weak::upgrade) {
            session.cancel();
        }
        OneBoard.detect_board_regions(image)
    }
}

#[test]
fn cancel_during_the_first_stage_is_not_lost() {
    let frame = OwnedImage::blank(320, 240, 3);
    let boards = Arc::new(CancellingBoards::default());
    let s = Arc::new(session(boards.clone(), Arc::new(Pieces), Engine(Ok("g1f2"))));
    boards.0.set(Arc::downgrade(&s)).expect("set once");

    for _ in 0..3 {
        let update = s.scan_now(&frame.view()).expect("not busy");
        assert_eq!(update.status, LiveStatus::Cancelled);
    }
    assert!(!s.is_in_flight());
}

#[test]
fn missing_board_and_engine_failure_set_status() {
    let frame = OwnedImage::blank(320, 240, 3);

    let s = session(Arc::new(NoBoards), Arc::new(Pieces), Engine(Ok("g1f2")));
    let update = processed(s.handle_frame(&frame.view()));
    assert_eq!(update.status, LiveStatus::NoBoard);
    assert_eq!(update.status.to_string(), "No board found");

    let s = session(Arc::new(OneBoard), Arc::new(Pieces), Engine(Err("socket closed")));
    let update = s.scan_now(&frame.view()).expect("not busy");
    assert_eq!(
        update.status,
        LiveStatus::Error("engine failed: socket closed".into())
    );
    assert!(update.fen.is_some());
    assert!(update.arrow.is_none());
}
