use fen_vision_core::{NullObserver, Size};
use fen_vision_position::{
    assign_squares, check_fen, synthesize, Color, Piece, PieceDetection, PieceKind, PositionIssue,
    KingRecovery, SynthesisParams,
};
use proptest::prelude::*;

const CROP: Size = Size {
    width: 800.0,
    height: 800.0,
};

const LABELS: &[&str] = &[
    "w-king", "w-queen", "w-rook", "w-bishop", "w-knight", "w-pawn", "b-king", "b-queen",
    "b-rook", "b-bishop", "b-knight", "b-pawn", "white-king-v2", "black_k", "board", "w-dragon",
];

fn detection() -> impl Strategy<Value = PieceDetection> {
    (
        prop::sample::select(LABELS),
        -100.0f32..900.0,
        -100.0f32..900.0,
        10.0f32..200.0,
        10.0f32..200.0,
        prop::option::of(0.0f32..=1.0),
    )
        .prop_map(|(label, x, y, w, h, conf)| PieceDetection::new(label, x, y, w, h, conf))
}

fn has_king_label(detections: &[PieceDetection], color: Color) -> bool {
    detections.iter().any(|d| {
        Piece::parse_label(&d.label) == Some(Piece::new(color, PieceKind::King))
    })
}

proptest! {
    #[test]
    fn every_rank_sums_to_eight(detections in prop::collection::vec(detection(), 0..48)) {
        let assignment = assign_squares(&detections, CROP, &NullObserver);
        let position = synthesize(&assignment, &SynthesisParams::default(), &NullObserver);
        let board = position.board_string();
        prop_assert_eq!(board.split('/').count(), 8);
        match check_fen(&position.fen()) {
            Ok(()) | Err(PositionIssue::MissingKings { .. }) => {}
            Err(other) => prop_assert!(false, "{board}: {other}"),
        }
    }

    #[test]
    fn kings_missing_before_recovery_land_on_their_targets(
        detections in prop::collection::vec(detection(), 0..48)
    ) {
        let assignment = assign_squares(&detections, CROP, &NullObserver);
        let targets = assignment.king_targets;
        // Two kings sharing one target square cannot both be placed.
        prop_assume!(targets.white.is_none() || targets.white != targets.black);

        let disabled = SynthesisParams { king_recovery: KingRecovery::Disabled };
        let before = synthesize(&assignment, &disabled, &NullObserver);
        let after = synthesize(&assignment, &SynthesisParams::default(), &NullObserver);
        for color in [Color::White, Color::Black] {
            let king = Piece::new(color, PieceKind::King);
            if let Some(square) = targets.get(color).filter(|_| !before.has_king(color)) {
                prop_assert_eq!(after.piece_at(square), Some(king), "{}", after.fen());
            }
            if has_king_label(&detections, color) && targets.get(color).is_some() {
                prop_assert!(before.has_king(color) || after.has_king(color));
            }
        }
    }

    #[test]
    fn assignment_is_deterministic(detections in prop::collection::vec(detection(), 0..48)) {
        let first = assign_squares(&detections, CROP, &NullObserver);
        let second = assign_squares(&detections, CROP, &NullObserver);
        prop_assert_eq!(&first, &second);

        let a = synthesize(&first, &SynthesisParams::default(), &NullObserver);
        let b = synthesize(&second, &SynthesisParams::default(), &NullObserver);
        prop_assert_eq!(a.fen(), b.fen());
    }
}
