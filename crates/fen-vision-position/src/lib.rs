//! Turn filtered piece detections into a FEN position.
//!
//! The pipeline is a chain of pure steps over crop-space detections:
//!
//! 1. [`DetectionFilter`] drops implausible boxes (confidence, board
//!    interior, size relative to one square).
//! 2. [`assign_squares`] maps each box center to a [`Square`] and resolves
//!    collisions with [`compare_candidates`].
//! 3. [`synthesize`] writes the board, recovers lost kings and infers
//!    castling rights.
//! 4. [`validate_fen`] checks the structure of the resulting FEN.
//!
//! ```
//! use fen_vision_core::{NullObserver, Size};
//! use fen_vision_position::{
//!     assign_squares, synthesize, validate_fen, PieceDetection, SynthesisParams,
//! };
//!
//! let crop = Size::square(800.0);
//! let detections = vec![
//!     PieceDetection::new("w-king", 450.0, 750.0, 80.0, 90.0, Some(0.9)),
//!     PieceDetection::new("b-king", 450.0, 50.0, 80.0, 90.0, Some(0.9)),
//! ];
//! let assignment = assign_squares(&detections, crop, &NullObserver);
//! let position = synthesize(&assignment, &SynthesisParams::default(), &NullObserver);
//! assert_eq!(position.fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
//! assert!(validate_fen(&position.fen(), &NullObserver).ok);
//! ```

mod assign;
mod detection;
mod filter;
mod piece;
mod square;
mod synthesize;
mod validate;

pub use assign::{
    assign_squares, compare_candidates, Collision, KingTargets, PieceCandidate, SquareAssignment,
};
pub use detection::PieceDetection;
pub use filter::{DetectionFilter, FilterParams};
pub use piece::{Color, Piece, PieceKind};
pub use square::{ParseSquareError, Square};
pub use synthesize::{synthesize, KingRecovery, Position, SynthesisParams};
pub use validate::{check_fen, validate_fen, PositionIssue, ValidationResult};
