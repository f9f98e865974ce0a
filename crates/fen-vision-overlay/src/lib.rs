//! Move indicator geometry for a located chessboard.
//!
//! A UCI move is turned into two square centers in crop space, mapped back
//! into the source frame through the crop rectangle, and finally into an
//! aspect-filled view. [`MoveGeometry`] bundles the frames; the individual
//! hops live in [`mapping`].

pub mod mapping;

mod arrow;
mod geometry;
mod uci;

pub use arrow::{draw_arrow, ArrowShape, StrokeStyle, DEFAULT_TIP_LENGTH};
pub use geometry::MoveGeometry;
pub use mapping::{map_crop_to_source, map_source_to_view, square_cell, square_center, AspectFill};
pub use uci::{MalformedMove, UciMove};
