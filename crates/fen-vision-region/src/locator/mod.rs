//! Region locator pipeline: candidate selection, padding, squaring,
//! clamping and resampling.

mod candidate;
mod error;
mod params;
mod pipeline;
mod result;

pub use candidate::BoardCandidate;
pub use error::{LocateError, NoDetectionCause};
pub use params::RegionParams;
pub use pipeline::RegionLocator;
pub use result::{BoardRegion, CroppedBoard};
