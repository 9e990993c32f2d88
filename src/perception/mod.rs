//! Perception: line-position estimation, orientation/cell tracking and
//! intersection detection.

pub mod intersection;
pub mod line;
pub mod tracker;

pub use intersection::{IntersectionDetector, Turn};
pub use line::{filter_line, line_position};
pub use tracker::{CellTracker, Heading, TrackState};
