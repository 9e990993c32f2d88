//! Cell-graph maze map.

pub mod graph;

pub use graph::{Cell, CellNode, MazeMap};
