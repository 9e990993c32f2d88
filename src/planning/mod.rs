//! Planning: A* search over the cell graph and the per-arrival
//! exploration decision ladder.

pub mod astar;
pub mod planner;

pub use astar::astar;
pub use planner::{Decision, Planner};
