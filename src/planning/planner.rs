//! Exploration decision ladder, invoked once per cell arrival.
//!
//! Decision order: greedy local frontier, then continuation of an
//! existing multi-cell plan, then a global replan via A* to the first
//! still-unexpanded cell. When nothing is left to expand, exploration
//! is complete.

use tracing::{debug, info};

use crate::error::{RekhaError, Result};
use crate::mapping::{Cell, MazeMap};
use crate::perception::tracker::Heading;
use crate::planning::astar::astar;

/// Outcome of a planning decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Head for this cell along this absolute heading.
    Target { cell: Cell, heading: Heading },
    /// No unexpanded cell remains; exploration is complete.
    Complete,
}

/// Holds the plan currently being followed. The head of the plan is the
/// immediate target cell.
#[derive(Debug, Default)]
pub struct Planner {
    plan: Vec<Cell>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current immediate target, if a plan exists.
    pub fn target(&self) -> Option<Cell> {
        self.plan.first().copied()
    }

    /// Seed the initial target at mission start.
    pub fn seed(&mut self, target: Cell) {
        self.plan = vec![target];
    }

    /// Drop the current plan (error recovery).
    pub fn clear(&mut self) {
        self.plan.clear();
    }

    /// Decide the next target from `current`, which the robot has just
    /// reached.
    ///
    /// May insert a frontier stub into the map (greedy rule 1). Fails
    /// fatally when a replan target exists but no path reaches it, or
    /// when the chosen step is not grid-adjacent.
    pub fn decide(&mut self, map: &mut MazeMap, current: Cell) -> Result<Decision> {
        if let Some(frontier) = self.greedy_frontier(map, current) {
            debug!(%frontier, "greedy frontier target");
            self.plan = vec![frontier];
        } else if self.plan.len() > 1 {
            // Keep following the previously computed path
            self.plan.remove(0);
            debug!(target = %self.plan[0], "continuing existing plan");
        } else {
            let Some(goal) = map.first_unexpanded() else {
                info!("all cells expanded, exploration complete");
                return Ok(Decision::Complete);
            };

            let path = astar(map, current, goal).ok_or_else(|| {
                RekhaError::Planning(format!("no path from {} to {}", current, goal))
            })?;
            info!(%current, %goal, hops = path.len() - 1, "global replan");
            // Drop the head: it is the cell we are standing on
            self.plan = path[1..].to_vec();
            if self.plan.is_empty() {
                // Replanning to the current cell: it must still be
                // unexpanded; treat it as the immediate target so the
                // next arrival expands it
                self.plan = vec![current];
            }
        }

        let target = self.plan[0];
        let heading = Heading::from_delta(target.x - current.x, target.y - current.y)
            .ok_or_else(|| {
                RekhaError::Planning(format!(
                    "target {} is not grid-adjacent to {}",
                    target, current
                ))
            })?;

        Ok(Decision::Target {
            cell: target,
            heading,
        })
    }

    /// Greedy rule: the first neighbor of `current` that is unknown
    /// (inserted as a frontier stub) or known but unexpanded.
    fn greedy_frontier(&self, map: &mut MazeMap, current: Cell) -> Option<Cell> {
        let neighbors: Vec<Cell> = map.neighbors(current).to_vec();
        for nei in neighbors {
            if !map.contains(nei) {
                // Unknown neighbor: materialize it as a frontier stub
                map.add_edge(current, nei);
                return Some(nei);
            }
            if !map.is_expanded(nei) {
                return Some(nei);
            }
        }
        None
    }
}
