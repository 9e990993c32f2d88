//! The maze map: a symmetric adjacency graph over grid cells.
//!
//! Cells sit on an integer lattice with spacing 2 (centers occupy even
//! coordinates). Each cell tracks its discovered neighbors and whether
//! it has been fully expanded. Every edge insertion is mirrored at both
//! endpoints, so the symmetry invariant holds after any update, not just
//! eventually. Pruning (error recovery) is the only form of forgetting:
//! it removes edges, never cells.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::perception::tracker::Heading;

/// A maze junction or dead end on the even-coordinate lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbor cell two lattice units along a heading.
    pub fn toward(self, heading: Heading) -> Cell {
        let (dx, dy) = heading.step();
        Cell::new(self.x + 2 * dx, self.y + 2 * dy)
    }

    /// Euclidean distance between cell coordinates.
    pub fn distance(self, other: Cell) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Per-cell map entry.
#[derive(Clone, Debug, Default)]
pub struct CellNode {
    /// Discovered neighbors, in insertion order. Order is what makes
    /// greedy frontier selection reproducible.
    pub neighbors: Vec<Cell>,
    /// Whether all reachable neighbors have been discovered, or the
    /// cell has been given up on.
    pub expanded: bool,
}

/// Symmetric adjacency map over discovered cells.
#[derive(Clone, Debug, Default)]
pub struct MazeMap {
    cells: HashMap<Cell, CellNode>,
    /// Cell insertion order, for deterministic whole-map scans.
    order: Vec<Cell>,
}

impl MazeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn node(&self, cell: Cell) -> Option<&CellNode> {
        self.cells.get(&cell)
    }

    /// Neighbors of a cell in insertion order; empty for unknown cells.
    pub fn neighbors(&self, cell: Cell) -> &[Cell] {
        self.cells
            .get(&cell)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_expanded(&self, cell: Cell) -> bool {
        self.cells.get(&cell).is_some_and(|n| n.expanded)
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.order.iter().copied()
    }

    fn entry(&mut self, cell: Cell) -> &mut CellNode {
        if !self.cells.contains_key(&cell) {
            self.order.push(cell);
        }
        self.cells.entry(cell).or_default()
    }

    /// Insert a cell with no edges if it is not yet known.
    pub fn insert(&mut self, cell: Cell) {
        self.entry(cell);
    }

    /// Add a symmetric edge, creating either endpoint as needed.
    pub fn add_edge(&mut self, a: Cell, b: Cell) {
        let node = self.entry(a);
        if !node.neighbors.contains(&b) {
            node.neighbors.push(b);
        }
        let node = self.entry(b);
        if !node.neighbors.contains(&a) {
            node.neighbors.push(a);
        }
    }

    /// Mark a cell expanded.
    pub fn mark_expanded(&mut self, cell: Cell) {
        self.entry(cell).expanded = true;
    }

    /// Record the robot's arrival at a cell and fold in the detected
    /// turn directions.
    ///
    /// On first visit the arrival edge is inferred by reflecting the
    /// current heading: the robot came from two lattice units behind.
    /// Every detected direction contributes a symmetric edge; a neighbor
    /// whose adjacency reaches all 8 directions is itself expanded. The
    /// visited cell is marked expanded afterwards. Re-visiting an
    /// already-expanded cell is a no-op.
    pub fn expand(&mut self, cell: Cell, heading: Heading, directions: &[Heading]) {
        if !self.contains(cell) {
            let from = cell.toward(heading.opposite());
            self.add_edge(cell, from);
        } else if self.is_expanded(cell) {
            return;
        }

        for &dir in directions {
            let nei = cell.toward(dir);
            self.add_edge(cell, nei);
            if self.neighbors(nei).len() >= 8 {
                self.mark_expanded(nei);
            }
        }

        debug!(%cell, neighbors = self.neighbors(cell).len(), "cell expanded");
        self.mark_expanded(cell);
    }

    /// Error recovery: remove every edge referencing `target` and give
    /// up on it.
    ///
    /// The cell stays in the map (cells are never removed) but is marked
    /// expanded so the planner will not target it again.
    pub fn prune(&mut self, target: Cell) {
        warn!(%target, "pruning unreachable target from map");
        for node in self.cells.values_mut() {
            node.neighbors.retain(|&n| n != target);
        }
        if let Some(node) = self.cells.get_mut(&target) {
            node.neighbors.clear();
            node.expanded = true;
        }
    }

    /// First cell, in insertion order, that is not yet expanded.
    pub fn first_unexpanded(&self) -> Option<Cell> {
        self.order
            .iter()
            .copied()
            .find(|&c| !self.is_expanded(c))
    }

    /// Whether the adjacency relation is symmetric. Test support.
    pub fn is_symmetric(&self) -> bool {
        self.cells.iter().all(|(&c, node)| {
            node.neighbors
                .iter()
                .all(|&n| self.neighbors(n).contains(&c))
        })
    }
}
