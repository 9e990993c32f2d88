//! Checkpoint collection and tour export.
//!
//! Ground markers seen while centered on a cell are collected into a
//! [`CheckpointLog`]. After exploration completes, the checkpoints are
//! sorted by marker number and stitched into one closed tour by routing
//! every consecutive pair (wrapping back to the first) through the maze
//! map. The tour is written as one cell per line, coordinates relative
//! to the first checkpoint.

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mapping::{Cell, MazeMap};
use crate::planning::astar;

/// Checkpoints discovered during exploration, in discovery order.
///
/// Each entry pairs the cell with its ground marker number. A cell is
/// recorded at most once; later readings on the same cell are ignored.
#[derive(Clone, Debug, Default)]
pub struct CheckpointLog {
    entries: Vec<(Cell, u32)>,
}

impl CheckpointLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a marker sighting. Duplicate cells are dropped.
    pub fn record(&mut self, cell: Cell, mark: u32) {
        if self.entries.iter().any(|&(c, _)| c == cell) {
            return;
        }
        debug!(%cell, mark, "checkpoint recorded");
        self.entries.push((cell, mark));
    }

    /// All recorded checkpoints in discovery order.
    pub fn entries(&self) -> &[(Cell, u32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stitch the recorded checkpoints into a closed tour over `map`.
///
/// Checkpoints are visited in ascending marker order (discovery order
/// breaking ties) and the tour wraps back to the first one. Each leg is
/// routed with A*; a leg with no route is skipped with a warning rather
/// than failing the whole tour.
pub fn stitch_tour(map: &MazeMap, log: &CheckpointLog) -> Vec<Cell> {
    let mut checkpoints = log.entries().to_vec();
    checkpoints.sort_by_key(|&(_, mark)| mark);

    let Some(&(first, _)) = checkpoints.first() else {
        return Vec::new();
    };

    let mut tour = vec![first];
    for i in 0..checkpoints.len() {
        let from = checkpoints[i].0;
        let to = checkpoints[(i + 1) % checkpoints.len()].0;
        match astar(map, from, to) {
            Some(leg) => {
                // The leg starts where the previous one ended
                tour.extend_from_slice(&leg[1..]);
            }
            None => {
                warn!(%from, %to, "no route between checkpoints, leg skipped");
            }
        }
    }

    info!(
        checkpoints = checkpoints.len(),
        cells = tour.len(),
        "tour stitched"
    );
    tour
}

/// Write a stitched tour to `path`, one `x y` pair per line, relative
/// to the tour's first cell.
pub fn write_tour(path: impl AsRef<Path>, tour: &[Cell]) -> Result<()> {
    let mut out = std::fs::File::create(path.as_ref())?;
    let Some(first) = tour.first() else {
        return Ok(());
    };
    for cell in tour {
        writeln!(out, "{} {}", cell.x - first.x, cell.y - first.y)?;
    }
    info!(path = %path.as_ref().display(), cells = tour.len(), "tour written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_map() -> MazeMap {
        // 2x2 ring of cells: (0,0)-(2,0)-(2,2)-(0,2)-(0,0)
        let mut map = MazeMap::new();
        map.add_edge(Cell::new(0, 0), Cell::new(2, 0));
        map.add_edge(Cell::new(2, 0), Cell::new(2, 2));
        map.add_edge(Cell::new(2, 2), Cell::new(0, 2));
        map.add_edge(Cell::new(0, 2), Cell::new(0, 0));
        map
    }

    #[test]
    fn test_record_dedups_by_cell() {
        let mut log = CheckpointLog::new();
        log.record(Cell::new(0, 0), 1);
        log.record(Cell::new(2, 0), 2);
        log.record(Cell::new(0, 0), 9);
        assert_eq!(log.entries(), &[(Cell::new(0, 0), 1), (Cell::new(2, 0), 2)]);
    }

    #[test]
    fn test_tour_visits_marks_in_order_and_closes() {
        let map = ring_map();
        let mut log = CheckpointLog::new();
        // Discovery order differs from marker order
        log.record(Cell::new(0, 0), 1);
        log.record(Cell::new(0, 2), 3);
        log.record(Cell::new(2, 2), 2);

        let tour = stitch_tour(&map, &log);
        assert_eq!(tour.first(), Some(&Cell::new(0, 0)));
        assert_eq!(tour.last(), Some(&Cell::new(0, 0)));
        // Marks 2 and 3 appear in ascending order along the tour
        let pos2 = tour.iter().position(|&c| c == Cell::new(2, 2)).unwrap();
        let pos3 = tour.iter().position(|&c| c == Cell::new(0, 2)).unwrap();
        assert!(pos2 < pos3);
        // Consecutive tour cells are map-adjacent
        for pair in tour.windows(2) {
            assert!(map.neighbors(pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn test_unroutable_leg_is_skipped() {
        let mut map = ring_map();
        map.add_edge(Cell::new(10, 10), Cell::new(12, 10));
        let mut log = CheckpointLog::new();
        log.record(Cell::new(0, 0), 1);
        log.record(Cell::new(10, 10), 2);

        let tour = stitch_tour(&map, &log);
        // Both legs touching the island are dropped; the tour degrades
        // to the first checkpoint alone
        assert_eq!(tour, vec![Cell::new(0, 0)]);
    }

    #[test]
    fn test_written_file_is_relative_to_first_cell() {
        let mut map = MazeMap::new();
        map.add_edge(Cell::new(4, 2), Cell::new(6, 2));
        let mut log = CheckpointLog::new();
        log.record(Cell::new(4, 2), 1);
        log.record(Cell::new(6, 2), 2);
        let tour = stitch_tour(&map, &log);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.path");
        write_tour(&path, &tour).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "0 0\n2 0\n0 0\n");
    }

    #[test]
    fn test_empty_log_writes_nothing() {
        let map = MazeMap::new();
        let tour = stitch_tour(&map, &CheckpointLog::new());
        assert!(tour.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.path");
        write_tour(&path, &tour).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_tour_reuses_discovered_corridors() {
        // Checkpoints at opposite corners of the ring: each direction
        // has a two-hop route
        let map = ring_map();
        let mut log = CheckpointLog::new();
        log.record(Cell::new(0, 0), 1);
        log.record(Cell::new(2, 2), 2);
        let tour = stitch_tour(&map, &log);
        assert_eq!(tour.len(), 5);
        assert_eq!(tour.first(), tour.last());
    }
}
