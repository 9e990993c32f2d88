//! A* search over the maze cell graph.
//!
//! Edges are unweighted (1 per hop). The heuristic is the Euclidean
//! distance between cell coordinates scaled by the longest single-hop
//! displacement (2 times sqrt 2, the lattice diagonal), which keeps it
//! admissible for hop counts. Equal f-scores are broken by open-set
//! insertion order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::mapping::{Cell, MazeMap};

/// Node in the search frontier.
#[derive(Clone, Debug)]
struct SearchNode {
    cell: Cell,
    g_score: u32,
    f_score: f32,
    /// Open-set insertion sequence, the tie-break for equal f-scores.
    seq: u64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for SearchNode {}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower f_score = higher priority);
        // earlier insertion wins ties
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hop-admissible heuristic between cells.
#[inline]
fn heuristic(from: Cell, to: Cell) -> f32 {
    from.distance(to) / (2.0 * std::f32::consts::SQRT_2)
}

/// Find a minimal-hop path from `start` to `goal` over the map's
/// adjacency, both endpoints included.
///
/// Returns `None` when the goal is unreachable from the start.
pub fn astar(map: &MazeMap, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<Cell, u32> = HashMap::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut seq = 0u64;

    g_score.insert(start, 0);
    open.push(SearchNode {
        cell: start,
        g_score: 0,
        f_score: heuristic(start, goal),
        seq,
    });

    while let Some(node) = open.pop() {
        let current = node.cell;
        if current == goal {
            return Some(reconstruct(&came_from, current));
        }

        // Stale heap entry: a better route to this cell was found after
        // this node was pushed
        if node.g_score > g_score.get(&current).copied().unwrap_or(u32::MAX) {
            continue;
        }

        for &neighbor in map.neighbors(current) {
            let tentative = node.g_score + 1;
            if tentative < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative);
                seq += 1;
                open.push(SearchNode {
                    cell: neighbor,
                    g_score: tentative,
                    f_score: tentative as f32 + heuristic(neighbor, goal),
                    seq,
                });
            }
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        current = prev;
        path.push(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Corridor map 0-2-4-...-(2n) along the x axis.
    fn corridor(n: i32) -> MazeMap {
        let mut map = MazeMap::new();
        for i in 0..n {
            map.add_edge(Cell::new(2 * i, 0), Cell::new(2 * i + 2, 0));
        }
        map
    }

    #[test]
    fn test_straight_corridor() {
        let map = corridor(4);
        let path = astar(&map, Cell::new(0, 0), Cell::new(8, 0)).unwrap();
        assert_eq!(
            path,
            vec![
                Cell::new(0, 0),
                Cell::new(2, 0),
                Cell::new(4, 0),
                Cell::new(6, 0),
                Cell::new(8, 0)
            ]
        );
    }

    #[test]
    fn test_path_cells_are_adjacent() {
        let mut map = corridor(3);
        map.add_edge(Cell::new(0, 0), Cell::new(0, 2));
        map.add_edge(Cell::new(0, 2), Cell::new(6, 2));
        let path = astar(&map, Cell::new(0, 0), Cell::new(6, 2)).unwrap();
        for pair in path.windows(2) {
            assert!(map.neighbors(pair[0]).contains(&pair[1]));
        }
    }

    #[test]
    fn test_minimal_hop_count_with_diagonals() {
        // Two routes to (4,4): two diagonal hops, or four axis hops
        let mut map = MazeMap::new();
        map.add_edge(Cell::new(0, 0), Cell::new(2, 2));
        map.add_edge(Cell::new(2, 2), Cell::new(4, 4));
        map.add_edge(Cell::new(0, 0), Cell::new(2, 0));
        map.add_edge(Cell::new(2, 0), Cell::new(4, 0));
        map.add_edge(Cell::new(4, 0), Cell::new(4, 2));
        map.add_edge(Cell::new(4, 2), Cell::new(4, 4));
        let path = astar(&map, Cell::new(0, 0), Cell::new(4, 4)).unwrap();
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_no_path_when_disconnected() {
        let mut map = corridor(2);
        map.add_edge(Cell::new(10, 10), Cell::new(12, 10));
        assert!(astar(&map, Cell::new(0, 0), Cell::new(12, 10)).is_none());
    }

    #[test]
    fn test_start_equals_goal() {
        let map = corridor(1);
        let path = astar(&map, Cell::new(0, 0), Cell::new(0, 0)).unwrap();
        assert_eq!(path, vec![Cell::new(0, 0)]);
    }

    #[test]
    fn test_avoids_pruned_edges() {
        let mut map = corridor(3);
        map.add_edge(Cell::new(0, 0), Cell::new(0, 2));
        map.add_edge(Cell::new(0, 2), Cell::new(2, 2));
        map.add_edge(Cell::new(2, 2), Cell::new(2, 0));
        map.prune(Cell::new(2, 0));
        // Direct corridor is cut; no route remains to (4,0) either
        assert!(astar(&map, Cell::new(0, 0), Cell::new(4, 0)).is_none());

        // But the loop via (2,2) still works
        let path = astar(&map, Cell::new(0, 0), Cell::new(2, 2)).unwrap();
        assert_eq!(path.len(), 3);
    }
}
