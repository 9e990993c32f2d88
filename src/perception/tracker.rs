//! Orientation and cell tracking.
//!
//! Classifies the continuous compass bearing into one of eight discrete
//! headings, projects the line-sensor lookahead forward to find the
//! nearest cell center on the even-coordinate lattice, and derives the
//! per-heading "before center" flag that gates intersection detection.

use crate::mapping::Cell;

/// Default lookahead radius from robot center to the line-sensor row.
pub const LOOKAHEAD: f32 = 0.438;

/// Eight canonical compass headings, counterclockwise from East.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

/// Compass ring in counterclockwise 45-degree steps.
pub const HEADING_RING: [Heading; 8] = [
    Heading::East,
    Heading::NorthEast,
    Heading::North,
    Heading::NorthWest,
    Heading::West,
    Heading::SouthWest,
    Heading::South,
    Heading::SouthEast,
];

impl Heading {
    /// Position in the counterclockwise compass ring.
    pub fn index(self) -> usize {
        HEADING_RING.iter().position(|&h| h == self).unwrap_or(0)
    }

    /// Heading at a given ring index (mod 8).
    pub fn from_index(i: usize) -> Heading {
        HEADING_RING[i % 8]
    }

    /// Bound angle in degrees, range (-180, 180].
    pub fn angle(self) -> f32 {
        match self {
            Heading::East => 0.0,
            Heading::NorthEast => 45.0,
            Heading::North => 90.0,
            Heading::NorthWest => 135.0,
            Heading::West => 180.0,
            Heading::SouthWest => -135.0,
            Heading::South => -90.0,
            Heading::SouthEast => -45.0,
        }
    }

    /// Unit lattice step (dx, dy) for this heading.
    pub fn step(self) -> (i32, i32) {
        match self {
            Heading::East => (1, 0),
            Heading::NorthEast => (1, 1),
            Heading::North => (0, 1),
            Heading::NorthWest => (-1, 1),
            Heading::West => (-1, 0),
            Heading::SouthWest => (-1, -1),
            Heading::South => (0, -1),
            Heading::SouthEast => (1, -1),
        }
    }

    /// Heading rotated 180 degrees.
    pub fn opposite(self) -> Heading {
        Heading::from_index(self.index() + 4)
    }

    /// Classify a compass bearing (degrees, (-180, 180]) into its
    /// 22.5-degree-wide heading bucket.
    pub fn from_compass(compass: f32) -> Heading {
        if compass.abs() > 157.5 {
            Heading::West
        } else if compass > 112.5 {
            Heading::NorthWest
        } else if compass > 67.5 {
            Heading::North
        } else if compass > 22.5 {
            Heading::NorthEast
        } else if compass >= -22.5 {
            Heading::East
        } else if compass >= -67.5 {
            Heading::SouthEast
        } else if compass >= -112.5 {
            Heading::South
        } else {
            Heading::SouthWest
        }
    }

    /// Canonical heading for a cell-to-cell coordinate delta, if the
    /// delta lies on the 8-direction grid.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Heading> {
        let key = (dx.signum(), dy.signum());
        if key == (0, 0) {
            return None;
        }
        // Only axis-aligned or exact-diagonal deltas are on the grid
        if dx != 0 && dy != 0 && dx.abs() != dy.abs() {
            return None;
        }
        HEADING_RING.iter().copied().find(|h| h.step() == key)
    }
}

/// Per-tick tracking output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    /// Active heading bucket
    pub heading: Heading,
    /// Nearest cell center ahead of the sensor row
    pub cell: Cell,
    /// Whether the sensor row is still approaching the cell's center
    /// line (gates hard-turn vs soft/normal-turn detection)
    pub before_center: bool,
}

/// Snap a projected coordinate to the even lattice.
///
/// Truncate toward zero, then bump odd results away by the positive
/// remainder; this matches the grid convention that cell centers only
/// occupy even coordinates.
fn snap_even(v: f32) -> i32 {
    let c = v.trunc() as i32;
    c + c.rem_euclid(2)
}

/// Orientation and cell tracker. Stateless between ticks; `update`
/// recomputes the full [`TrackState`] from the current frame.
#[derive(Clone, Debug)]
pub struct CellTracker {
    /// Lookahead radius, from the sensing configuration.
    lookahead: f32,
}

impl Default for CellTracker {
    fn default() -> Self {
        Self::new(LOOKAHEAD)
    }
}

impl CellTracker {
    pub fn new(lookahead: f32) -> Self {
        Self { lookahead }
    }

    /// Classify heading, project the lookahead to the nearest cell and
    /// compute the before-center flag.
    pub fn update(&self, compass: f32, x: f32, y: f32) -> TrackState {
        let heading = Heading::from_compass(compass);
        let r = self.lookahead;
        let a = r / std::f32::consts::SQRT_2;

        let (cell, before_center) = match heading {
            Heading::East => {
                let c = Cell::new(snap_even(x + r), snap_even(y));
                (c, x + r < c.x as f32 + 0.125)
            }
            Heading::West => {
                let c = Cell::new(snap_even(x - r), snap_even(y));
                (c, x - r > c.x as f32 + 0.25)
            }
            Heading::North => {
                let c = Cell::new(snap_even(x), snap_even(y + r));
                (c, y + r < c.y as f32 + 0.25)
            }
            Heading::South => {
                let c = Cell::new(snap_even(x), snap_even(y - r));
                (c, y - r > c.y as f32 + 0.5)
            }
            Heading::NorthEast => {
                let c = Cell::new(snap_even(x + a), snap_even(y + a));
                (
                    c,
                    x + a < c.x as f32 + 0.125 && y + a < c.y as f32 + 0.25,
                )
            }
            Heading::SouthEast => {
                let c = Cell::new(snap_even(x + a), snap_even(y - a));
                (
                    c,
                    x + a < c.x as f32 + 0.125 && y - a > c.y as f32 + 0.5,
                )
            }
            Heading::NorthWest => {
                let c = Cell::new(snap_even(x - a), snap_even(y + a));
                (
                    c,
                    x - a > c.x as f32 + 0.25 && y + a < c.y as f32 + 0.25,
                )
            }
            Heading::SouthWest => {
                let c = Cell::new(snap_even(x - a), snap_even(y - a));
                (
                    c,
                    x - a > c.x as f32 + 0.25 && y - a > c.y as f32 + 0.5,
                )
            }
        };

        TrackState {
            heading,
            cell,
            before_center,
        }
    }

    /// Whether the robot body has fully crossed the cell's center line.
    ///
    /// Mirrors the before-center thresholds but tests the opposite side
    /// of the center, per heading, against the robot position itself.
    pub fn in_center(&self, heading: Heading, x: f32, y: f32, cell: Cell) -> bool {
        let cx = cell.x as f32;
        let cy = cell.y as f32;
        match heading {
            Heading::East => x >= cx + 0.125,
            Heading::West => x <= cx + 0.25,
            Heading::North => y >= cy + 0.25,
            Heading::South => y <= cy + 0.5,
            Heading::NorthEast => x >= cx + 0.125 && y >= cy + 0.25,
            Heading::SouthEast => x >= cx + 0.125 && y <= cy + 0.5,
            Heading::NorthWest => x <= cx + 0.25 && y >= cy + 0.25,
            Heading::SouthWest => x <= cx + 0.25 && y <= cy + 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compass_buckets() {
        assert_eq!(Heading::from_compass(0.0), Heading::East);
        assert_eq!(Heading::from_compass(44.9), Heading::NorthEast);
        assert_eq!(Heading::from_compass(90.0), Heading::North);
        assert_eq!(Heading::from_compass(135.0), Heading::NorthWest);
        assert_eq!(Heading::from_compass(180.0), Heading::West);
        assert_eq!(Heading::from_compass(-170.0), Heading::West);
        assert_eq!(Heading::from_compass(-135.0), Heading::SouthWest);
        assert_eq!(Heading::from_compass(-90.0), Heading::South);
        assert_eq!(Heading::from_compass(-45.0), Heading::SouthEast);
    }

    #[test]
    fn test_ring_round_trip() {
        for (i, &h) in HEADING_RING.iter().enumerate() {
            assert_eq!(h.index(), i);
            assert_eq!(Heading::from_index(i), h);
            assert_eq!(h.opposite().opposite(), h);
        }
    }

    #[test]
    fn test_from_delta() {
        assert_eq!(Heading::from_delta(2, 0), Some(Heading::East));
        assert_eq!(Heading::from_delta(-2, 0), Some(Heading::West));
        assert_eq!(Heading::from_delta(0, 2), Some(Heading::North));
        assert_eq!(Heading::from_delta(2, -2), Some(Heading::SouthEast));
        // Off-lattice deltas violate the grid assumption
        assert_eq!(Heading::from_delta(2, 4), None);
        assert_eq!(Heading::from_delta(0, 0), None);
    }

    #[test]
    fn test_snap_even() {
        assert_eq!(snap_even(0.3), 0);
        assert_eq!(snap_even(1.2), 2);
        assert_eq!(snap_even(2.4), 2);
        assert_eq!(snap_even(-0.5), 0);
        assert_eq!(snap_even(-1.5), 0);
        assert_eq!(snap_even(-2.5), -2);
    }

    #[test]
    fn test_project_east() {
        let tracker = CellTracker::default();
        // Robot just west of cell (2,0), heading east: sensor row
        // projects onto the cell and the robot is still approaching
        let state = tracker.update(0.0, 1.0, 0.0);
        assert_eq!(state.heading, Heading::East);
        assert_eq!(state.cell, Cell::new(2, 0));
        assert!(state.before_center);
        assert!(!tracker.in_center(state.heading, 1.0, 0.0, state.cell));

        // Past the center line
        let state = tracker.update(0.0, 2.2, 0.0);
        assert!(tracker.in_center(state.heading, 2.2, 0.0, state.cell));
    }

    #[test]
    fn test_project_diagonal() {
        let tracker = CellTracker::default();
        let state = tracker.update(45.0, 1.8, 1.8);
        assert_eq!(state.heading, Heading::NorthEast);
        assert_eq!(state.cell, Cell::new(2, 2));
    }

    #[test]
    fn test_lookahead_shifts_projection() {
        // At the origin heading east, the default lookahead still
        // projects onto the start cell; a longer sensor arm reaches the
        // next cell over
        let state = CellTracker::new(LOOKAHEAD).update(0.0, 0.0, 0.0);
        assert_eq!(state.cell, Cell::new(0, 0));
        let state = CellTracker::new(1.7).update(0.0, 0.0, 0.0);
        assert_eq!(state.cell, Cell::new(2, 0));
    }
}
