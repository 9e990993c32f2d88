//! Simulated maze environment for integration tests.
//!
//! [`SimMaze`] describes a maze as axis-aligned corridors between cell
//! centers plus numbered ground markers. [`SimLink`] implements
//! [`RobotLink`] over it with a minimal differential-drive model: wheel
//! powers translate and rotate an ideal robot, and the line sensor is
//! synthesized from the corridor layout around the tracked cell.
//!
//! The synthesis is semantic rather than geometric: while the robot is
//! aligned with a corridor it sees the canonical three-element pattern,
//! near a junction the branch corridors light the outer elements with
//! exactly the deflection values the detector categorizes, and during
//! in-place rotation the line is blank. Phantom branches ("decoys") can
//! be planted to light a turn pattern with no traversable corridor
//! behind it, which is how recovery scenarios are staged. Diagonal
//! corridors are not modeled; a robot aligned to a diagonal heading
//! always sees a blank line.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::link::{RobotLink, SensorFrame, LINE_ELEMENTS};
use crate::mapping::Cell;
use crate::perception::tracker::{CellTracker, Heading, LOOKAHEAD};
use crate::perception::Turn;

/// Angular window around a canonical heading within which the robot is
/// considered over the line.
const ALIGN_WINDOW_DEG: f32 = 10.0;

/// Minimum per-tick linear motion for pose snapping. In-place rotation
/// stays below it so the heading can sweep through canonical angles.
const SNAP_MIN_LIN: f32 = 0.04;

/// Lateral capture range of a corridor.
const SNAP_LATERAL: f32 = 0.75;

fn wrap_deg(mut a: f32) -> f32 {
    while a > 180.0 {
        a -= 360.0;
    }
    while a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Axis-aligned corridor maze with ground markers.
#[derive(Clone, Debug, Default)]
pub struct SimMaze {
    edges: HashSet<(Cell, Cell)>,
    markers: HashMap<Cell, u32>,
    decoys: HashMap<Cell, Vec<Turn>>,
}

impl SimMaze {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: Cell, b: Cell) -> (Cell, Cell) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Add a straight corridor from `from` to `to`, axis-aligned, as a
    /// chain of unit edges between adjacent cell centers.
    pub fn corridor(&mut self, from: Cell, to: Cell) -> &mut Self {
        assert!(
            from.x == to.x || from.y == to.y,
            "corridors must be axis-aligned"
        );
        let dx = (to.x - from.x).signum() * 2;
        let dy = (to.y - from.y).signum() * 2;
        let mut c = from;
        while c != to {
            let n = Cell::new(c.x + dx, c.y + dy);
            self.edges.insert(Self::key(c, n));
            c = n;
        }
        self
    }

    /// Place a numbered ground marker on a cell.
    pub fn marker(&mut self, cell: Cell, mark: u32) -> &mut Self {
        self.markers.insert(cell, mark);
        self
    }

    /// Plant a phantom branch: the junction lights the turn's sensor
    /// pattern, but no corridor exists in that direction.
    pub fn decoy(&mut self, cell: Cell, turn: Turn) -> &mut Self {
        self.decoys.entry(cell).or_default().push(turn);
        self
    }

    pub fn has_edge(&self, a: Cell, b: Cell) -> bool {
        self.edges.contains(&Self::key(a, b))
    }

    fn has_decoy(&self, cell: Cell, turn: Turn) -> bool {
        self.decoys
            .get(&cell)
            .is_some_and(|ts| ts.contains(&turn))
    }

    fn marker_near(&self, x: f32, y: f32) -> Option<u32> {
        self.markers
            .iter()
            .find(|(c, _)| (x - c.x as f32).abs() < 0.5 && (y - c.y as f32).abs() < 0.5)
            .map(|(_, &m)| m)
    }
}

/// Ideal differential-drive robot over a [`SimMaze`].
#[derive(Debug)]
pub struct SimLink {
    maze: SimMaze,
    tracker: CellTracker,
    x: f32,
    y: f32,
    theta_deg: f32,
    time: u32,
    sim_time: u32,
    finish_requested: bool,
}

impl SimLink {
    /// Robot at the origin cell center, heading east.
    pub fn new(maze: SimMaze) -> Self {
        Self {
            maze,
            tracker: CellTracker::default(),
            x: 0.0,
            y: 0.0,
            theta_deg: 0.0,
            time: 0,
            sim_time: 5000,
            finish_requested: false,
        }
    }

    pub fn with_sim_time(mut self, sim_time: u32) -> Self {
        self.sim_time = sim_time;
        self
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn elapsed(&self) -> u32 {
        self.time
    }

    pub fn finish_requested(&self) -> bool {
        self.finish_requested
    }

    /// Canonical heading nearest the robot's pose, with the angular
    /// error to it.
    fn nearest_heading(&self) -> (Heading, f32) {
        let mut best = Heading::East;
        let mut err = f32::MAX;
        for i in 0..8 {
            let h = Heading::from_index(i);
            let e = wrap_deg(self.theta_deg - h.angle()).abs();
            if e < err {
                err = e;
                best = h;
            }
        }
        (best, err)
    }

    fn light(line: &mut [bool; LINE_ELEMENTS], idx: &[usize]) {
        for &i in idx {
            line[i] = true;
        }
    }

    /// Synthesize the line reading for the current pose.
    fn synthesize_line(&self) -> [bool; LINE_ELEMENTS] {
        let mut line = [false; LINE_ELEMENTS];

        let (h, err) = self.nearest_heading();
        if err > ALIGN_WINDOW_DEG {
            return line; // mid-rotation, nothing under the sensor row
        }
        let (dx, dy) = h.step();
        if dx != 0 && dy != 0 {
            return line; // no diagonal corridors in this model
        }

        let state = self.tracker.update(h.angle(), self.x, self.y);
        let cell = state.cell;

        if state.before_center {
            // Sensor row is over the corridor segment on one side of
            // the cell center
            let sx = self.x + LOOKAHEAD * dx as f32;
            let sy = self.y + LOOKAHEAD * dy as f32;
            let s = (sx - cell.x as f32) * dx as f32 + (sy - cell.y as f32) * dy as f32;
            let seg = if s < 0.0 {
                self.maze.has_edge(cell.toward(h.opposite()), cell)
            } else {
                self.maze.has_edge(cell, cell.toward(h))
            };
            if seg {
                Self::light(&mut line, &[2, 3, 4]);
            }
            return line;
        }

        if !self.tracker.in_center(h, self.x, self.y, cell) {
            // Junction window: branches light the outer elements
            let ahead = self.maze.has_edge(cell, cell.toward(h));
            let left = Heading::from_index(h.index() + 2);
            let right = Heading::from_index(h.index() + 6);

            if ahead {
                Self::light(&mut line, &[2, 3, 4]);
            }
            if self.maze.has_edge(cell, cell.toward(left))
                || self.maze.has_decoy(cell, Turn::Left)
            {
                Self::light(&mut line, &[0, 1, 2]);
            }
            if self.maze.has_decoy(cell, Turn::SoftLeft) {
                Self::light(&mut line, &[1, 2]);
            }
            if self.maze.has_edge(cell, cell.toward(right))
                || self.maze.has_decoy(cell, Turn::Right)
            {
                Self::light(&mut line, &[4, 5, 6]);
            }
            if self.maze.has_decoy(cell, Turn::SoftRight) {
                Self::light(&mut line, &[4, 5]);
            }
            if line.iter().any(|&b| b) {
                line[3] = true;
            }
            return line;
        }

        // Past the center: only an onward corridor keeps the line lit
        if self.maze.has_edge(cell, cell.toward(h)) {
            Self::light(&mut line, &[2, 3, 4]);
        }
        line
    }

    /// Pull the pose onto the corridor lattice when driving forward
    /// near a canonical heading. In-place rotation is left untouched.
    fn snap_pose(&mut self, lin: f32) {
        if lin < SNAP_MIN_LIN {
            return;
        }
        let (h, err) = self.nearest_heading();
        if err > ALIGN_WINDOW_DEG {
            return;
        }
        let (dx, dy) = h.step();
        if dx != 0 && dy != 0 {
            return;
        }
        self.theta_deg = h.angle();
        // Snap the cross-axis coordinate onto the corridor line
        if dx != 0 {
            let even = 2.0 * (self.y / 2.0).round();
            if (self.y - even).abs() < SNAP_LATERAL {
                self.y = even;
            }
        } else {
            let even = 2.0 * (self.x / 2.0).round();
            if (self.x - even).abs() < SNAP_LATERAL {
                self.x = even;
            }
        }
    }
}

impl RobotLink for SimLink {
    fn read_sensors(&mut self) -> Result<SensorFrame> {
        let frame = SensorFrame {
            line: self.synthesize_line(),
            compass: wrap_deg(self.theta_deg),
            x: self.x,
            y: self.y,
            ground: self.maze.marker_near(self.x, self.y),
            time: self.time,
            start: true,
            stop: false,
            end: self.finish_requested || self.time > self.sim_time + 10,
            score: 0,
        };
        self.time += 1;
        Ok(frame)
    }

    fn drive_motors(&mut self, left: f32, right: f32) -> Result<()> {
        let left = left.clamp(-0.15, 0.15);
        let right = right.clamp(-0.15, 0.15);

        let lin = (left + right) / 2.0;
        self.theta_deg = wrap_deg(self.theta_deg + (right - left).to_degrees());
        let t = self.theta_deg.to_radians();
        self.x += lin * t.cos();
        self.y += lin * t.sin();

        self.snap_pose(lin);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finish_requested = true;
        Ok(())
    }

    fn sim_time(&self) -> u32 {
        self.sim_time
    }
}
