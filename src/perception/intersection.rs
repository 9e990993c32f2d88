//! Intersection detection and turn-category conversion.
//!
//! While the robot crosses one cell, the detector accumulates the turn
//! categories suggested by the line-position estimates. Hard turns are
//! only recognizable before the cell's center line (the sensor row sees
//! the branch at full deflection); soft and normal turns are recognized
//! after it. Once the robot body has fully crossed the center, a
//! straight-ahead exit is checked against the three central sensor
//! elements, the ground marker is recorded as a checkpoint, and the
//! "decision pending" flag is raised for the planner.

use tracing::debug;

use crate::link::{LINE_CENTER, LINE_ELEMENTS};
use crate::mapping::Cell;
use crate::perception::tracker::{CellTracker, Heading, TrackState};
use crate::tour::CheckpointLog;

/// Robot-relative turn categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Straight,
    SoftLeft,
    Left,
    HardLeft,
    Back,
    HardRight,
    Right,
    SoftRight,
}

/// Turn ring in counterclockwise 45-degree steps from straight ahead.
/// Index i rotates the current heading by i compass-ring positions.
pub const TURN_RING: [Turn; 8] = [
    Turn::Straight,
    Turn::SoftLeft,
    Turn::Left,
    Turn::HardLeft,
    Turn::Back,
    Turn::HardRight,
    Turn::Right,
    Turn::SoftRight,
];

impl Turn {
    /// Position in the counterclockwise turn ring.
    pub fn ring_index(self) -> usize {
        TURN_RING.iter().position(|&t| t == self).unwrap_or(0)
    }

    /// Absolute heading this turn leads to from the given heading.
    pub fn to_heading(self, current: Heading) -> Heading {
        Heading::from_index(self.ring_index() + current.index())
    }
}

/// Quantize a position estimate to rounded milliunits for threshold
/// comparison. Exact-value categories (0.080, 0.100) are only meaningful
/// after this quantization.
fn milli(pos: f32) -> i32 {
    (pos * 1000.0).round() as i32
}

/// Maximum deflection: the estimate equals one full sensor gap.
const HARD_MILLI: i32 = 80;
/// Normal turn: the characteristic four-of-four half reading.
const NORMAL_MILLI: i32 = 100;
/// Soft turn band, excluding the normal value.
const SOFT_LO_MILLI: i32 = 53;
const SOFT_HI_MILLI: i32 = 160;

/// Accumulates turn candidates for the current cell visit.
#[derive(Debug, Default)]
pub struct IntersectionDetector {
    candidates: Vec<Turn>,
    decision_pending: bool,
}

impl IntersectionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn categories recorded for the current visit.
    pub fn candidates(&self) -> &[Turn] {
        &self.candidates
    }

    /// Whether the cell center has been crossed and a planning decision
    /// is due.
    pub fn decision_pending(&self) -> bool {
        self.decision_pending
    }

    /// Clear accumulated candidates and the decision flag. Called after
    /// every planning decision.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.decision_pending = false;
    }

    fn record(&mut self, turn: Turn) {
        if !self.candidates.contains(&turn) {
            debug!(?turn, "turn candidate");
            self.candidates.push(turn);
        }
    }

    fn has(&self, turn: Turn) -> bool {
        self.candidates.contains(&turn)
    }

    /// Feed one tick of filtered sensor data while the tracked cell is
    /// the current planning target.
    ///
    /// `left`/`right` are the filtered line-position estimates, `line`
    /// the filtered raw array, `ground` the marker reading.
    #[allow(clippy::too_many_arguments)]
    pub fn observe(
        &mut self,
        tracker: &CellTracker,
        state: &TrackState,
        x: f32,
        y: f32,
        line: &[bool; LINE_ELEMENTS],
        left: Option<f32>,
        right: Option<f32>,
        ground: Option<u32>,
        checkpoints: &mut CheckpointLog,
    ) {
        let left_m = left.map(milli);
        let right_m = right.map(milli);

        if state.before_center {
            // Only full-deflection branches are trustworthy this early
            if left_m == Some(HARD_MILLI) && !self.has(Turn::HardLeft) {
                self.record(Turn::HardLeft);
            }
            if right_m == Some(HARD_MILLI) && !self.has(Turn::HardRight) {
                self.record(Turn::HardRight);
            }
            return;
        }

        if let Some(m) = left_m {
            if m == NORMAL_MILLI
                && !self.has(Turn::Left)
                && !self.has(Turn::HardLeft)
                && !self.has(Turn::SoftLeft)
            {
                self.record(Turn::Left);
            }
            if (SOFT_LO_MILLI..SOFT_HI_MILLI).contains(&m)
                && m != NORMAL_MILLI
                && !self.has(Turn::SoftLeft)
                && !self.has(Turn::HardLeft)
            {
                self.record(Turn::SoftLeft);
            }
        }
        if let Some(m) = right_m {
            if m == NORMAL_MILLI
                && !self.has(Turn::Right)
                && !self.has(Turn::HardRight)
                && !self.has(Turn::SoftRight)
            {
                self.record(Turn::Right);
            }
            if (SOFT_LO_MILLI..SOFT_HI_MILLI).contains(&m)
                && m != NORMAL_MILLI
                && !self.has(Turn::SoftRight)
                && !self.has(Turn::HardRight)
            {
                self.record(Turn::SoftRight);
            }
        }

        if tracker.in_center(state.heading, x, y, state.cell) {
            let central = line[LINE_CENTER - 1] as u8 + line[LINE_CENTER] as u8
                + line[LINE_CENTER + 1] as u8;
            if central > 1 && !self.has(Turn::Straight) {
                self.record(Turn::Straight);
            }
            if let Some(mark) = ground {
                checkpoints.record(state.cell, mark);
            }
            self.decision_pending = true;
        }
    }

    /// Convert the recorded robot-relative candidates to absolute
    /// headings for the map builder.
    pub fn absolute_directions(&self, heading: Heading) -> Vec<Heading> {
        self.candidates
            .iter()
            .map(|t| t.to_heading(heading))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::line::{line_position, parse_line, SENSOR_SPACING};

    fn observe_str(
        det: &mut IntersectionDetector,
        tracker: &CellTracker,
        state: &TrackState,
        x: f32,
        y: f32,
        s: &str,
        checkpoints: &mut CheckpointLog,
    ) {
        let line = parse_line(s);
        let (l, r) = line_position(&line, SENSOR_SPACING);
        det.observe(tracker, state, x, y, &line, l, r, None, checkpoints);
    }

    #[test]
    fn test_turn_ring_conversion() {
        // Heading east, a left turn leads north
        assert_eq!(Turn::Left.to_heading(Heading::East), Heading::North);
        assert_eq!(Turn::Right.to_heading(Heading::East), Heading::South);
        assert_eq!(Turn::Straight.to_heading(Heading::East), Heading::East);
        assert_eq!(Turn::Back.to_heading(Heading::East), Heading::West);
        // Heading north, soft right is northeast
        assert_eq!(Turn::SoftRight.to_heading(Heading::North), Heading::NorthEast);
        // Hard left rotates 135 degrees counterclockwise
        assert_eq!(
            Turn::HardLeft.to_heading(Heading::South),
            Heading::NorthEast
        );
        assert_eq!(Turn::HardLeft.to_heading(Heading::East), Heading::NorthWest);
    }

    #[test]
    fn test_hard_turn_only_before_center() {
        let tracker = CellTracker::default();
        let mut det = IntersectionDetector::new();
        let mut cps = CheckpointLog::new();
        let state = TrackState {
            heading: Heading::East,
            cell: Cell::new(2, 0),
            before_center: true,
        };
        // Single bit plus supporting pattern: left estimate 0.08 exactly
        observe_str(&mut det, &tracker, &state, 1.4, 0.0, "1011000", &mut cps);
        assert_eq!(det.candidates(), &[Turn::HardLeft]);
        assert!(!det.decision_pending());
    }

    #[test]
    fn test_normal_turn_after_center() {
        let tracker = CellTracker::default();
        let mut det = IntersectionDetector::new();
        let mut cps = CheckpointLog::new();
        let state = TrackState {
            heading: Heading::East,
            cell: Cell::new(2, 0),
            before_center: false,
        };
        // Four left elements active: 0.100 exactly
        observe_str(&mut det, &tracker, &state, 1.8, 0.0, "1111000", &mut cps);
        assert_eq!(det.candidates(), &[Turn::Left]);
        // A soft band reading on the same side is still recorded;
        // only hard turns suppress it
        observe_str(&mut det, &tracker, &state, 1.85, 0.0, "0111000", &mut cps);
        assert_eq!(det.candidates(), &[Turn::Left, Turn::SoftLeft]);
    }

    #[test]
    fn test_straight_and_checkpoint_in_center() {
        let tracker = CellTracker::default();
        let mut det = IntersectionDetector::new();
        let mut cps = CheckpointLog::new();
        let cell = Cell::new(2, 0);
        let state = TrackState {
            heading: Heading::East,
            cell,
            before_center: false,
        };
        // Robot fully past the center with a corridor ahead
        let line = parse_line("0011100");
        let (l, r) = line_position(&line, SENSOR_SPACING);
        det.observe(&tracker, &state, 2.2, 0.0, &line, l, r, Some(3), &mut cps);
        assert!(det.decision_pending());
        assert_eq!(det.candidates(), &[Turn::Straight]);
        assert_eq!(cps.entries(), &[(cell, 3)]);

        // Checkpoint is recorded once per cell
        det.observe(&tracker, &state, 2.25, 0.0, &line, l, r, Some(3), &mut cps);
        assert_eq!(cps.entries().len(), 1);
    }

    #[test]
    fn test_clear_resets_visit() {
        let mut det = IntersectionDetector::new();
        det.record(Turn::Left);
        det.decision_pending = true;
        det.clear();
        assert!(det.candidates().is_empty());
        assert!(!det.decision_pending());
    }

    #[test]
    fn test_absolute_directions() {
        let mut det = IntersectionDetector::new();
        det.record(Turn::Straight);
        det.record(Turn::Left);
        let dirs = det.absolute_directions(Heading::North);
        assert_eq!(dirs, vec![Heading::North, Heading::West]);
    }
}
