//! Wheel-level motion controller.
//!
//! Runs every tick. While en route to the target cell it either rotates
//! in place toward the target heading (with an opportunistic PID nudge
//! forward once nearly aligned) or drives at base speed with independent
//! per-wheel line corrections. On the target cell itself it centers at
//! reduced speed using only the three central sensor elements.
//!
//! A stuck counter bounds how long realignment may be retried; when it
//! trips, the controller asks for the target's edges to be pruned and a
//! fresh plan computed.

use tracing::{trace, warn};

use crate::config::{ControlConfig, SensingConfig};
use crate::control::pid::Pid;
use crate::link::{LINE_CENTER, LINE_ELEMENTS};
use crate::mapping::Cell;
use crate::perception::line::line_position;
use crate::perception::tracker::{Heading, TrackState};

/// One tick of motion control output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionStep {
    /// Command these wheel powers.
    Drive(f32, f32),
    /// The target has been unreachable for too long: prune its edges
    /// from the map and replan.
    PruneTarget,
}

/// Differential-drive motion controller with per-wheel PID memory.
#[derive(Debug)]
pub struct MotionController {
    cfg: ControlConfig,
    /// Sensor element spacing for the line-position estimates.
    spacing: f32,
    left: Pid,
    right: Pid,
    /// Consecutive ticks spent realigning toward the current target.
    stuck_ticks: u32,
    /// Sign of the last in-place rotation, used when the angular error
    /// is exactly zero and no line is visible. Reset only at mission
    /// start.
    last_rotation: f32,
}

impl MotionController {
    pub fn new(cfg: ControlConfig, sensing: &SensingConfig) -> Self {
        let pid = Pid::new(cfg.ultimate_gain, cfg.sample_interval, cfg.max_correction);
        Self {
            left: pid.clone(),
            right: pid,
            cfg,
            spacing: sensing.sensor_spacing,
            stuck_ticks: 0,
            last_rotation: -1.0,
        }
    }

    /// Reset the stuck counter. Called after every planning decision.
    pub fn reset_stuck(&mut self) {
        self.stuck_ticks = 0;
    }

    /// Compute wheel powers for one tick.
    ///
    /// `state` is the current tracking output, `compass` the raw bearing
    /// and `line` the filtered sensor array.
    pub fn step(
        &mut self,
        state: &TrackState,
        compass: f32,
        line: &[bool; LINE_ELEMENTS],
        target: Cell,
        target_heading: Heading,
    ) -> MotionStep {
        if state.cell == target {
            return self.center_on_cell(line);
        }

        let (pos_l, pos_r) = line_position(line, self.spacing);
        let drifting = pos_l.is_none_or(|p| p > 0.0) || pos_r.is_none_or(|p| p > 0.0);

        if state.heading != target_heading || drifting {
            self.realign(compass, target_heading, pos_l, pos_r)
        } else {
            // Aligned and on the line: full speed with line correction
            let (u_l, u_r) = self.corrections(pos_l, pos_r);
            let base = self.cfg.base_speed;
            trace!(u_l, u_r, "line following");
            MotionStep::Drive(base + u_l, base + u_r)
        }
    }

    /// Rotate in place toward the target heading, nudging forward when
    /// nearly aligned and a line is visible.
    fn realign(
        &mut self,
        compass: f32,
        target_heading: Heading,
        pos_l: Option<f32>,
        pos_r: Option<f32>,
    ) -> MotionStep {
        self.stuck_ticks += 1;
        if self.stuck_ticks > self.cfg.stuck_limit {
            warn!(
                ticks = self.stuck_ticks,
                "realignment exceeded stuck limit"
            );
            return MotionStep::PruneTarget;
        }

        let mut angle = target_heading.angle() - compass;
        if angle > 180.0 {
            angle -= 360.0;
        }
        if angle < -180.0 {
            angle += 360.0;
        }

        let rot = if angle > 0.0 {
            1.0
        } else if angle < 0.0 {
            -1.0
        } else {
            // Dead ahead but off the line: resume the last rotation side
            self.last_rotation
        };
        self.last_rotation = rot;

        let tol = self.cfg.align_tolerance_deg;
        if angle.abs() < tol && (pos_l.is_some() || pos_r.is_some()) {
            // Close enough: creep forward while the PID pulls us onto
            // the line
            let (u_l, u_r) = self.corrections(pos_l, pos_r);
            let base = self.cfg.base_speed;
            return MotionStep::Drive(base + u_l, base + u_r);
        }

        let speed = self.cfg.rotate_speed;
        MotionStep::Drive(-rot * speed, rot * speed)
    }

    /// Reduced-speed centering over the three central sensor elements.
    fn center_on_cell(&mut self, line: &[bool; LINE_ELEMENTS]) -> MotionStep {
        let mut masked = [false; LINE_ELEMENTS];
        masked[LINE_CENTER - 1..=LINE_CENTER + 1]
            .copy_from_slice(&line[LINE_CENTER - 1..=LINE_CENTER + 1]);

        let (pos_l, pos_r) = line_position(&masked, self.spacing);
        let (u_l, u_r) = match (pos_l, pos_r) {
            (Some(_), Some(_)) => self.corrections(pos_l, pos_r),
            _ => (0.0, 0.0),
        };

        let base = self.cfg.center_speed;
        MotionStep::Drive(base + u_l, base + u_r)
    }

    /// Per-wheel PID corrections; a side with no estimate contributes
    /// zero correction on that wheel only.
    fn corrections(&mut self, pos_l: Option<f32>, pos_r: Option<f32>) -> (f32, f32) {
        let u_l = pos_l.map_or(0.0, |p| self.left.update(0.0, p));
        let u_r = pos_r.map_or(0.0, |p| self.right.update(0.0, p));
        (u_l, u_r)
    }
}
