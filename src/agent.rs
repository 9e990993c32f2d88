//! Per-tick orchestration of the exploration mission.
//!
//! The agent owns every pipeline stage and one [`RobotLink`]. Each tick
//! it reads a frame, filters the line readings, tracks heading and cell,
//! and runs the motion controller. When the tracked cell is the current
//! target, the intersection detector observes the crossing; once the
//! cell center is fully crossed, the map is expanded with the detected
//! directions and the planner picks the next target. At end of run the
//! checkpoint tour is stitched and written.

use tracing::{error, info, warn};

use crate::config::RekhaConfig;
use crate::control::{MotionController, MotionStep};
use crate::error::Result;
use crate::link::{RobotLink, SensorFrame};
use crate::mapping::{Cell, MazeMap};
use crate::perception::line::{filter_line, line_position};
use crate::perception::tracker::{CellTracker, Heading};
use crate::perception::IntersectionDetector;
use crate::planning::{Decision, Planner};
use crate::tour::{stitch_tour, write_tour, CheckpointLog};

/// Run-control state driven by the collaborator's start/stop flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running,
}

/// The exploration agent. Owns the full pipeline and the link to the
/// sensing/actuation collaborator.
pub struct MazeAgent<L: RobotLink> {
    link: L,
    config: RekhaConfig,
    tracker: CellTracker,
    detector: IntersectionDetector,
    map: MazeMap,
    planner: Planner,
    motion: MotionController,
    checkpoints: CheckpointLog,
    /// Cell the robot is currently heading for.
    target: Cell,
    target_heading: Heading,
    /// Last cell whose center the robot has confirmedly crossed. Error
    /// recovery replans from here, not from the tracked projection.
    position: Cell,
    state: RunState,
    finished: bool,
}

impl<L: RobotLink> MazeAgent<L> {
    pub fn new(link: L, config: RekhaConfig) -> Self {
        let motion = MotionController::new(config.control.clone(), &config.sensing);
        let tracker = CellTracker::new(config.sensing.lookahead);
        Self {
            link,
            config,
            tracker,
            detector: IntersectionDetector::new(),
            map: MazeMap::new(),
            planner: Planner::new(),
            motion,
            checkpoints: CheckpointLog::new(),
            target: Cell::new(0, 0),
            target_heading: Heading::East,
            position: Cell::new(0, 0),
            state: RunState::Stopped,
            finished: false,
        }
    }

    /// Discovered cell graph.
    pub fn map(&self) -> &MazeMap {
        &self.map
    }

    /// Checkpoints recorded so far.
    pub fn checkpoints(&self) -> &CheckpointLog {
        &self.checkpoints
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run the mission until the collaborator signals end of run.
    ///
    /// On return the checkpoint tour has been written to the configured
    /// output path.
    pub fn run(&mut self) -> Result<()> {
        let frame = self.link.read_sensors()?;
        self.start_mission(&frame);

        loop {
            let frame = self.link.read_sensors()?;

            if frame.end {
                info!(score = frame.score, time = frame.time, "end of run");
                break;
            }
            if frame.time >= self.link.sim_time() && !self.finished {
                info!(time = frame.time, "simulation time budget exhausted");
                self.link.finish()?;
                self.finished = true;
            }

            match self.state {
                RunState::Stopped if frame.start => self.state = RunState::Running,
                RunState::Running if frame.stop => {
                    info!("run paused by collaborator");
                    self.state = RunState::Stopped;
                }
                _ => {}
            }
            if self.state == RunState::Stopped {
                continue;
            }

            self.tick(&frame)?;
        }

        let tour = stitch_tour(&self.map, &self.checkpoints);
        write_tour(self.config.tour_path(), &tour)
    }

    /// Seed the map, planner and checkpoint log from the first frame.
    ///
    /// The robot starts centered on a cell with a corridor assumed to
    /// the east; the start cell itself is a checkpoint.
    fn start_mission(&mut self, frame: &SensorFrame) {
        let start = Cell::new(frame.x.round() as i32, frame.y.round() as i32);
        let east = start.toward(Heading::East);

        self.map.add_edge(start, east);
        self.planner.seed(east);
        self.target = east;
        self.target_heading = Heading::East;
        self.position = start;
        self.checkpoints.record(start, frame.ground.unwrap_or(0));
        info!(%start, "mission start");
    }

    /// One running tick: perception, mapping/planning on arrival, then
    /// motion.
    fn tick(&mut self, frame: &SensorFrame) -> Result<()> {
        let mut line = frame.line;
        filter_line(&mut line);

        let state = self.tracker.update(frame.compass, frame.x, frame.y);

        if state.cell == self.target {
            let (left, right) = line_position(&line, self.config.sensing.sensor_spacing);
            self.detector.observe(
                &self.tracker,
                &state,
                frame.x,
                frame.y,
                &line,
                left,
                right,
                frame.ground,
                &mut self.checkpoints,
            );

            if self.detector.decision_pending() {
                let directions = self.detector.absolute_directions(state.heading);
                self.map.expand(state.cell, state.heading, &directions);
                self.position = state.cell;
                self.apply_decision(state.cell)?;
            }
        }

        let step = self.motion.step(
            &state,
            frame.compass,
            &line,
            self.target,
            self.target_heading,
        );
        match step {
            MotionStep::Drive(left, right) => self.link.drive_motors(left, right)?,
            MotionStep::PruneTarget => {
                warn!(target = %self.target, "target given up on, replanning");
                self.map.prune(self.target);
                self.planner.clear();
                self.apply_decision(self.position)?;
                self.link.drive_motors(0.0, 0.0)?;
            }
        }

        Ok(())
    }

    /// Ask the planner for the next target from `current` and reset the
    /// per-cell detection and stuck state.
    fn apply_decision(&mut self, current: Cell) -> Result<()> {
        match self.planner.decide(&mut self.map, current) {
            Ok(Decision::Target { cell, heading }) => {
                self.target = cell;
                self.target_heading = heading;
            }
            Ok(Decision::Complete) => {
                if !self.finished {
                    info!("exploration complete");
                    self.link.finish()?;
                    self.finished = true;
                }
            }
            Err(e) => {
                // Fatal: signal termination to the collaborator, then
                // surface the error without writing partial output
                error!(error = %e, "planning failed");
                self.link.finish().ok();
                return Err(e);
            }
        }

        self.detector.clear();
        self.motion.reset_stuck();
        Ok(())
    }
}
