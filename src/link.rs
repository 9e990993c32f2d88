//! Boundary to the sensing/actuation collaborator.
//!
//! The agent is transport-agnostic: anything that can produce a
//! [`SensorFrame`] per tick and accept wheel powers can drive it. The
//! real simulator client lives outside this crate; the in-crate
//! [`crate::harness`] provides a simulated implementation for tests.

use crate::error::Result;

/// Number of elements in the binary line sensor.
pub const LINE_ELEMENTS: usize = 7;

/// Index of the center line-sensor element.
pub const LINE_CENTER: usize = 3;

/// One sensor snapshot, produced by the collaborator once per tick.
///
/// The blocking read of the next frame paces the control loop; its
/// period must match the configured PID sample interval.
#[derive(Clone, Debug)]
pub struct SensorFrame {
    /// Binary line readings, indexed symmetrically around the center
    /// element (index 3)
    pub line: [bool; LINE_ELEMENTS],
    /// Compass heading in degrees, range (-180, 180]
    pub compass: f32,
    /// Continuous position estimate
    pub x: f32,
    pub y: f32,
    /// Numbered ground marker beneath the robot, if any
    pub ground: Option<u32>,
    /// Elapsed simulation time
    pub time: u32,
    /// Run-control flags from the collaborator
    pub start: bool,
    pub stop: bool,
    /// End-of-run signal; the agent must exit when set
    pub end: bool,
    /// Cumulative score as reported by the collaborator
    pub score: i32,
}

impl Default for SensorFrame {
    fn default() -> Self {
        Self {
            line: [false; LINE_ELEMENTS],
            compass: 0.0,
            x: 0.0,
            y: 0.0,
            ground: None,
            time: 0,
            start: false,
            stop: false,
            end: false,
            score: 0,
        }
    }
}

/// Capability set consumed from the sensing/actuation collaborator.
pub trait RobotLink {
    /// Block until the next sensor frame is available.
    fn read_sensors(&mut self) -> Result<SensorFrame>;

    /// Command wheel powers, each typically in [-0.15, 0.15].
    fn drive_motors(&mut self, left: f32, right: f32) -> Result<()>;

    /// Signal voluntary mission termination to the collaborator.
    fn finish(&mut self) -> Result<()>;

    /// Total simulation time budget in ticks.
    fn sim_time(&self) -> u32;
}
