//! # Rekha-Nav: Line-Maze Exploration Agent
//!
//! A navigation agent for differential-drive robots in line-marked grid
//! mazes. The agent fuses a 7-element binary line sensor and a compass
//! bearing into a discrete cell graph, follows line segments under PID
//! control, detects intersections while crossing cell centers, explores
//! with greedy frontier selection backed by A* replanning, and exports a
//! closed tour of discovered checkpoints at mission end.
//!
//! ## Control flow per tick
//!
//! ```text
//! raw sensors -> line filter/estimator -> orientation tracker
//!             -> intersection detector -> (at cell center)
//!             -> map builder -> planner -> motion controller
//!             -> wheel powers
//! ```
//!
//! The map builder and planner only run when the robot reaches its
//! current target cell; the motion controller runs every tick.
//!
//! ## Architecture
//!
//! - [`link`]: the collaborator boundary ([`RobotLink`], [`SensorFrame`])
//! - [`perception`]: line-position estimation, heading/cell tracking,
//!   intersection detection
//! - [`mapping`]: the cell-graph map ([`MazeMap`])
//! - [`planning`]: greedy frontier planner and A* search
//! - [`control`]: PID law and the wheel-level motion controller
//! - [`agent`]: the per-tick orchestration loop ([`MazeAgent`])
//! - [`tour`]: checkpoint recording and tour export
//! - [`harness`]: simulated maze environment for integration tests
//!
//! The transport to the real simulator is out of scope; anything that
//! implements [`RobotLink`] can drive the agent.

pub mod agent;
pub mod config;
pub mod control;
pub mod error;
pub mod harness;
pub mod link;
pub mod mapping;
pub mod perception;
pub mod planning;
pub mod tour;

pub use agent::MazeAgent;
pub use config::RekhaConfig;
pub use error::{RekhaError, Result};
pub use link::{RobotLink, SensorFrame};
pub use mapping::{Cell, MazeMap};
pub use perception::{Heading, Turn};
