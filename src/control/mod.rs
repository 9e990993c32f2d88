//! Control: discrete PID law and the wheel-level motion controller.

pub mod motion;
pub mod pid;

pub use motion::{MotionController, MotionStep};
pub use pid::Pid;
