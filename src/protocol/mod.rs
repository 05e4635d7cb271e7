//! Wire protocol shared by both ends of the session.
//!
//! - [`command`]: tagged control records (movement axes, pan/tilt angles)
//! - [`framing`]: length-prefixed camera frame stream

pub mod command;
pub mod framing;

pub use command::{clamp_angle, Command, ControlState};
pub use framing::{FrameReader, FrameWriter};
