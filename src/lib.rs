//! VRCar - network teleoperation for an omni-wheel camera robot
//!
//! Two independent TCP channels bind an operator console to the robot:
//!
//! - A one-way camera stream (robot -> console) of length-prefixed
//!   compressed image frames.
//! - A low-latency control channel (console -> robot) carrying tagged
//!   movement and pan/tilt records.
//!
//! The console merges input from a prioritized list of render/input
//! providers each tick and transmits only changed command values. The robot
//! decodes commands into wheel duty cycles and servo angles.

pub mod config;
pub mod console;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod robot;

pub use config::AppConfig;
pub use error::{Error, Result};
