use std::path::PathBuf;

use serial2::SerialPort;

pub mod actuator;
pub mod aim;
pub mod config;
pub mod cv;
pub mod error;
pub mod geometry;
pub mod labels;
pub mod overlay;
pub mod session;
pub mod turret;

pub use crate::config::TurretConfig;
pub use crate::session::{RunStats, Session};
pub use crate::turret::{Actuators, Annotator, FrameHandler, Turret};

pub(crate) use crate::error::Result;

/// Serial ports a servo controller could be attached to.
pub fn list_devices() -> Result<Vec<PathBuf>> {
    Ok(SerialPort::available_ports()?)
}
