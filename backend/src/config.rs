use std::path::PathBuf;
use std::str::FromStr;

use crate::aim::AimConfig;
use crate::cv::CameraConfig;
use crate::error::Error;
use crate::session::DEFAULT_THRESHOLD;
use crate::turret::TriggerConfig;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Everything the turret needs to start, defaulting to the bench setup:
/// full-FoV capture, a 320x240 annotation layer and simulated hardware.
#[derive(Debug, Clone, PartialEq)]
pub struct TurretConfig {
    pub camera: CameraConfig,
    /// Camera index for a real capture device, otherwise the synthetic scene.
    pub camera_index: Option<i32>,
    /// Detections recorded as JSON lines, replayed instead of a camera.
    pub replay: Option<PathBuf>,
    /// Detection network weights and config for a real capture device.
    pub model: Option<PathBuf>,
    pub model_config: Option<PathBuf>,
    pub threshold: f32,
    pub aim: AimConfig,
    pub trigger: TriggerConfig,
    /// Servo controller port; servos are simulated without one.
    pub serial_port: Option<PathBuf>,
    pub baud_rate: u32,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            camera_index: None,
            replay: None,
            model: None,
            model_config: None,
            threshold: DEFAULT_THRESHOLD,
            aim: AimConfig::default(),
            trigger: TriggerConfig::default(),
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> crate::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig { key, value })
}

impl TurretConfig {
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` knows about the `TURRET_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("TURRET_SERIAL_PORT") {
            cfg.serial_port = Some(PathBuf::from(port));
        }
        if let Some(baud) = get("TURRET_BAUD_RATE") {
            cfg.baud_rate = parse("TURRET_BAUD_RATE", baud)?;
        }
        if let Some(path) = get("TURRET_REPLAY") {
            cfg.replay = Some(PathBuf::from(path));
        }
        if let Some(index) = get("TURRET_CAMERA_INDEX") {
            cfg.camera_index = Some(parse("TURRET_CAMERA_INDEX", index)?);
        }
        if let Some(model) = get("TURRET_MODEL") {
            cfg.model = Some(PathBuf::from(model));
        }
        if let Some(config) = get("TURRET_MODEL_CONFIG") {
            cfg.model_config = Some(PathBuf::from(config));
        }

        if cfg.replay.is_some() && cfg.camera_index.is_some() {
            log::warn!("TURRET_REPLAY is set, ignoring TURRET_CAMERA_INDEX");
            cfg.camera_index = None;
        }

        Ok(cfg)
    }
}
