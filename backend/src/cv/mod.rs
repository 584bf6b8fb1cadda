use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Size};
use crate::labels::ObjectKind;

pub mod replay;
pub mod synthetic;
#[cfg(feature = "opencv")]
pub mod vision;

/// One recognised object in one frame, in capture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    #[serde(default = "full_score")]
    pub score: f32,
    pub bounding_box: BoundingBox,
}

fn full_score() -> f32 {
    1.
}

impl Detection {
    pub fn new(class_id: u32, score: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_id,
            score,
            bounding_box,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_class_id(self.class_id)
    }
}

/// Fixed capture settings. Inference runs at this resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub sensor_mode: u8,
    pub resolution: Size,
    pub framerate: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        // Sensor mode 4 is the full field of view at 1640x1232.
        Self {
            sensor_mode: 4,
            resolution: Size::new(1640, 1232),
            framerate: 10,
        }
    }
}

/// A camera with an attached inference engine.
pub trait CameraSource {
    /// Whatever the inference engine hands back for one frame.
    type Raw;

    fn resolution(&self) -> Size;

    fn start_preview(&mut self) -> crate::Result<()>;

    fn stop_preview(&mut self) -> crate::Result<()>;

    /// Blocks until the next inference result. `None` once the stream ends.
    fn next_result(&mut self) -> crate::Result<Option<Self::Raw>>;
}

pub trait Detector {
    type Raw;

    /// Decodes the objects scoring at least `threshold`.
    fn get_objects(&mut self, raw: &Self::Raw, threshold: f32) -> crate::Result<Vec<Detection>>;
}

/// Keeps the camera preview running for as long as it lives.
pub struct Preview<'a, C: CameraSource> {
    camera: &'a mut C,
}

impl<'a, C: CameraSource> Preview<'a, C> {
    pub fn start(camera: &'a mut C) -> crate::Result<Self> {
        camera.start_preview()?;
        Ok(Self { camera })
    }
}

impl<C: CameraSource> Deref for Preview<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.camera
    }
}

impl<C: CameraSource> DerefMut for Preview<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.camera
    }
}

impl<C: CameraSource> Drop for Preview<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_preview() {
            log::warn!("failed to stop preview: {err}");
        }
    }
}

/// Detection candidates with their scores, before thresholding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoredFrame(pub Vec<Detection>);

/// Detector for sources that already carry scored candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdDetector;

impl Detector for ThresholdDetector {
    type Raw = ScoredFrame;

    fn get_objects(&mut self, raw: &ScoredFrame, threshold: f32) -> crate::Result<Vec<Detection>> {
        Ok(raw
            .0
            .iter()
            .filter(|d| d.score >= threshold)
            .copied()
            .collect())
    }
}
