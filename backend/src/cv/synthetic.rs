use std::thread;
use std::time::{Duration, Instant};

use crate::cv::{CameraConfig, CameraSource, Detection, ScoredFrame};
use crate::geometry::{BoundingBox, Size};

/// Frames in one loop of the scripted scene.
const SCENE_PERIOD: u64 = 120;

/// Scripted scene for running without a camera.
///
/// A person walks back and forth across the field of view, the room then
/// empties for ten frames and a cat shows up next to the person for ten
/// more. Every third frame also carries a weak spurious candidate that a
/// sane threshold filters out.
pub struct SyntheticCamera {
    config: CameraConfig,
    frame: u64,
    length: Option<u64>,
    pace: Option<Duration>,
    last: Option<Instant>,
    previewing: bool,
}

impl SyntheticCamera {
    pub fn new(config: CameraConfig) -> Self {
        let pace = (config.framerate > 0)
            .then(|| Duration::from_secs_f64(1. / config.framerate as f64));
        Self {
            config,
            frame: 0,
            length: None,
            pace,
            last: None,
            previewing: false,
        }
    }

    /// Produce frames as fast as they are pulled.
    pub fn unpaced(mut self) -> Self {
        self.pace = None;
        self
    }

    /// End the stream after `frames` results.
    pub fn with_length(mut self, frames: u64) -> Self {
        self.length = Some(frames);
        self
    }

    pub fn frames_produced(&self) -> u64 {
        self.frame
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    fn wait_for_next(&mut self) {
        if let Some(pace) = self.pace {
            if let Some(due) = self.last.map(|last| last + pace) {
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
            }
            self.last = Some(Instant::now());
        }
    }

    pub fn scene(&self, frame: u64) -> ScoredFrame {
        let Size { width, height } = self.config.resolution;
        let (w, h) = (width as i32 / 7, height as i32 * 2 / 5);

        let t = (frame % 100) as i32;
        let sweep = if t < 50 { t } else { 100 - t };
        let x = width as i32 / 10 + sweep * (width as i32 * 7 / 10 - w) / 50;
        let y = (height as i32 - h) / 2;
        let person = Detection::new(1, 0.82, BoundingBox::new(x, y, w, h));

        let mut objects = match frame % SCENE_PERIOD {
            100..=109 => vec![],
            110..=119 => {
                let cat = BoundingBox::new(x + w, y + h / 2, w / 2, h / 3);
                vec![person, Detection::new(2, 0.64, cat)]
            }
            _ => vec![person],
        };

        if frame % 3 == 0 {
            objects.push(Detection::new(
                9,
                0.12,
                BoundingBox::new(width as i32 - 60, 10, 50, 50),
            ));
        }

        ScoredFrame(objects)
    }
}

impl CameraSource for SyntheticCamera {
    type Raw = ScoredFrame;

    fn resolution(&self) -> Size {
        self.config.resolution
    }

    fn start_preview(&mut self) -> crate::Result<()> {
        log::info!(
            "synthetic camera: preview started ({}x{} @ {} fps, sensor mode {})",
            self.config.resolution.width,
            self.config.resolution.height,
            self.config.framerate,
            self.config.sensor_mode
        );
        self.previewing = true;
        Ok(())
    }

    fn stop_preview(&mut self) -> crate::Result<()> {
        log::info!("synthetic camera: preview stopped after {} frames", self.frame);
        self.previewing = false;
        Ok(())
    }

    fn next_result(&mut self) -> crate::Result<Option<ScoredFrame>> {
        if self.length.is_some_and(|len| self.frame >= len) {
            return Ok(None);
        }

        self.wait_for_next();
        let scene = self.scene(self.frame);
        self.frame += 1;

        Ok(Some(scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::{Detector, ThresholdDetector};

    fn camera() -> SyntheticCamera {
        SyntheticCamera::new(CameraConfig::default()).unpaced()
    }

    #[test]
    fn scene_stays_inside_the_sensor() {
        let cam = camera();
        for frame in 0..SCENE_PERIOD {
            for d in cam.scene(frame).0 {
                let b = d.bounding_box;
                assert!(b.x >= 0 && b.y >= 0, "frame {frame}: {b:?}");
                assert!(b.x + b.width <= 1640, "frame {frame}: {b:?}");
                assert!(b.y + b.height <= 1232, "frame {frame}: {b:?}");
            }
        }
    }

    #[test]
    fn scene_has_single_empty_and_crowded_stretches() {
        let cam = camera();
        let count = |frame| {
            ThresholdDetector
                .get_objects(&cam.scene(frame), 0.3)
                .unwrap()
                .len()
        };

        assert_eq!(count(0), 1);
        assert_eq!(count(99), 1);
        assert_eq!(count(100), 0);
        assert_eq!(count(110), 2);
        assert_eq!(count(120), 1);
    }

    #[test]
    fn stream_ends_at_length() {
        let mut cam = camera().with_length(3);
        let mut frames = 0;
        while cam.next_result().unwrap().is_some() {
            frames += 1;
        }
        assert_eq!(frames, 3);
        assert_eq!(cam.frames_produced(), 3);
    }
}
