use crate::cv::{CameraSource, Detector, Preview};
use crate::overlay::Overlay;
use crate::turret::FrameHandler;

/// Minimum detector score for an object to be drawn or aimed at.
pub const DEFAULT_THRESHOLD: f32 = 0.3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub detections: u64,
}

/// Frame loop: pull a result, decode it, let the handler draw and act,
/// present the overlay.
pub struct Session<C, D> {
    camera: C,
    detector: D,
    threshold: f32,
    num_frames: Option<u64>,
}

impl<C, D> Session<C, D>
where
    C: CameraSource,
    D: Detector<Raw = C::Raw>,
{
    pub fn new(camera: C, detector: D) -> Self {
        Self {
            camera,
            detector,
            threshold: DEFAULT_THRESHOLD,
            num_frames: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Stop after `num_frames` frames, `None` runs until the camera stops.
    pub fn with_frame_limit(mut self, num_frames: Option<u64>) -> Self {
        self.num_frames = num_frames;
        self
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// The preview runs for the duration of the call and is stopped on
    /// every exit path.
    pub fn run<H, O>(&mut self, handler: &mut H, overlay: &mut O) -> crate::Result<RunStats>
    where
        H: FrameHandler,
        O: Overlay,
    {
        let mut preview = Preview::start(&mut self.camera)?;
        handler.begin(preview.resolution())?;
        let mut stats = RunStats::default();

        while self.num_frames.map_or(true, |limit| stats.frames < limit) {
            let Some(raw) = preview.next_result()? else {
                log::info!("camera stream ended");
                break;
            };

            let detections = self.detector.get_objects(&raw, self.threshold)?;
            overlay.clear()?;
            handler.handle(&detections, overlay)?;
            overlay.update()?;

            stats.frames += 1;
            stats.detections += detections.len() as u64;
        }

        Ok(stats)
    }
}
