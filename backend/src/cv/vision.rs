use std::path::Path;

use opencv::core::{Mat, Point as CvPoint, Rect as CvRect, Scalar, Size as CvSize, CV_32F, CV_8UC3};
use opencv::imgproc::{put_text, rectangle, FILLED, FONT_HERSHEY_PLAIN, LINE_8};
use opencv::{
    dnn, highgui,
    prelude::{
        MatTraitConst, MatTraitConstManual, NetTrait, VideoCaptureTrait, VideoCaptureTraitConst,
    },
    videoio::{self, VideoCapture},
};

use crate::cv::{CameraConfig, CameraSource, Detection, Detector};
use crate::geometry::{BoundingBox, Point, Rect, Size};
use crate::labels::Color;
use crate::overlay::Overlay;

const CAMERA_WINDOW: &str = "camera";
const OVERLAY_WINDOW: &str = "overlay";

/// Capture device opened through OpenCV. Frames go to the detector as-is.
pub struct OpenCvCamera {
    config: CameraConfig,
    source: Option<VideoCapture>,
    previewing: bool,
}

impl OpenCvCamera {
    pub fn connect(camera_id: i32, config: CameraConfig) -> crate::Result<Self> {
        let mut source = VideoCapture::new(camera_id, videoio::CAP_ANY)?;
        source.set(videoio::CAP_PROP_FRAME_WIDTH, config.resolution.width as f64)?;
        source.set(videoio::CAP_PROP_FRAME_HEIGHT, config.resolution.height as f64)?;
        source.set(videoio::CAP_PROP_FPS, config.framerate as f64)?;

        // The driver may not honour the request; detections come back in
        // whatever the device actually delivers.
        let delivered = Size::new(
            source.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
            source.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
        );
        if delivered != config.resolution {
            log::warn!(
                "camera {camera_id}: requested {}x{}, delivering {}x{}",
                config.resolution.width,
                config.resolution.height,
                delivered.width,
                delivered.height
            );
        }
        log::info!(
            "camera {camera_id}: {}x{} @ {} fps",
            delivered.width,
            delivered.height,
            config.framerate
        );

        Ok(Self {
            config: CameraConfig {
                resolution: delivered,
                ..config
            },
            source: Some(source),
            previewing: false,
        })
    }

    pub fn disconnect(&mut self) -> crate::Result<()> {
        if let Some(mut src) = self.source.take() {
            src.release()?;
        }

        Ok(())
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        if let Err(err) = self.disconnect() {
            log::warn!("failed to release camera: {err}");
        }
    }
}

impl CameraSource for OpenCvCamera {
    type Raw = Mat;

    fn resolution(&self) -> Size {
        self.config.resolution
    }

    fn start_preview(&mut self) -> crate::Result<()> {
        highgui::named_window(CAMERA_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        self.previewing = true;
        Ok(())
    }

    fn stop_preview(&mut self) -> crate::Result<()> {
        self.previewing = false;
        highgui::destroy_window(CAMERA_WINDOW)?;
        Ok(())
    }

    fn next_result(&mut self) -> crate::Result<Option<Mat>> {
        let Some(src) = &mut self.source else {
            return Ok(None);
        };

        let mut frame = Mat::default();
        if !src.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        if self.previewing {
            highgui::imshow(CAMERA_WINDOW, &frame)?;
        }

        Ok(Some(frame))
    }
}

/// SSD-style network whose single output holds rows of
/// `[batch, class, score, x1, y1, x2, y2]` with normalised corners.
pub struct SsdDetector {
    net: dnn::Net,
    input: CvSize,
}

impl SsdDetector {
    pub fn load(model: &Path, config: Option<&Path>) -> crate::Result<Self> {
        let config = config
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let net = dnn::read_net(&model.to_string_lossy(), &config, "")?;
        log::info!("loaded detection model {}", model.display());

        Ok(Self {
            net,
            input: CvSize::new(300, 300),
        })
    }
}

impl Detector for SsdDetector {
    type Raw = Mat;

    fn get_objects(&mut self, frame: &Mat, threshold: f32) -> crate::Result<Vec<Detection>> {
        let blob = dnn::blob_from_image(
            frame,
            1. / 127.5,
            self.input,
            Scalar::all(127.5),
            true,
            false,
            CV_32F,
        )?;
        self.net.set_input(&blob, "", 1., Scalar::default())?;
        let out = self.net.forward_single("")?;

        let (w, h) = (frame.cols() as f32, frame.rows() as f32);
        let mut objects = Vec::new();
        for row in out.data_typed::<f32>()?.chunks_exact(7) {
            let &[_, class, score, x1, y1, x2, y2] = row else {
                continue;
            };
            if score < threshold {
                continue;
            }

            let (x1, y1) = ((x1 * w) as i32, (y1 * h) as i32);
            let (x2, y2) = ((x2 * w) as i32, (y2 * h) as i32);
            objects.push(Detection::new(
                class as u32,
                score,
                BoundingBox::new(x1, y1, x2 - x1, y2 - y1),
            ));
        }

        Ok(objects)
    }
}

fn scalar(color: Color) -> Scalar {
    let (r, g, b) = color.rgb();
    Scalar::new(b as f64, g as f64, r as f64, 0.)
}

/// Annotation layer shown in its own window.
pub struct PreviewWindow {
    size: Size,
    canvas: Mat,
}

impl PreviewWindow {
    pub fn open(size: Size) -> crate::Result<Self> {
        highgui::named_window(OVERLAY_WINDOW, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            size,
            canvas: Self::blank(size)?,
        })
    }

    fn blank(size: Size) -> crate::Result<Mat> {
        Ok(Mat::new_rows_cols_with_default(
            size.height as i32,
            size.width as i32,
            CV_8UC3,
            Scalar::all(0.),
        )?)
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_window(OVERLAY_WINDOW) {
            log::warn!("failed to close overlay window: {err}");
        }
    }
}

impl Overlay for PreviewWindow {
    fn clear(&mut self) -> crate::Result<()> {
        self.canvas = Self::blank(self.size)?;
        Ok(())
    }

    fn bounding_box(
        &mut self,
        rect: Rect,
        fill: Option<Color>,
        outline: Color,
    ) -> crate::Result<()> {
        let r = CvRect::new(
            rect.x1 as i32,
            rect.y1 as i32,
            (rect.x2 - rect.x1) as i32,
            (rect.y2 - rect.y1) as i32,
        );
        if let Some(fill) = fill {
            rectangle(&mut self.canvas, r, scalar(fill), FILLED, LINE_8, 0)?;
        }
        rectangle(&mut self.canvas, r, scalar(outline), 1, LINE_8, 0)?;
        Ok(())
    }

    fn text(&mut self, position: Point, text: &str, color: Color) -> crate::Result<()> {
        put_text(
            &mut self.canvas,
            text,
            CvPoint::new(position.x as i32, position.y as i32 + 10),
            FONT_HERSHEY_PLAIN,
            1.,
            scalar(color),
            1,
            LINE_8,
            false,
        )?;
        Ok(())
    }

    fn update(&mut self) -> crate::Result<()> {
        highgui::imshow(OVERLAY_WINDOW, &self.canvas)?;
        highgui::wait_key(1)?;
        Ok(())
    }
}
