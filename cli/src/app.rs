use backend::actuator::{SerialController, SimServo, SimTrigger};
use backend::aim::{AimController, AimState};
use backend::cv::replay::ReplaySource;
use backend::cv::synthetic::SyntheticCamera;
use backend::cv::{CameraSource, Detector, ThresholdDetector};
use backend::overlay::{Overlay, RecordingOverlay};
use backend::{
    list_devices, Actuators, Annotator, FrameHandler, RunStats, Session, Turret, TurretConfig,
};
use clap::Parser;

#[cfg(feature = "opencv")]
use backend::cv::vision::{OpenCvCamera, PreviewWindow, SsdDetector};

/// Pins the servos and relay are wired to on the controller board.
const PAN_CHANNEL: char = 'B';
const TILT_CHANNEL: char = 'A';
const TRIGGER_CHANNEL: char = 'C';

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Sets the number of frames to run for, otherwise runs forever.
    #[arg(long = "num_frames", short = 'n')]
    pub num_frames: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Draw boxes and labels only.
    Annotate,
    /// Also aim the servos and fire the relay.
    Turret,
}

/// What a run did, beyond the frame loop itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub stats: RunStats,
    /// Final aim state and shots fired, turret mode only.
    pub aim: Option<AimState>,
    pub shots: u64,
}

pub struct App {
    config: TurretConfig,
    num_frames: Option<u64>,
    actuators: Option<Actuators>,
}

impl App {
    pub fn new(config: TurretConfig, args: &Args) -> Self {
        Self {
            config,
            num_frames: args.num_frames,
            actuators: None,
        }
    }

    /// Drive these instead of the ones the configuration describes.
    pub fn with_actuators(mut self, actuators: Actuators) -> Self {
        self.actuators = Some(actuators);
        self
    }

    pub fn from_env(args: &Args) -> crate::Result<Self> {
        Ok(Self::new(TurretConfig::from_env()?, args))
    }

    pub fn run(&mut self, mode: Mode) -> crate::Result<Report> {
        let mut annotator = Annotator::new(self.config.camera.resolution, self.config.aim.overlay);

        match mode {
            Mode::Annotate => Ok(Report {
                stats: self.pick_source(&mut annotator)?,
                aim: None,
                shots: 0,
            }),
            Mode::Turret => {
                let actuators = match self.actuators.take() {
                    Some(actuators) => actuators,
                    None => self.open_actuators()?,
                };
                let mut turret = Turret::new(
                    annotator,
                    AimController::new(self.config.aim),
                    actuators,
                    self.config.trigger,
                );
                turret.arm()?;
                let stats = self.pick_source(&mut turret)?;
                log::info!("fired {} shots", turret.shots());

                Ok(Report {
                    stats,
                    aim: Some(*turret.aim_state()),
                    shots: turret.shots(),
                })
            }
        }
    }

    fn open_actuators(&self) -> crate::Result<Actuators> {
        let Some(port) = &self.config.serial_port else {
            match list_devices() {
                Ok(ports) if !ports.is_empty() => log::info!(
                    "no TURRET_SERIAL_PORT set, simulating servos (available: {})",
                    ports
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                Ok(_) => log::info!("no TURRET_SERIAL_PORT set, simulating servos"),
                Err(err) => log::warn!("could not list serial ports: {err}"),
            }

            return Ok(Actuators {
                pan: Box::new(SimServo::new("pan")),
                tilt: Box::new(SimServo::new("tilt")),
                trigger: Box::new(SimTrigger::new()),
            });
        };

        let controller = SerialController::open(port, self.config.baud_rate)?;
        Ok(Actuators {
            pan: Box::new(controller.servo(PAN_CHANNEL)),
            tilt: Box::new(controller.servo(TILT_CHANNEL)),
            trigger: Box::new(controller.trigger(TRIGGER_CHANNEL)),
        })
    }

    fn pick_source<H: FrameHandler>(&self, handler: &mut H) -> crate::Result<RunStats> {
        if let Some(path) = &self.config.replay {
            let source = ReplaySource::open(path, self.config.camera)?;
            return self.drive(source, ThresholdDetector, handler, &mut RecordingOverlay::new());
        }

        if let Some(index) = self.config.camera_index {
            #[cfg(feature = "opencv")]
            {
                let model = self
                    .config
                    .model
                    .as_deref()
                    .ok_or(crate::Error::MissingModel)?;
                let detector = SsdDetector::load(model, self.config.model_config.as_deref())?;
                let camera = OpenCvCamera::connect(index, self.config.camera)?;
                let mut window = PreviewWindow::open(self.config.aim.overlay)?;
                return self.drive(camera, detector, handler, &mut window);
            }
            #[cfg(not(feature = "opencv"))]
            log::warn!("camera {index} requested but built without opencv, using the synthetic scene");
        }

        let camera = SyntheticCamera::new(self.config.camera);
        self.drive(camera, ThresholdDetector, handler, &mut RecordingOverlay::new())
    }

    fn drive<C, D, H, O>(
        &self,
        camera: C,
        detector: D,
        handler: &mut H,
        overlay: &mut O,
    ) -> crate::Result<RunStats>
    where
        C: CameraSource,
        D: Detector<Raw = C::Raw>,
        H: FrameHandler,
        O: Overlay,
    {
        let mut session = Session::new(camera, detector)
            .with_threshold(self.config.threshold)
            .with_frame_limit(self.num_frames);

        Ok(session.run(handler, overlay)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_frame_limit() {
        let args = Args::try_parse_from(["turret", "--num_frames", "12"]).unwrap();
        assert_eq!(args.num_frames, Some(12));

        let args = Args::try_parse_from(["turret", "-n", "3"]).unwrap();
        assert_eq!(args.num_frames, Some(3));

        let args = Args::try_parse_from(["turret"]).unwrap();
        assert_eq!(args.num_frames, None);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["turret", "--fps", "5"]).is_err());
    }

    #[test]
    fn turret_runs_a_replay_with_simulated_hardware() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for _ in 0..25 {
            writeln!(
                file,
                r#"[{{"class_id": 1, "score": 0.9, "bounding_box": [615, 462, 410, 308]}}]"#
            )
            .unwrap();
        }

        let config = TurretConfig {
            replay: Some(file.path().to_path_buf()),
            ..TurretConfig::default()
        };
        let pan = SimServo::new("pan");
        let trigger = SimTrigger::new();
        let mut app = App::new(config, &Args { num_frames: Some(22) }).with_actuators(Actuators {
            pan: Box::new(pan.clone()),
            tilt: Box::new(SimServo::new("tilt")),
            trigger: Box::new(trigger.clone()),
        });

        let report = app.run(Mode::Turret).unwrap();
        assert_eq!(report.stats.frames, 22);
        assert_eq!(report.stats.detections, 22);
        assert_eq!(report.shots, 1);
        assert_eq!(report.aim.map(|aim| aim.countdown), Some(19));
        // Start-up blip plus one shot.
        assert_eq!(trigger.pulses(), 2);
        assert_eq!(trigger.last_on_time(), Some(TurretConfig::default().trigger.fire));
        assert_eq!(pan.moves(), 22);
    }

    #[test]
    fn annotate_runs_the_synthetic_scene() {
        let mut config = TurretConfig::default();
        // Unpaced runs are not configurable; a fast frame rate keeps this short.
        config.camera.framerate = 1000;
        let mut app = App::new(config, &Args { num_frames: Some(5) });

        let report = app.run(Mode::Annotate).unwrap();
        assert_eq!(report.stats.frames, 5);
        assert_eq!(report.aim, None);
        assert_eq!(report.shots, 0);
    }
}
