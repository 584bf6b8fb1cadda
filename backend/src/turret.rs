use std::time::Duration;

use crate::actuator::{PulseOutput, Servo};
use crate::aim::{AimCommand, AimController, AimDecision, AimState};
use crate::cv::Detection;
use crate::geometry::{Rect, Scale, Size};
use crate::overlay::Overlay;

/// Reacts to the detections of one frame. The overlay is already cleared
/// and is presented after the call returns.
pub trait FrameHandler {
    /// Called once the preview is up, with the size of the frames the
    /// detections will be expressed in.
    fn begin(&mut self, _capture: Size) -> crate::Result<()> {
        Ok(())
    }

    fn handle<O: Overlay>(&mut self, detections: &[Detection], overlay: &mut O)
        -> crate::Result<()>;
}

/// Draws a labelled box around every detection.
#[derive(Debug, Clone, Copy)]
pub struct Annotator {
    overlay: Size,
    scale: Scale,
}

impl Annotator {
    pub fn new(capture: Size, overlay: Size) -> Self {
        Self {
            overlay,
            scale: Scale::between(capture, overlay),
        }
    }

    /// Follow the resolution the camera actually delivers.
    pub fn rescale(&mut self, capture: Size) {
        self.scale = Scale::between(capture, self.overlay);
    }

    /// Draws every detection and returns their boxes in overlay space.
    pub fn draw<O: Overlay>(
        &self,
        detections: &[Detection],
        overlay: &mut O,
    ) -> crate::Result<Vec<Rect>> {
        let mut rects = Vec::with_capacity(detections.len());
        for d in detections {
            let kind = d.kind();
            log::debug!("detected {} ({}) score {:.2}", d.class_id, kind, d.score);

            let rect = self.scale.transform(&d.bounding_box);
            overlay.bounding_box(rect, None, kind.color())?;
            overlay.text(
                self.scale.origin(&d.bounding_box),
                kind.name(),
                kind.color(),
            )?;
            rects.push(rect);
        }

        Ok(rects)
    }
}

impl FrameHandler for Annotator {
    fn begin(&mut self, capture: Size) -> crate::Result<()> {
        self.rescale(capture);
        Ok(())
    }

    fn handle<O: Overlay>(
        &mut self,
        detections: &[Detection],
        overlay: &mut O,
    ) -> crate::Result<()> {
        self.draw(detections, overlay)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerConfig {
    /// Blip on start-up so the operator hears the relay is wired.
    pub arm: Duration,
    pub fire: Duration,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            arm: Duration::from_millis(50),
            fire: Duration::from_millis(500),
        }
    }
}

pub struct Actuators {
    pub pan: Box<dyn Servo>,
    pub tilt: Box<dyn Servo>,
    pub trigger: Box<dyn PulseOutput>,
}

/// Annotates like [`Annotator`], then points at a lone target and fires
/// once it has held still in view long enough.
pub struct Turret {
    annotator: Annotator,
    aim: AimController,
    actuators: Actuators,
    triggers: TriggerConfig,
    shots: u64,
}

impl Turret {
    pub fn new(
        annotator: Annotator,
        aim: AimController,
        actuators: Actuators,
        triggers: TriggerConfig,
    ) -> Self {
        Self {
            annotator,
            aim,
            actuators,
            triggers,
            shots: 0,
        }
    }

    pub fn arm(&mut self) -> crate::Result<()> {
        self.actuators.trigger.pulse(self.triggers.arm)
    }

    pub fn aim_state(&self) -> &AimState {
        self.aim.state()
    }

    pub fn shots(&self) -> u64 {
        self.shots
    }

    fn point(&mut self, command: AimCommand) -> crate::Result<()> {
        self.actuators.pan.set_angle(command.angle_x)?;
        self.actuators.tilt.set_angle(command.angle_y)
    }
}

impl FrameHandler for Turret {
    fn begin(&mut self, capture: Size) -> crate::Result<()> {
        self.annotator.rescale(capture);
        Ok(())
    }

    fn handle<O: Overlay>(
        &mut self,
        detections: &[Detection],
        overlay: &mut O,
    ) -> crate::Result<()> {
        let rects = self.annotator.draw(detections, overlay)?;
        let decision = self.aim.step(&rects);

        let (target, command) = match decision {
            AimDecision::Track {
                target, command, ..
            }
            | AimDecision::Fire { target, command } => (target, command),
            AimDecision::Reset | AimDecision::Hold => return Ok(()),
        };
        let Some(color) = detections.first().map(|d| d.kind().color()) else {
            return Ok(());
        };

        log::debug!("x {:.1} -> {:.1}°", target.x, command.angle_x);
        log::debug!("y {:.1} -> {:.1}°", target.y, command.angle_y);
        self.point(command)?;

        match decision {
            AimDecision::Fire { .. } => {
                self.shots += 1;
                log::info!(
                    "firing at ({:.0}, {:.0}), shot {}",
                    target.x,
                    target.y,
                    self.shots
                );
                overlay.text(target, "Squirt!!", color)?;
                self.actuators.trigger.pulse(self.triggers.fire)?;
            }
            AimDecision::Track { countdown, .. } => {
                overlay.text(target, &countdown.to_string(), color)?;
            }
            AimDecision::Reset | AimDecision::Hold => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{SimServo, SimTrigger};
    use crate::geometry::BoundingBox;
    use crate::labels::Color;
    use crate::overlay::{DrawOp, RecordingOverlay};

    const CAPTURE: Size = Size::new(1640, 1232);
    const OVERLAY: Size = Size::new(320, 240);

    #[test]
    fn annotator_labels_every_detection() {
        let mut overlay = RecordingOverlay::new();
        let detections = [
            Detection::new(1, 0.9, BoundingBox::new(0, 0, 164, 123)),
            Detection::new(42, 0.5, BoundingBox::new(820, 616, 164, 123)),
        ];

        Annotator::new(CAPTURE, OVERLAY)
            .handle(&detections, &mut overlay)
            .unwrap();
        overlay.update().unwrap();

        let ops = overlay.presented();
        assert_eq!(ops.len(), 4);
        assert!(matches!(
            ops[0],
            DrawOp::Box {
                fill: None,
                outline: Color::Blue,
                ..
            }
        ));
        assert_eq!(overlay.texts().collect::<Vec<_>>(), vec!["person", "other"]);
        match &ops[3] {
            DrawOp::Text {
                position, color, ..
            } => {
                assert_eq!(*color, Color::Red);
                assert!((position.x - 160.).abs() < 1e-9);
                assert!((position.y - 120.).abs() < 1e-9);
            }
            op => panic!("unexpected {op:?}"),
        }
    }

    #[test]
    fn annotator_follows_the_delivered_resolution() {
        let mut annotator = Annotator::new(CAPTURE, OVERLAY);
        annotator.begin(Size::new(640, 480)).unwrap();

        let mut overlay = RecordingOverlay::new();
        let right_half = [Detection::new(1, 0.9, BoundingBox::new(320, 0, 320, 480))];
        annotator.handle(&right_half, &mut overlay).unwrap();
        overlay.update().unwrap();

        assert_eq!(
            overlay.presented()[0],
            DrawOp::Box {
                rect: Rect::new(160., 0., 320., 240.),
                fill: None,
                outline: Color::Blue,
            }
        );
    }

    #[test]
    fn turret_points_and_counts_down_on_screen() {
        let pan = SimServo::new("pan");
        let tilt = SimServo::new("tilt");
        let trigger = SimTrigger::new();
        let mut turret = Turret::new(
            Annotator::new(CAPTURE, OVERLAY),
            AimController::default(),
            Actuators {
                pan: Box::new(pan.clone()),
                tilt: Box::new(tilt.clone()),
                trigger: Box::new(trigger.clone()),
            },
            TriggerConfig::default(),
        );
        turret.arm().unwrap();
        assert_eq!(trigger.pulses(), 1);

        let mut overlay = RecordingOverlay::new();
        // Whole frame: centre lands on the middle of the overlay.
        let cat = [Detection::new(2, 0.7, BoundingBox::new(0, 0, 1640, 1232))];
        turret.handle(&cat, &mut overlay).unwrap();
        overlay.update().unwrap();

        assert!(pan.angle().is_some_and(|a| a.abs() < 1e-9));
        assert!(tilt.angle().is_some_and(|a| (a + 5.).abs() < 1e-9));
        assert_eq!(overlay.texts().collect::<Vec<_>>(), vec!["cat", "19"]);
        assert_eq!(trigger.pulses(), 1);
        assert_eq!(turret.shots(), 0);
    }

    #[test]
    fn crowded_frame_only_annotates() {
        let pan = SimServo::new("pan");
        let mut turret = Turret::new(
            Annotator::new(CAPTURE, OVERLAY),
            AimController::default(),
            Actuators {
                pan: Box::new(pan.clone()),
                tilt: Box::new(SimServo::new("tilt")),
                trigger: Box::new(SimTrigger::new()),
            },
            TriggerConfig::default(),
        );
        let mut overlay = RecordingOverlay::new();
        let pair = [
            Detection::new(1, 0.9, BoundingBox::new(0, 0, 100, 100)),
            Detection::new(3, 0.9, BoundingBox::new(900, 600, 100, 100)),
        ];

        turret.handle(&pair, &mut overlay).unwrap();
        overlay.update().unwrap();

        assert_eq!(pan.moves(), 0);
        assert_eq!(turret.aim_state().countdown, 20);
        assert_eq!(overlay.texts().collect::<Vec<_>>(), vec!["person", "dog"]);
    }
}
