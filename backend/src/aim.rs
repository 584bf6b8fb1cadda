//! Turns the overlay-space box of a lone target into servo angles and
//! decides when the trigger fires.

use crate::geometry::{Point, Rect, Size};

/// Linear map of `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Output ranges may be inverted (`out_min > out_max`).
pub fn remap(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimConfig {
    /// Overlay resolution the targets are expressed in.
    pub overlay: Size,
    /// Pan angle at the left and right overlay edges.
    pub x_range: (f64, f64),
    /// Tilt angle at the top and bottom overlay edges. Positive tilts down.
    pub y_range: (f64, f64),
    /// Commands are clamped to `[-limit, limit]` on both axes.
    pub limit: f64,
    /// Aimed frames needed before the trigger fires, minus one.
    pub countdown: i32,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            overlay: Size::new(320, 240),
            x_range: (75., -75.),
            y_range: (-90., 80.),
            limit: 90.,
            countdown: 20,
        }
    }
}

impl AimConfig {
    pub fn command_for(&self, center: Point) -> AimCommand {
        let x = remap(
            center.x,
            0.,
            self.overlay.width as f64,
            self.x_range.0,
            self.x_range.1,
        );
        let y = remap(
            center.y,
            0.,
            self.overlay.height as f64,
            self.y_range.0,
            self.y_range.1,
        );

        AimCommand {
            angle_x: x.clamp(-self.limit, self.limit),
            angle_y: y.clamp(-self.limit, self.limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimCommand {
    pub angle_x: f64,
    pub angle_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimState {
    pub countdown: i32,
    pub last_command: Option<AimCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimDecision {
    /// Nothing in view, countdown rewound.
    Reset,
    /// More than one candidate, state left untouched.
    Hold,
    Track {
        target: Point,
        command: AimCommand,
        countdown: i32,
    },
    Fire {
        target: Point,
        command: AimCommand,
    },
}

impl AimDecision {
    pub fn command(&self) -> Option<AimCommand> {
        match self {
            Self::Track { command, .. } | Self::Fire { command, .. } => Some(*command),
            Self::Reset | Self::Hold => None,
        }
    }

    pub fn fired(&self) -> bool {
        matches!(self, Self::Fire { .. })
    }
}

#[derive(Debug, Clone)]
pub struct AimController {
    config: AimConfig,
    state: AimState,
}

impl Default for AimController {
    fn default() -> Self {
        Self::new(AimConfig::default())
    }
}

impl AimController {
    pub fn new(config: AimConfig) -> Self {
        Self {
            state: AimState {
                countdown: config.countdown,
                last_command: None,
            },
            config,
        }
    }

    pub fn config(&self) -> &AimConfig {
        &self.config
    }

    pub fn state(&self) -> &AimState {
        &self.state
    }

    /// Advances one frame given every target's box in overlay space.
    ///
    /// Only a frame with exactly one target aims and counts down. An empty
    /// frame rewinds the countdown; a crowded one changes nothing.
    pub fn step(&mut self, targets: &[Rect]) -> AimDecision {
        let target = match targets {
            [] => {
                self.state.countdown = self.config.countdown;
                return AimDecision::Reset;
            }
            [only] => only.center(),
            _ => return AimDecision::Hold,
        };

        let command = self.config.command_for(target);
        self.state.last_command = Some(command);
        self.state.countdown -= 1;

        if self.state.countdown == -1 {
            self.state.countdown = self.config.countdown;
            AimDecision::Fire { target, command }
        } else {
            AimDecision::Track {
                target,
                command,
                countdown: self.state.countdown,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_at(x: f64, y: f64) -> Rect {
        Rect::new(x - 10., y - 10., x + 10., y + 10.)
    }

    #[test]
    fn remap_handles_inverted_ranges() {
        assert_eq!(remap(0., 0., 320., 75., -75.), 75.);
        assert_eq!(remap(320., 0., 320., 75., -75.), -75.);
        assert_eq!(remap(160., 0., 320., 75., -75.), 0.);
        assert_eq!(remap(120., 0., 240., -90., 80.), -5.);
    }

    #[test]
    fn center_of_overlay_points_nearly_level() {
        let cmd = AimConfig::default().command_for(Point::new(160., 120.));
        assert_eq!(cmd, AimCommand { angle_x: 0., angle_y: -5. });
    }

    #[test]
    fn angles_clamp_to_limits() {
        let config = AimConfig::default();

        let far_left_above = config.command_for(Point::new(-1000., -1000.));
        assert_eq!(far_left_above.angle_x, 90.);
        assert_eq!(far_left_above.angle_y, -90.);

        let far_right_below = config.command_for(Point::new(5000., 5000.));
        assert_eq!(far_right_below.angle_x, -90.);
        assert_eq!(far_right_below.angle_y, 90.);
    }

    #[test]
    fn in_range_angles_are_not_clamped() {
        let cmd = AimConfig::default().command_for(Point::new(0., 240.));
        assert_eq!(cmd, AimCommand { angle_x: 75., angle_y: 80. });
    }

    #[test]
    fn fires_on_twenty_first_aimed_frame() {
        let mut aim = AimController::default();
        let target = [centered_at(160., 120.)];

        for expected in (0..20).rev() {
            match aim.step(&target) {
                AimDecision::Track { countdown, .. } => assert_eq!(countdown, expected),
                other => panic!("unexpected {other:?}"),
            }
        }

        let decision = aim.step(&target);
        assert!(decision.fired());
        assert_eq!(
            decision.command(),
            Some(AimCommand { angle_x: 0., angle_y: -5. })
        );
        assert_eq!(aim.state().countdown, 20);

        assert!(!aim.step(&target).fired());
        assert_eq!(aim.state().countdown, 19);
    }

    #[test]
    fn empty_frame_rewinds_without_firing() {
        let mut aim = AimController::default();
        let target = [centered_at(40., 40.)];
        for _ in 0..15 {
            aim.step(&target);
        }
        assert_eq!(aim.state().countdown, 5);

        assert_eq!(aim.step(&[]), AimDecision::Reset);
        assert_eq!(aim.state().countdown, 20);
        assert!(aim.state().last_command.is_some());
    }

    #[test]
    fn crowded_frame_holds_state() {
        let mut aim = AimController::default();
        aim.step(&[centered_at(100., 100.)]);
        let before = *aim.state();

        let decision = aim.step(&[centered_at(10., 10.), centered_at(300., 200.)]);

        assert_eq!(decision, AimDecision::Hold);
        assert_eq!(decision.command(), None);
        assert_eq!(*aim.state(), before);
    }

    #[test]
    fn countdown_stays_within_bounds() {
        let mut aim = AimController::new(AimConfig {
            countdown: 3,
            ..AimConfig::default()
        });
        let one = [centered_at(1., 1.)];
        let two = [centered_at(1., 1.), centered_at(2., 2.)];

        for i in 0..100 {
            match i % 7 {
                0 => aim.step(&[]),
                5 => aim.step(&two),
                _ => aim.step(&one),
            };
            assert!((0..=3).contains(&aim.state().countdown));
        }
    }
}
