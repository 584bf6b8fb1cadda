use std::cell::Cell;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use serial2::SerialPort;

use crate::error::Error;

/// Servos accept angles in `[-SERVO_LIMIT, SERVO_LIMIT]` degrees.
pub const SERVO_LIMIT: f64 = 90.;

pub trait Servo {
    fn set_angle(&mut self, degrees: f64) -> crate::Result<()>;
}

/// An output that can be switched on for a short time, e.g. a relay.
pub trait PulseOutput {
    fn pulse(&mut self, on_time: Duration) -> crate::Result<()>;
}

fn check_angle(degrees: f64) -> crate::Result<f64> {
    if (-SERVO_LIMIT..=SERVO_LIMIT).contains(&degrees) {
        Ok(degrees)
    } else {
        Err(Error::AngleOutOfRange(degrees))
    }
}

/// Servo that only remembers where it was told to go.
///
/// Clones share state, so a clone kept aside observes the one in use.
#[derive(Debug, Clone, Default)]
pub struct SimServo {
    name: &'static str,
    angle: Rc<Cell<Option<f64>>>,
    moves: Rc<Cell<u64>>,
}

impl SimServo {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn angle(&self) -> Option<f64> {
        self.angle.get()
    }

    pub fn moves(&self) -> u64 {
        self.moves.get()
    }
}

impl Servo for SimServo {
    fn set_angle(&mut self, degrees: f64) -> crate::Result<()> {
        let degrees = check_angle(degrees)?;
        log::debug!("servo {}: {degrees:.1}°", self.name);
        self.angle.set(Some(degrees));
        self.moves.set(self.moves.get() + 1);
        Ok(())
    }
}

/// Relay stand-in counting its pulses. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SimTrigger {
    pulses: Rc<Cell<u64>>,
    last: Rc<Cell<Option<Duration>>>,
}

impl SimTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> u64 {
        self.pulses.get()
    }

    pub fn last_on_time(&self) -> Option<Duration> {
        self.last.get()
    }
}

impl PulseOutput for SimTrigger {
    fn pulse(&mut self, on_time: Duration) -> crate::Result<()> {
        log::debug!("trigger: pulse {}ms", on_time.as_millis());
        self.pulses.set(self.pulses.get() + 1);
        self.last.set(Some(on_time));
        Ok(())
    }
}

/// Line protocol understood by the servo controller firmware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `S<channel> <degrees>`
    Servo { channel: char, angle: f64 },
    /// `P<channel> <millis>`
    Pulse { channel: char, millis: u128 },
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Servo { channel, angle } => writeln!(f, "S{channel} {angle:.1}"),
            Self::Pulse { channel, millis } => writeln!(f, "P{channel} {millis}"),
        }
    }
}

/// Servo controller board on a serial port. Servos and the relay are
/// addressed by the pin letter they are wired to.
pub struct SerialController {
    port: Rc<SerialPort>,
}

impl SerialController {
    pub fn open(path: impl AsRef<Path>, baud_rate: u32) -> crate::Result<Self> {
        let path = path.as_ref();
        let port = SerialPort::open(path, baud_rate)?;
        log::info!("servo controller on {} @ {baud_rate} baud", path.display());

        Ok(Self {
            port: Rc::new(port),
        })
    }

    pub fn servo(&self, channel: char) -> SerialServo {
        SerialServo {
            port: Rc::clone(&self.port),
            channel,
        }
    }

    pub fn trigger(&self, channel: char) -> SerialTrigger {
        SerialTrigger {
            port: Rc::clone(&self.port),
            channel,
        }
    }
}

fn send(port: &SerialPort, command: Command) -> crate::Result<()> {
    port.write_all(command.to_string().as_bytes())?;
    Ok(())
}

pub struct SerialServo {
    port: Rc<SerialPort>,
    channel: char,
}

impl Servo for SerialServo {
    fn set_angle(&mut self, degrees: f64) -> crate::Result<()> {
        let angle = check_angle(degrees)?;
        send(
            &self.port,
            Command::Servo {
                channel: self.channel,
                angle,
            },
        )
    }
}

pub struct SerialTrigger {
    port: Rc<SerialPort>,
    channel: char,
}

impl PulseOutput for SerialTrigger {
    fn pulse(&mut self, on_time: Duration) -> crate::Result<()> {
        send(
            &self.port,
            Command::Pulse {
                channel: self.channel,
                millis: on_time.as_millis(),
            },
        )
    }
}
