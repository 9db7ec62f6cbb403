//! Gyroscope tilt to a single pad direction
//!
//! The selected rate axis is integrated into an angle; the output is a
//! Schmitt trigger around that angle: pressed past `threshold`, released
//! once the angle falls back below `threshold - delta`. An optional chord
//! of trigger buttons gates the mapping, and the angle is re-zeroed each
//! time the chord becomes fully held so the neutral position is wherever
//! the controller was at that moment.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::ConfigError;
use crate::input::{GyroSample, InputListener, SourceButton};
use crate::output::{OutputButton, OutputSink};

use super::integrator::AngleIntegrator;

pub const DEFAULT_THRESHOLD_DEGREES: f32 = 20.0;
pub const DEFAULT_DELTA_DEGREES: f32 = 3.0;

/// Signed gyro axis; the sign selects which rotation direction presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GyroAxis {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl GyroAxis {
    pub fn name(self) -> &'static str {
        match self {
            GyroAxis::PosX => "+X",
            GyroAxis::NegX => "-X",
            GyroAxis::PosY => "+Y",
            GyroAxis::NegY => "-Y",
            GyroAxis::PosZ => "+Z",
            GyroAxis::NegZ => "-Z",
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, GyroAxis::NegX | GyroAxis::NegY | GyroAxis::NegZ)
    }

    fn rate(self, sample: &GyroSample) -> f32 {
        match self {
            GyroAxis::PosX | GyroAxis::NegX => sample.rate_x,
            GyroAxis::PosY | GyroAxis::NegY => sample.rate_y,
            GyroAxis::PosZ | GyroAxis::NegZ => sample.rate_z,
        }
    }
}

impl fmt::Display for GyroAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GyroAxis {
    type Err = ConfigError;

    /// Accepts `X`, `+X`, `-X` and the same for `Y` and `Z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, letter) = match s.as_bytes() {
            [b'-', letter] => (true, *letter),
            [b'+', letter] | [letter] => (false, *letter),
            _ => (false, 0),
        };

        match (letter, negative) {
            (b'X', false) => Ok(GyroAxis::PosX),
            (b'X', true) => Ok(GyroAxis::NegX),
            (b'Y', false) => Ok(GyroAxis::PosY),
            (b'Y', true) => Ok(GyroAxis::NegY),
            (b'Z', false) => Ok(GyroAxis::PosZ),
            (b'Z', true) => Ok(GyroAxis::NegZ),
            _ => Err(ConfigError::UnknownName {
                kind: "gyro axis",
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GyroMapper {
    axis: GyroAxis,
    button: OutputButton,
    pressed: bool,
    /// Radians
    threshold: f32,
    /// Radians
    angle_delta: f32,
    imu: AngleIntegrator,
    trigger_buttons: BTreeSet<SourceButton>,
    held_buttons: BTreeSet<SourceButton>,
}

impl GyroMapper {
    pub fn new(axis: GyroAxis, button: OutputButton) -> Self {
        Self {
            axis,
            button,
            pressed: false,
            threshold: DEFAULT_THRESHOLD_DEGREES.to_radians(),
            angle_delta: DEFAULT_DELTA_DEGREES.to_radians(),
            imu: AngleIntegrator::new(axis.name()),
            trigger_buttons: BTreeSet::new(),
            held_buttons: BTreeSet::new(),
        }
    }

    /// Require `button` to be held (together with the other triggers)
    pub fn add_trigger_button(&mut self, button: SourceButton) {
        self.trigger_buttons.insert(button);
    }

    /// Set the press threshold in degrees; must be positive
    pub fn set_angle_threshold(&mut self, degrees: f32) -> Result<(), ConfigError> {
        if !(degrees > 0.0) {
            return Err(ConfigError::OutOfRange {
                what: "gyro angle threshold",
                value: degrees,
                bound: "> 0",
            });
        }

        self.threshold = degrees.to_radians();
        Ok(())
    }

    /// Set the release hysteresis in degrees; must not be negative
    pub fn set_angle_delta(&mut self, degrees: f32) -> Result<(), ConfigError> {
        if !(degrees >= 0.0) {
            return Err(ConfigError::OutOfRange {
                what: "gyro angle delta",
                value: degrees,
                bound: ">= 0",
            });
        }

        self.angle_delta = degrees.to_radians();
        Ok(())
    }

    /// Average the first `samples` rates as sensor bias before integrating
    pub fn enable_calibration(&mut self, samples: u32) {
        self.imu = AngleIntegrator::with_calibration(self.axis.name(), samples);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the trigger chord is satisfied (always true without triggers)
    pub fn is_enabled(&self) -> bool {
        self.held_buttons.len() == self.trigger_buttons.len()
    }

    /// Integrated angle in radians since the last activation
    pub fn angle(&self) -> f32 {
        self.imu.value()
    }

    fn set_pressed(&mut self, sink: &mut dyn OutputSink, pressed: bool) {
        self.pressed = pressed;
        sink.set_button_state(self.button, pressed);
    }
}

impl InputListener for GyroMapper {
    fn describe(&self) -> String {
        let triggers: Vec<&str> = self.trigger_buttons.iter().map(|b| b.name()).collect();
        format!(
            "gyro mapping {} -> {}; threshold={:.2}, hysteresis={:.2}, triggers=[{}]",
            self.axis,
            self.button,
            self.threshold.to_degrees(),
            self.angle_delta.to_degrees(),
            triggers.join(",")
        )
    }

    fn on_button_state(&mut self, sink: &mut dyn OutputSink, button: SourceButton, pressed: bool) {
        if self.trigger_buttons.is_empty() || !self.trigger_buttons.contains(&button) {
            return;
        }

        let prev_count = self.held_buttons.len();
        if pressed {
            self.held_buttons.insert(button);
        } else {
            self.held_buttons.remove(&button);
        }
        let curr_count = self.held_buttons.len();

        if prev_count == curr_count {
            return;
        }

        let full = self.trigger_buttons.len();
        if curr_count == full {
            info!("Enable gyro ({})", self.axis);
            self.imu.reset();
        } else if prev_count == full {
            info!("Disable gyro ({})", self.axis);
            if self.pressed {
                info!("Gyro release of {} ({}) (disabled)", self.button, self.axis);
                self.set_pressed(sink, false);
            }
        }
    }

    fn on_gyro_update(&mut self, sink: &mut dyn OutputSink, sample: GyroSample) {
        // Integrate even while disabled so re-enabling starts from a fresh sample
        if !self.imu.update(sample.timestamp, self.axis.rate(&sample)) {
            return;
        }

        if !self.is_enabled() {
            return;
        }

        let angle = if self.axis.is_negative() {
            -self.imu.value()
        } else {
            self.imu.value()
        };

        if self.pressed && angle <= self.threshold - self.angle_delta {
            debug!("Gyro release of {} ({}) at {:.2}", self.button, self.axis, self.imu.value());
            self.set_pressed(sink, false);
        } else if !self.pressed && angle >= self.threshold {
            debug!("Gyro press of {} ({}) at {:.2}", self.button, self.axis, self.imu.value());
            self.set_pressed(sink, true);
        }
    }
}
