//! Controller analog axes
//!
//! Stick values are in -1.0..=1.0 with Y growing downwards, which is the
//! orientation the stick mapper's sector table assumes. gilrs reports Y
//! growing upwards, so [`from_gilrs`] flips it.

use std::fmt;
use std::str::FromStr;

use gilrs::Axis;

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl ControllerAxis {
    pub const ALL: [ControllerAxis; 6] = [
        ControllerAxis::LeftX,
        ControllerAxis::LeftY,
        ControllerAxis::RightX,
        ControllerAxis::RightY,
        ControllerAxis::LeftTrigger,
        ControllerAxis::RightTrigger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ControllerAxis::LeftX => "LX",
            ControllerAxis::LeftY => "LY",
            ControllerAxis::RightX => "RX",
            ControllerAxis::RightY => "RY",
            ControllerAxis::LeftTrigger => "LT",
            ControllerAxis::RightTrigger => "RT",
        }
    }
}

impl fmt::Display for ControllerAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerAxis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ControllerAxis::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "controller axis",
                name: s.to_string(),
            })
    }
}

/// Map a gilrs axis event to a controller axis and value
///
/// Returns `None` for axes the mapping engine ignores (d-pad axes, ...).
pub fn from_gilrs(axis: Axis, value: f32) -> Option<(ControllerAxis, f32)> {
    match axis {
        Axis::LeftStickX => Some((ControllerAxis::LeftX, value)),
        Axis::LeftStickY => Some((ControllerAxis::LeftY, -value)),
        Axis::RightStickX => Some((ControllerAxis::RightX, value)),
        Axis::RightStickY => Some((ControllerAxis::RightY, -value)),
        Axis::LeftZ => Some((ControllerAxis::LeftTrigger, value)),
        Axis::RightZ => Some((ControllerAxis::RightTrigger, value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_y_is_flipped() {
        assert_eq!(from_gilrs(Axis::LeftStickY, 0.75), Some((ControllerAxis::LeftY, -0.75)));
        assert_eq!(from_gilrs(Axis::RightStickX, 0.5), Some((ControllerAxis::RightX, 0.5)));
    }

    #[test]
    fn test_unknown_axis_is_ignored() {
        assert_eq!(from_gilrs(Axis::DPadX, 1.0), None);
    }

    #[test]
    fn test_axis_names() {
        assert_eq!("RY".parse::<ControllerAxis>().unwrap(), ControllerAxis::RightY);
        assert!("ZZ".parse::<ControllerAxis>().is_err());
    }
}
