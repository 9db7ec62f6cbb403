//! Controller buttons as seen by the mapping engine
//!
//! gilrs reports face buttons by physical position (South, East, North,
//! West). Names follow the Xbox/SDL convention, where the bottom button is
//! `A`:
//!
//! ```text
//!       [Y/North]           (top)
//!   [X/West] [B/East]       (left/right)
//!       [A/South]           (bottom)
//! ```
//!
//! Analog triggers are turned into `LT`/`RT` edges by the
//! [`Controller`](super::Controller), not here.

use std::fmt;
use std::str::FromStr;

use gilrs::Button;

use crate::config::ConfigError;

/// Discrete controller button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    DPadLeft,
    DPadRight,
    DPadUp,
    DPadDown,
}

impl SourceButton {
    pub const ALL: [SourceButton; 12] = [
        SourceButton::A,
        SourceButton::B,
        SourceButton::X,
        SourceButton::Y,
        SourceButton::LeftShoulder,
        SourceButton::RightShoulder,
        SourceButton::LeftTrigger,
        SourceButton::RightTrigger,
        SourceButton::DPadLeft,
        SourceButton::DPadRight,
        SourceButton::DPadUp,
        SourceButton::DPadDown,
    ];

    /// Configuration name (`A`, `LS`, `RT`, `U`, ...)
    pub fn name(self) -> &'static str {
        match self {
            SourceButton::A => "A",
            SourceButton::B => "B",
            SourceButton::X => "X",
            SourceButton::Y => "Y",
            SourceButton::LeftShoulder => "LS",
            SourceButton::RightShoulder => "RS",
            SourceButton::LeftTrigger => "LT",
            SourceButton::RightTrigger => "RT",
            SourceButton::DPadLeft => "L",
            SourceButton::DPadRight => "R",
            SourceButton::DPadUp => "U",
            SourceButton::DPadDown => "D",
        }
    }

    pub fn is_dpad(self) -> bool {
        matches!(
            self,
            SourceButton::DPadLeft
                | SourceButton::DPadRight
                | SourceButton::DPadUp
                | SourceButton::DPadDown
        )
    }
}

impl fmt::Display for SourceButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceButton {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceButton::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "controller button",
                name: s.to_string(),
            })
    }
}

/// Map a gilrs button to a source button
///
/// Returns `None` for buttons the mapping engine does not know about
/// (Start, Select, stick clicks, ...) and for the analog triggers, which
/// arrive as axis values instead.
pub fn from_gilrs(button: Button) -> Option<SourceButton> {
    match button {
        Button::South => Some(SourceButton::A),
        Button::East => Some(SourceButton::B),
        Button::West => Some(SourceButton::X),
        Button::North => Some(SourceButton::Y),
        Button::LeftTrigger => Some(SourceButton::LeftShoulder),
        Button::RightTrigger => Some(SourceButton::RightShoulder),
        Button::DPadLeft => Some(SourceButton::DPadLeft),
        Button::DPadRight => Some(SourceButton::DPadRight),
        Button::DPadUp => Some(SourceButton::DPadUp),
        Button::DPadDown => Some(SourceButton::DPadDown),
        _ => None,
    }
}
