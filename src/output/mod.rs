//! Console pad outputs
//!
//! The Master System joypad has six lines: four directions and two action
//! buttons. Mappers never touch the hardware directly, they call into an
//! [`OutputSink`] only when one of their lines actually changes state.

use std::fmt;
use std::str::FromStr;

use tracing::info;

#[cfg(feature = "gpio")]
pub mod gpio;

#[cfg(feature = "gpio")]
pub use gpio::GpioSink;

/// One line of the console's joypad port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputButton {
    Up,
    Down,
    Left,
    Right,
    Action1,
    Action2,
}

impl OutputButton {
    pub const ALL: [OutputButton; 6] = [
        OutputButton::Up,
        OutputButton::Down,
        OutputButton::Left,
        OutputButton::Right,
        OutputButton::Action1,
        OutputButton::Action2,
    ];

    /// Human-readable name used in log lines
    pub fn name(self) -> &'static str {
        match self {
            OutputButton::Up => "Up",
            OutputButton::Down => "Down",
            OutputButton::Left => "Left",
            OutputButton::Right => "Right",
            OutputButton::Action1 => "B1",
            OutputButton::Action2 => "B2",
        }
    }

    /// Short name used in configuration (`B1`, `B2`, `U`, `D`, `L`, `R`)
    pub fn short_name(self) -> &'static str {
        match self {
            OutputButton::Up => "U",
            OutputButton::Down => "D",
            OutputButton::Left => "L",
            OutputButton::Right => "R",
            OutputButton::Action1 => "B1",
            OutputButton::Action2 => "B2",
        }
    }

    pub fn is_direction(self) -> bool {
        !matches!(self, OutputButton::Action1 | OutputButton::Action2)
    }
}

impl fmt::Display for OutputButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputButton {
    type Err = crate::config::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B1" => Ok(OutputButton::Action1),
            "B2" => Ok(OutputButton::Action2),
            "U" => Ok(OutputButton::Up),
            "D" => Ok(OutputButton::Down),
            "L" => Ok(OutputButton::Left),
            "R" => Ok(OutputButton::Right),
            _ => Err(crate::config::ConfigError::UnknownName {
                kind: "console button",
                name: s.to_string(),
            }),
        }
    }
}

/// Receiver of output edges
///
/// Implementations are expected to be fast and non-blocking: a register
/// write or a log line. Mappers call this at most once per logical edge.
pub trait OutputSink {
    fn set_button_state(&mut self, button: OutputButton, pressed: bool);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn set_button_state(&mut self, button: OutputButton, pressed: bool) {
        (**self).set_button_state(button, pressed)
    }
}

/// ConsoleSink logs every edge instead of driving hardware
///
/// Used when GPIO support is not compiled in, and handy for checking a
/// mapping setup on a desktop machine.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    edge_count: u64,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges received so far
    pub fn edge_count(&self) -> u64 {
        self.edge_count
    }
}

impl OutputSink for ConsoleSink {
    fn set_button_state(&mut self, button: OutputButton, pressed: bool) {
        self.edge_count += 1;
        info!(
            "🎮 {} button {} [edge #{}]",
            if pressed { "Press" } else { "Release" },
            button,
            self.edge_count
        );
    }
}

/// Sink that remembers every call in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<(OutputButton, bool)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[(OutputButton, bool)] {
        &self.events
    }

    /// Take the recorded edges, leaving the sink empty
    pub fn drain(&mut self) -> Vec<(OutputButton, bool)> {
        std::mem::take(&mut self.events)
    }

    /// Current level of each line, replaying the recorded edges from all-released
    pub fn levels(&self) -> [(OutputButton, bool); 6] {
        let mut levels = OutputButton::ALL.map(|b| (b, false));
        for (button, pressed) in &self.events {
            if let Some(slot) = levels.iter_mut().find(|(b, _)| b == button) {
                slot.1 = *pressed;
            }
        }
        levels
    }
}

impl OutputSink for RecordingSink {
    fn set_button_state(&mut self, button: OutputButton, pressed: bool) {
        self.events.push((button, pressed));
    }
}
