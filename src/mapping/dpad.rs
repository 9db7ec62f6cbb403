//! Controller digital pad to console pad
//!
//! Only real level changes are forwarded. Some backends repeat press or
//! release events, and a stick mapper may drive the same outputs; tracking
//! the pad's own level keeps both from producing spurious edges.

use tracing::debug;

use crate::input::{InputListener, SourceButton};
use crate::output::{OutputButton, OutputSink};

#[derive(Debug, Clone, Default)]
pub struct DigitalPadMapper {
    /// One bit per direction, see [`direction_bit`]
    held: u8,
}

impl DigitalPadMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, button: SourceButton) -> bool {
        direction_bit(button).is_some_and(|(bit, _)| self.held & bit != 0)
    }
}

fn direction_bit(button: SourceButton) -> Option<(u8, OutputButton)> {
    match button {
        SourceButton::DPadLeft => Some((0x01, OutputButton::Left)),
        SourceButton::DPadRight => Some((0x02, OutputButton::Right)),
        SourceButton::DPadUp => Some((0x04, OutputButton::Up)),
        SourceButton::DPadDown => Some((0x08, OutputButton::Down)),
        _ => None,
    }
}

impl InputListener for DigitalPadMapper {
    fn describe(&self) -> String {
        "DPad map".to_string()
    }

    fn on_button_state(&mut self, sink: &mut dyn OutputSink, button: SourceButton, pressed: bool) {
        let Some((bit, output)) = direction_bit(button) else {
            return;
        };

        debug!("DPad {} change: {}", output, pressed);

        let was_held = self.held & bit != 0;
        if was_held != pressed {
            sink.set_button_state(output, pressed);
        }

        if pressed {
            self.held |= bit;
        } else {
            self.held &= !bit;
        }
    }
}
