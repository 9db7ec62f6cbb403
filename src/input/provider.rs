//! Live gamepads through gilrs with hot-plug support
//!
//! Every connected gamepad gets its own [`Controller`] with a fresh copy of
//! the configured mappers, so two controllers never share mapper state. All
//! controllers drive the same output sink.

use anyhow::{anyhow, Result};
use gilrs::{Button, Event, EventType, GamepadId, Gilrs};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::mapping::MappingSet;
use crate::output::OutputSink;

use super::listener::InputEvent;
use super::{axis, buttons, Controller, ControllerAxis};

/// Idle time between two polls of the gilrs event queue
const POLL_INTERVAL: Duration = Duration::from_millis(4);

/// gilrs-backed event source
pub struct GilrsProvider {
    gilrs: Gilrs,
    mappings: MappingSet,
    controllers: HashMap<GamepadId, Controller>,
}

impl GilrsProvider {
    /// Initialize gilrs and attach mappers to already connected gamepads
    pub fn new(mappings: MappingSet) -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow!("Failed to initialize gilrs: {e}"))?;
        info!("GilRs initialized");

        let mut provider = Self {
            gilrs,
            mappings,
            controllers: HashMap::new(),
        };

        let connected: Vec<_> = provider
            .gilrs
            .gamepads()
            .filter(|(_, gp)| gp.is_connected())
            .map(|(id, _)| id)
            .collect();
        if connected.is_empty() {
            warn!("⚠️  No gamepads detected yet, waiting for hot-plug");
        }
        for id in connected {
            provider.connect(id);
        }

        Ok(provider)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    /// Process events until the process is stopped
    pub fn run(&mut self, sink: &mut dyn OutputSink) -> ! {
        info!("🎮 Listening for gamepad events");
        loop {
            self.poll(sink);
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Drain the gilrs event queue, returning the number of dispatched events
    pub fn poll(&mut self, sink: &mut dyn OutputSink) -> usize {
        let mut dispatched = 0;

        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let input = match event {
                EventType::Connected => {
                    self.connect(id);
                    continue;
                }
                EventType::Disconnected => {
                    if let Some(ctrl) = self.controllers.remove(&id) {
                        info!("🔌 {} disconnected", ctrl.name());
                    }
                    continue;
                }
                EventType::ButtonPressed(button, _) => convert_button(button, true),
                EventType::ButtonReleased(button, _) => convert_button(button, false),
                EventType::ButtonChanged(button, value, _) => convert_button_value(button, value),
                EventType::AxisChanged(gilrs_axis, value, _) => axis::from_gilrs(gilrs_axis, value)
                    .map(|(axis, value)| InputEvent::Axis { axis, value }),
                _ => None,
            };

            let Some(input) = input else {
                continue;
            };

            if !self.controllers.contains_key(&id) {
                self.connect(id);
            }
            if let Some(ctrl) = self.controllers.get_mut(&id) {
                debug!("Gamepad event: {:?}", input);
                ctrl.handle_event(input, sink);
                dispatched += 1;
            }
        }

        dispatched
    }

    fn connect(&mut self, id: GamepadId) {
        if self.controllers.contains_key(&id) {
            return;
        }

        let name = format!("{} #{}", self.gilrs.gamepad(id).name(), usize::from(id));
        info!("🔌 {} connected", name);
        let ctrl = self.mappings.controller(name);
        self.controllers.insert(id, ctrl);
    }
}

/// Connected gamepads as `(index, name)` pairs
pub fn list_gamepads() -> Result<Vec<(usize, String)>> {
    let gilrs = Gilrs::new().map_err(|e| anyhow!("Failed to initialize gilrs: {e}"))?;

    Ok(gilrs
        .gamepads()
        .filter(|(_, gp)| gp.is_connected())
        .map(|(id, gp)| (usize::from(id), gp.name().to_string()))
        .collect())
}

/// Digital button edge; analog triggers arrive through [`convert_button_value`]
fn convert_button(button: Button, pressed: bool) -> Option<InputEvent> {
    buttons::from_gilrs(button).map(|button| InputEvent::Button { button, pressed })
}

/// Analog triggers become trigger axes, the [`Controller`] derives their edges
fn convert_button_value(button: Button, value: f32) -> Option<InputEvent> {
    let axis = match button {
        Button::LeftTrigger2 => ControllerAxis::LeftTrigger,
        Button::RightTrigger2 => ControllerAxis::RightTrigger,
        _ => return None,
    };
    Some(InputEvent::Axis { axis, value })
}
