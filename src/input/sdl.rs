//! Live gamepads through SDL2, including motion sensors
//!
//! gilrs has no access to gyroscopes, SDL2 does. With the `sdl` feature
//! this source replaces the gilrs loop: each opened controller gets its gyro
//! enabled (when it has one) and sensor updates are dispatched as
//! [`InputEvent::Gyro`] alongside buttons and axes.
//!
//! SDL axes already report Y growing downwards, so no axis is flipped here.

use anyhow::{anyhow, Result};
use sdl2::controller::{Axis, Button, GameController};
use sdl2::event::Event;
use sdl2::sensor::SensorType;
use sdl2::{EventPump, GameControllerSubsystem, Sdl};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::mapping::MappingSet;
use crate::output::OutputSink;

use super::listener::{GyroSample, InputEvent};
use super::{Controller, ControllerAxis, SourceButton};

/// An opened SDL controller and the mappers attached to it
struct Device {
    _handle: GameController,
    ctrl: Controller,
}

/// SDL2-backed event source
pub struct SdlProvider {
    _sdl: Sdl,
    subsystem: GameControllerSubsystem,
    events: EventPump,
    mappings: MappingSet,
    /// Indexed by SDL joystick instance ID
    devices: HashMap<u32, Device>,
}

impl SdlProvider {
    pub fn new(mappings: MappingSet) -> Result<Self> {
        let sdl = sdl2::init().map_err(|e| anyhow!("Cannot initialize SDL: {e}"))?;
        let subsystem = sdl
            .game_controller()
            .map_err(|e| anyhow!("Cannot initialize SDL game controllers: {e}"))?;
        let events = sdl
            .event_pump()
            .map_err(|e| anyhow!("Cannot create SDL event pump: {e}"))?;
        info!("SDL initialized");

        Ok(Self {
            _sdl: sdl,
            subsystem,
            events,
            mappings,
            devices: HashMap::new(),
        })
    }

    /// Process events until SDL reports a quit request
    ///
    /// Controllers already plugged in are announced by SDL as device-added
    /// events, so they are opened by the same path as hot-plugged ones.
    pub fn run(&mut self, sink: &mut dyn OutputSink) {
        info!("🎮 Listening for controller events");
        loop {
            let event = self.events.wait_event();
            if let Event::Quit { .. } = event {
                info!("Quitting");
                return;
            }
            self.handle(event, sink);
        }
    }

    fn handle(&mut self, event: Event, sink: &mut dyn OutputSink) {
        match event {
            Event::ControllerDeviceAdded { which, .. } => self.open(which),
            Event::ControllerDeviceRemoved { which, .. } => {
                if let Some(device) = self.devices.remove(&which) {
                    info!("🔌 {} closed", device.ctrl.name());
                }
            }
            Event::JoyDeviceAdded { which, .. } => {
                if !self.subsystem.is_game_controller(which) {
                    warn!("Joystick #{} added, but is not a game controller", which);
                }
            }
            other => {
                let Some((which, input)) = convert_event(&other) else {
                    return;
                };
                if let Some(device) = self.devices.get_mut(&which) {
                    debug!("Controller event: {:?}", input);
                    device.ctrl.handle_event(input, sink);
                }
            }
        }
    }

    fn open(&mut self, index: u32) {
        let handle = match self.subsystem.open(index) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Error opening controller #{}: {}", index, e);
                return;
            }
        };

        let instance_id = handle.instance_id();
        if self.devices.contains_key(&instance_id) {
            return;
        }

        let name = format!("{} #{}", handle.name(), instance_id);
        info!("🔌 {} opened", name);

        if handle.has_sensor(SensorType::Gyroscope) {
            match handle.sensor_set_enabled(SensorType::Gyroscope, true) {
                Ok(()) => info!("Gyro enabled on {}", name),
                Err(e) => warn!("Cannot enable gyro on {}: {}", name, e),
            }
        } else {
            warn!("Controller {} has no gyro", name);
        }

        let ctrl = self.mappings.controller(name);
        self.devices.insert(
            instance_id,
            Device {
                _handle: handle,
                ctrl,
            },
        );
    }
}

/// Translate an SDL controller event into the instance ID and mapping event
fn convert_event(event: &Event) -> Option<(u32, InputEvent)> {
    match *event {
        Event::ControllerButtonDown { which, button, .. } => button_event(which, button, true),
        Event::ControllerButtonUp { which, button, .. } => button_event(which, button, false),
        Event::ControllerAxisMotion {
            which, axis, value, ..
        } => Some((which, convert_axis(axis, value))),
        Event::ControllerSensorUpdated {
            timestamp,
            which,
            sensor: SensorType::Gyroscope,
            data,
        } => Some((
            which,
            InputEvent::Gyro(GyroSample {
                timestamp,
                rate_x: data[0],
                rate_y: data[1],
                rate_z: data[2],
            }),
        )),
        _ => None,
    }
}

fn button_event(which: u32, button: Button, pressed: bool) -> Option<(u32, InputEvent)> {
    convert_button(button).map(|button| (which, InputEvent::Button { button, pressed }))
}

fn convert_button(button: Button) -> Option<SourceButton> {
    match button {
        Button::A => Some(SourceButton::A),
        Button::B => Some(SourceButton::B),
        Button::X => Some(SourceButton::X),
        Button::Y => Some(SourceButton::Y),
        Button::LeftShoulder => Some(SourceButton::LeftShoulder),
        Button::RightShoulder => Some(SourceButton::RightShoulder),
        Button::DPadLeft => Some(SourceButton::DPadLeft),
        Button::DPadRight => Some(SourceButton::DPadRight),
        Button::DPadUp => Some(SourceButton::DPadUp),
        Button::DPadDown => Some(SourceButton::DPadDown),
        _ => None,
    }
}

/// Raw SDL axis values span `i16`; triggers only use the positive half
fn convert_axis(axis: Axis, value: i16) -> InputEvent {
    let axis = match axis {
        Axis::LeftX => ControllerAxis::LeftX,
        Axis::LeftY => ControllerAxis::LeftY,
        Axis::RightX => ControllerAxis::RightX,
        Axis::RightY => ControllerAxis::RightY,
        Axis::TriggerLeft => ControllerAxis::LeftTrigger,
        Axis::TriggerRight => ControllerAxis::RightTrigger,
    };

    InputEvent::Axis {
        axis,
        value: f32::from(value) / f32::from(i16::MAX),
    }
}
