//! Dispatch contract between event sources and mappers

use crate::output::OutputSink;

use super::{ControllerAxis, SourceButton};

/// One angular-rate sample from the controller's gyroscope
///
/// `timestamp` is a monotonic millisecond counter; rates are in rad/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    pub timestamp: u32,
    pub rate_x: f32,
    pub rate_y: f32,
    pub rate_z: f32,
}

/// Typed event delivered by an event source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Button { button: SourceButton, pressed: bool },
    Axis { axis: ControllerAxis, value: f32 },
    Gyro(GyroSample),
}

/// A mapper attached to one controller
///
/// Every method defaults to a no-op so each mapper only implements the
/// events it cares about. Methods run to completion before the next event
/// is dispatched and must only call `sink` when an output actually changes.
pub trait InputListener {
    /// Short description used when the mapping is attached to a controller
    fn describe(&self) -> String;

    fn on_button_state(
        &mut self,
        _sink: &mut dyn OutputSink,
        _button: SourceButton,
        _pressed: bool,
    ) {
    }

    fn on_axis_motion(&mut self, _sink: &mut dyn OutputSink, _axis: ControllerAxis, _value: f32) {}

    fn on_gyro_update(&mut self, _sink: &mut dyn OutputSink, _sample: GyroSample) {}
}
