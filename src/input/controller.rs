//! Per-device event fan-out

use tracing::{debug, info};

use crate::config::ConfigError;
use crate::output::OutputSink;

use super::listener::{GyroSample, InputEvent, InputListener};
use super::{ControllerAxis, SourceButton};

/// Default analog level at which a trigger counts as pressed
pub const DEFAULT_TRIGGER_THRESHOLD: f32 = 0.5;

/// One connected controller and the mappers attached to it
///
/// Events are forwarded to every listener in registration order. Analog
/// trigger axes additionally produce `LT`/`RT` button edges when they cross
/// the trigger threshold, so mappers can use triggers like any other button.
pub struct Controller {
    name: String,
    trigger_threshold: f32,
    listeners: Vec<Box<dyn InputListener>>,
    last_left_trigger: f32,
    last_right_trigger: f32,
}

impl Controller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
            listeners: Vec::new(),
            last_left_trigger: 0.0,
            last_right_trigger: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn trigger_threshold(&self) -> f32 {
        self.trigger_threshold
    }

    /// Set the level at which analog triggers count as pressed
    ///
    /// Must lie strictly between 0.0 (released) and 1.0 (fully pressed).
    pub fn set_trigger_threshold(&mut self, value: f32) -> Result<(), ConfigError> {
        validate_trigger_threshold(value)?;
        self.trigger_threshold = value;
        debug!("Trigger threshold for {}: {:.2}", self.name, value);
        Ok(())
    }

    /// Set a threshold that already went through `validate_trigger_threshold`
    pub(crate) fn apply_validated_trigger_threshold(&mut self, value: f32) {
        self.trigger_threshold = value;
    }

    pub fn add_listener(&mut self, listener: Box<dyn InputListener>) {
        info!("Add {} to {}", listener.describe(), self.name);
        self.listeners.push(listener);
    }

    /// Deliver one event to every attached mapper
    pub fn handle_event(&mut self, event: InputEvent, sink: &mut dyn OutputSink) {
        let _span = tracing::debug_span!("controller", name = %self.name).entered();

        match event {
            InputEvent::Button { button, pressed } => self.button_state(sink, button, pressed),
            InputEvent::Axis { axis, value } => self.axis_motion(sink, axis, value),
            InputEvent::Gyro(sample) => self.gyro_update(sink, sample),
        }
    }

    fn button_state(&mut self, sink: &mut dyn OutputSink, button: SourceButton, pressed: bool) {
        for listener in self.listeners.iter_mut() {
            listener.on_button_state(sink, button, pressed);
        }
    }

    fn axis_motion(&mut self, sink: &mut dyn OutputSink, axis: ControllerAxis, value: f32) {
        match axis {
            ControllerAxis::LeftTrigger => {
                let last = std::mem::replace(&mut self.last_left_trigger, value);
                if let Some(pressed) = trigger_edge(last, value, self.trigger_threshold) {
                    debug!("Left trigger {} threshold", if pressed { "above" } else { "below" });
                    self.button_state(sink, SourceButton::LeftTrigger, pressed);
                }
            }
            ControllerAxis::RightTrigger => {
                let last = std::mem::replace(&mut self.last_right_trigger, value);
                if let Some(pressed) = trigger_edge(last, value, self.trigger_threshold) {
                    debug!("Right trigger {} threshold", if pressed { "above" } else { "below" });
                    self.button_state(sink, SourceButton::RightTrigger, pressed);
                }
            }
            _ => {}
        }

        for listener in self.listeners.iter_mut() {
            listener.on_axis_motion(sink, axis, value);
        }
    }

    fn gyro_update(&mut self, sink: &mut dyn OutputSink, sample: GyroSample) {
        for listener in self.listeners.iter_mut() {
            listener.on_gyro_update(sink, sample);
        }
    }
}

pub(crate) fn validate_trigger_threshold(value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ConfigError::OutOfRange {
            what: "trigger threshold",
            value,
            bound: "strictly between 0 and 1",
        });
    }
    Ok(())
}

fn trigger_edge(last: f32, value: f32, threshold: f32) -> Option<bool> {
    if last < threshold && value >= threshold {
        Some(true)
    } else if last >= threshold && value < threshold {
        Some(false)
    } else {
        None
    }
}
