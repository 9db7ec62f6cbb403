//! Input mapping engine
//!
//! Each mapper subscribes to one class of controller event and emits
//! console pad edges:
//!
//! - [`StickMapper`] - analog stick to 8-way pad, with deadzone and angular hysteresis
//! - [`GyroMapper`] - tilt past a threshold presses one direction, gated by a button chord
//! - [`DigitalPadMapper`] - controller d-pad to console pad
//! - [`ButtonMapper`] - any of a set of buttons to one action button
//!
//! Mappers never look at each other's state. A [`MappingSet`] holds the
//! validated configuration and hands out a fresh copy of every mapper for
//! each controller that connects.

pub mod button;
pub mod dpad;
pub mod gyro;
pub mod integrator;
pub mod stick;


pub use button::{ActionButton, ButtonMapper};
pub use dpad::DigitalPadMapper;
pub use gyro::{GyroAxis, GyroMapper};
pub use integrator::AngleIntegrator;
pub use stick::{Stick, StickMapper};

use tracing::info;

use crate::config::{AppConfig, ConfigError, GyroConfig, StickConfig, CONFIG_VERSION};
use crate::input::controller::{validate_trigger_threshold, DEFAULT_TRIGGER_THRESHOLD};
use crate::input::{Controller, SourceButton};
use crate::output::OutputButton;

/// Validated set of mappers, cloned onto every connected controller
#[derive(Debug, Clone)]
pub struct MappingSet {
    dpad: bool,
    sticks: Vec<StickMapper>,
    gyros: Vec<GyroMapper>,
    buttons: [ButtonMapper; 2],
    trigger_threshold: f32,
}

impl MappingSet {
    /// Build and validate every mapping described by `config`
    pub fn build(config: &AppConfig) -> Result<Self, ConfigError> {
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.version));
        }

        let cfg = &config.config;

        let mut buttons = [
            ButtonMapper::new(ActionButton::B1),
            ButtonMapper::new(ActionButton::B2),
        ];
        for (source, target) in &cfg.buttons {
            let source: SourceButton = source.parse()?;
            let target: ActionButton = target.parse()?;
            let mapper = match target {
                ActionButton::B1 => &mut buttons[0],
                ActionButton::B2 => &mut buttons[1],
            };
            mapper.add_source_button(source);
        }

        let sticks = cfg
            .sticks
            .iter()
            .map(build_stick)
            .collect::<Result<Vec<_>, _>>()?;

        let mut gyros = cfg
            .gyro
            .iter()
            .map(build_gyro)
            .collect::<Result<Vec<_>, _>>()?;
        if cfg.gyro_calibration {
            for gyro in gyros.iter_mut() {
                gyro.enable_calibration(integrator::CALIBRATION_SAMPLES);
            }
        }

        let trigger_threshold = cfg.trigger_threshold.unwrap_or(DEFAULT_TRIGGER_THRESHOLD);
        validate_trigger_threshold(trigger_threshold)?;

        Ok(Self {
            dpad: cfg.hat,
            sticks,
            gyros,
            buttons,
            trigger_threshold,
        })
    }

    /// Number of mappers attached to each controller
    pub fn len(&self) -> usize {
        usize::from(self.dpad)
            + self.sticks.len()
            + self.gyros.len()
            + self.buttons.iter().filter(|b| b.has_sources()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a controller with a fresh copy of every mapper attached
    pub fn controller(&self, name: impl Into<String>) -> Controller {
        let mut ctrl = Controller::new(name);
        self.attach(&mut ctrl);
        ctrl
    }

    /// Attach a fresh copy of every mapper to `ctrl`
    pub fn attach(&self, ctrl: &mut Controller) {
        ctrl.apply_validated_trigger_threshold(self.trigger_threshold);

        if self.dpad {
            ctrl.add_listener(Box::new(DigitalPadMapper::new()));
        }
        for stick in &self.sticks {
            ctrl.add_listener(Box::new(stick.clone()));
        }
        for gyro in &self.gyros {
            ctrl.add_listener(Box::new(gyro.clone()));
        }
        for button in self.buttons.iter().filter(|b| b.has_sources()) {
            ctrl.add_listener(Box::new(button.clone()));
        }

        info!("{} mappings attached to {}", ctrl.listener_count(), ctrl.name());
    }
}

fn build_stick(config: &StickConfig) -> Result<StickMapper, ConfigError> {
    let mut map = StickMapper::new(config.which.parse()?);
    map.set_deadzone(
        config.lo.unwrap_or(stick::DEFAULT_DEADZONE_LO),
        config.hi.unwrap_or(stick::DEFAULT_DEADZONE_HI),
    )?;
    if let Some(ht) = config.ht {
        map.set_angle_hysteresis(ht)?;
    }
    Ok(map)
}

fn build_gyro(config: &GyroConfig) -> Result<GyroMapper, ConfigError> {
    let button: OutputButton = config.button.parse()?;
    let mut map = GyroMapper::new(config.axis.parse()?, button);
    if let Some(threshold) = config.threshold {
        map.set_angle_threshold(threshold)?;
    }
    if let Some(delta) = config.delta {
        map.set_angle_delta(delta)?;
    }
    for name in &config.triggers {
        map.add_trigger_button(name.parse()?);
    }
    Ok(map)
}
