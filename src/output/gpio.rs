//! Raspberry Pi GPIO output
//!
//! Each console line is wired to one BCM pin; a pressed button drives the
//! pin high.

use std::collections::BTreeMap;

use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, info};

use super::{OutputButton, OutputSink};

/// Default wiring (BCM numbering)
pub fn default_pin_map() -> BTreeMap<OutputButton, u8> {
    BTreeMap::from([
        (OutputButton::Action1, 27),
        (OutputButton::Action2, 22),
        (OutputButton::Up, 2),
        (OutputButton::Down, 3),
        (OutputButton::Left, 4),
        (OutputButton::Right, 17),
    ])
}

pub struct GpioSink {
    pins: BTreeMap<OutputButton, (u8, OutputPin)>,
}

impl GpioSink {
    /// Claim every pin in `pin_map` as a low output
    pub fn new(pin_map: &BTreeMap<OutputButton, u8>) -> Result<Self, rppal::gpio::Error> {
        let gpio = Gpio::new()?;
        let mut pins = BTreeMap::new();

        for (&button, &number) in pin_map {
            let pin = gpio.get(number)?.into_output_low();
            debug!("GPIO {} assigned to {}", number, button);
            pins.insert(button, (number, pin));
        }

        info!("GPIO initialized ({} pins)", pins.len());
        Ok(Self { pins })
    }
}

impl OutputSink for GpioSink {
    fn set_button_state(&mut self, button: OutputButton, pressed: bool) {
        let Some((number, pin)) = self.pins.get_mut(&button) else {
            debug!("No GPIO wired for {}", button);
            return;
        };

        debug!("Set GPIO {} to {}", number, if pressed { "HI" } else { "LO" });
        if pressed {
            pin.set_high();
        } else {
            pin.set_low();
        }
    }
}
