//! Controller input: typed events, per-device dispatch and event sources
//!
//! Sources ([`provider`] for live gamepads, `sdl` for live gamepads with
//! gyroscopes, [`replay`] for recorded logs) produce [`InputEvent`]s and hand
//! them to a [`Controller`], which fans them out to the mappers attached to
//! that device.

pub mod axis;
pub mod buttons;
pub mod controller;
pub mod listener;
pub mod provider;
pub mod replay;
#[cfg(feature = "sdl")]
pub mod sdl;

pub use axis::ControllerAxis;
pub use buttons::SourceButton;
pub use controller::Controller;
pub use listener::{GyroSample, InputEvent, InputListener};
