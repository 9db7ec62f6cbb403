//! MSPad GW - Master System joypad gateway
//!
//! Turns events from a modern game controller (buttons, sticks, analog
//! triggers, gyroscope) into the six lines of a Master System joypad port:
//! Up, Down, Left, Right, Button 1 and Button 2.

pub mod cli;
pub mod config;
pub mod input;
pub mod mapping;
pub mod output;
