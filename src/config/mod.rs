//! Mapping configuration
//!
//! The configuration is a versioned JSON document. It can be written by
//! hand, produced from command-line mapping specs, or both: a file loaded
//! with `--config` is extended by the specs given on the command line.
//!
//! ```json
//! {
//!   "version": 1,
//!   "config": {
//!     "buttons": { "A": "B1", "B": "B2" },
//!     "sticks": [ { "which": "L", "lo": 0.4, "hi": 0.5, "ht": 5.0 } ],
//!     "gyro": [ { "axis": "-X", "button": "L", "threshold": 15.0, "triggers": ["LS", "RS"] } ],
//!     "hat": true,
//!     "trigger_threshold": 0.5
//!   }
//! }
//! ```

mod error;

pub use error::ConfigError;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::mapping::MappingSet;

/// Only known configuration format
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub config: MappingConfig,
}

/// All mappings applied to each connected controller
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MappingConfig {
    /// Controller button name -> action button (`B1` or `B2`)
    #[serde(default)]
    pub buttons: BTreeMap<String, String>,
    #[serde(default)]
    pub sticks: Vec<StickConfig>,
    #[serde(default)]
    pub gyro: Vec<GyroConfig>,
    /// Map the controller's digital pad onto the console pad
    #[serde(default, skip_serializing_if = "is_false")]
    pub hat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_threshold: Option<f32>,
    /// Average the first gyro samples of each mapping as a static bias
    #[serde(default, skip_serializing_if = "is_false")]
    pub gyro_calibration: bool,
}

/// Stick to pad mapping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StickConfig {
    /// `L` or `R`
    pub which: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hi: Option<f32>,
    /// Angle hysteresis in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ht: Option<f32>,
}

/// Gyro axis to pad direction mapping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GyroConfig {
    /// `X`, `+X`, `-X`, `Y`, ... `-Z`
    pub axis: String,
    /// `U`, `D`, `L` or `R`
    pub button: String,
    /// Angle threshold in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    /// Hysteresis delta in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f32>,
    /// Buttons that must all be held for the mapping to be active
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            config: MappingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());

        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check every value by building the mapping set once
    pub fn validate(&self) -> Result<(), ConfigError> {
        MappingSet::build(self).map(|_| ())
    }

    /// Append the mappings of `other`, letting its scalar settings win
    pub fn merge(&mut self, other: MappingConfig) {
        let cfg = &mut self.config;
        cfg.buttons.extend(other.buttons);
        cfg.sticks.extend(other.sticks);
        cfg.gyro.extend(other.gyro);
        cfg.hat |= other.hat;
        cfg.gyro_calibration |= other.gyro_calibration;
        if other.trigger_threshold.is_some() {
            cfg.trigger_threshold = other.trigger_threshold;
        }
    }
}

fn default_version() -> u32 { CONFIG_VERSION }
fn is_false(value: &bool) -> bool { !*value }
