//! Command-line interface
//!
//! Mappings can be given directly on the command line with compact specs,
//! mirroring the JSON configuration:
//!
//! - `-b A:B1` maps a controller button to an action button (repeatable)
//! - `-s L,lo=0.2,hi=0.3,ht=4` maps a stick to the pad
//! - `-g -X:L,th=15,hy=2,LS,RS` maps a gyro axis to a pad direction,
//!   enabled only while all listed buttons are held

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{AppConfig, ConfigError, GyroConfig, MappingConfig, StickConfig};
use crate::input::SourceButton;
use crate::mapping::{ActionButton, GyroAxis, Stick};
use crate::output::OutputButton;

/// MSPad GW - drive a Master System joypad port from a modern controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Map a button: <src>:<dst>, src in A,B,X,Y,LS,RS,LT,RT and dst in B1,B2 (once per src)
    #[arg(short = 'b', long = "button", value_name = "MAP")]
    pub buttons: Vec<String>,

    /// Level at which analog triggers count as pressed (default 0.5)
    #[arg(short = 't', long = "trigger", value_name = "VAL")]
    pub trigger_threshold: Option<f32>,

    /// Map the controller digital pad to the console pad
    #[arg(short = 'd', long = "dpad")]
    pub dpad: bool,

    /// Map a stick: <L|R>[,lo=<v>][,hi=<v>][,ht=<degrees>]
    #[arg(short = 's', long = "stick", value_name = "SPEC")]
    pub sticks: Vec<String>,

    /// Map a gyro axis: <[+-]X|Y|Z>:<U|D|L|R>[,th=<deg>][,hy=<deg>][,<button>...]
    #[arg(short = 'g', long = "gyro", value_name = "SPEC", allow_hyphen_values = true)]
    pub gyros: Vec<String>,

    /// Calibrate gyro bias from the first samples of each mapping
    #[arg(long)]
    pub calibrate_gyro: bool,

    /// Load a JSON configuration before applying command-line mappings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration as JSON
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Replay a recorded CSV event log instead of reading gamepads
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// List connected gamepads and exit
    #[arg(long)]
    pub list_gamepads: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Effective configuration: the `--config` file extended by the mapping specs
    pub fn to_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        let mappings = self.mapping_config().context("Invalid command-line mapping")?;
        config.merge(mappings);
        config.validate()?;

        Ok(config)
    }

    fn mapping_config(&self) -> Result<MappingConfig, ConfigError> {
        let mut buttons = BTreeMap::new();
        for spec in &self.buttons {
            let (source, target) = parse_button_spec(spec)?;
            let target = target.to_string();
            match buttons.insert(source.name().to_string(), target.clone()) {
                Some(first) if first != target => {
                    return Err(ConfigError::DuplicateButton {
                        name: source.name().to_string(),
                        first,
                        second: target,
                    })
                }
                _ => {}
            }
        }

        Ok(MappingConfig {
            buttons,
            sticks: self
                .sticks
                .iter()
                .map(|s| parse_stick_spec(s))
                .collect::<Result<_, _>>()?,
            gyro: self
                .gyros
                .iter()
                .map(|s| parse_gyro_spec(s))
                .collect::<Result<_, _>>()?,
            hat: self.dpad,
            trigger_threshold: self.trigger_threshold,
            gyro_calibration: self.calibrate_gyro,
        })
    }
}

/// Parse `<src>:<B1|B2>`
pub fn parse_button_spec(spec: &str) -> Result<(SourceButton, ActionButton), ConfigError> {
    let invalid = || ConfigError::InvalidSpec {
        what: "button mapping",
        spec: spec.to_string(),
    };

    let (source, target) = spec.split_once(':').ok_or_else(invalid)?;
    // The d-pad has its own mapping
    let source = source.parse::<SourceButton>()?;
    if source.is_dpad() {
        return Err(invalid());
    }

    let target = target.parse::<ActionButton>().map_err(|_| invalid())?;
    Ok((source, target))
}

/// Parse `<L|R>[,lo=<v>][,hi=<v>][,ht=<v>]`
pub fn parse_stick_spec(spec: &str) -> Result<StickConfig, ConfigError> {
    let mut parts = spec.split(',');
    let which = parts.next().unwrap_or_default();
    which.parse::<Stick>()?;

    let mut config = StickConfig {
        which: which.to_string(),
        lo: None,
        hi: None,
        ht: None,
    };

    for part in parts {
        let (key, value) = parse_option(part, "stick parameter")?;
        match key {
            "lo" => config.lo = Some(value),
            "hi" => config.hi = Some(value),
            "ht" => config.ht = Some(value),
            _ => {
                return Err(ConfigError::InvalidSpec {
                    what: "stick parameter",
                    spec: part.to_string(),
                })
            }
        }
    }

    Ok(config)
}

/// Parse `<axis>:<U|D|L|R>[,th=<v>][,hy=<v>][,<button>...]`
pub fn parse_gyro_spec(spec: &str) -> Result<GyroConfig, ConfigError> {
    let mut parts = spec.split(',');
    let head = parts.next().unwrap_or_default();

    let invalid = || ConfigError::InvalidSpec {
        what: "gyro",
        spec: head.to_string(),
    };
    let (axis, button) = head.split_once(':').ok_or_else(invalid)?;
    axis.parse::<GyroAxis>()?;
    if !button.parse::<OutputButton>().is_ok_and(OutputButton::is_direction) {
        return Err(invalid());
    }

    let mut config = GyroConfig {
        axis: axis.to_string(),
        button: button.to_string(),
        threshold: None,
        delta: None,
        triggers: Vec::new(),
    };

    for part in parts {
        if part.parse::<SourceButton>().is_ok() {
            config.triggers.push(part.to_string());
            continue;
        }

        let (key, value) = parse_option(part, "gyro option")?;
        match key {
            "th" => config.threshold = Some(value),
            "hy" => config.delta = Some(value),
            _ => {
                return Err(ConfigError::InvalidSpec {
                    what: "gyro option",
                    spec: part.to_string(),
                })
            }
        }
    }

    Ok(config)
}

fn parse_option<'a>(part: &'a str, what: &'static str) -> Result<(&'a str, f32), ConfigError> {
    part.split_once('=')
        .and_then(|(key, value)| value.parse::<f32>().ok().map(|v| (key, v)))
        .ok_or_else(|| ConfigError::InvalidSpec {
            what,
            spec: part.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_spec() {
        assert_eq!(
            parse_button_spec("LT:B2").unwrap(),
            (SourceButton::LeftTrigger, ActionButton::B2)
        );
        assert!(parse_button_spec("A").is_err());
        assert!(parse_button_spec("A:U").is_err());
        // D-pad directions are mapped with --dpad
        assert!(parse_button_spec("U:B1").is_err());
        assert!(parse_button_spec("START:B1").is_err());
    }

    #[test]
    fn test_stick_spec() {
        let config = parse_stick_spec("L,lo=0.2,hi=0.3").unwrap();
        assert_eq!(config.which, "L");
        assert_eq!(config.lo, Some(0.2));
        assert_eq!(config.hi, Some(0.3));
        assert_eq!(config.ht, None);

        assert_eq!(parse_stick_spec("R,ht=3").unwrap().ht, Some(3.0));
        assert!(parse_stick_spec("").is_err());
        assert!(parse_stick_spec("X").is_err());
        assert!(parse_stick_spec("L,dz=0.2").is_err());
        assert!(parse_stick_spec("L,lo=abc").is_err());
    }

    #[test]
    fn test_gyro_spec() {
        let config = parse_gyro_spec("-X:L,th=15,LS,RS").unwrap();
        assert_eq!(config.axis, "-X");
        assert_eq!(config.button, "L");
        assert_eq!(config.threshold, Some(15.0));
        assert_eq!(config.delta, None);
        assert_eq!(config.triggers, vec!["LS", "RS"]);

        assert_eq!(parse_gyro_spec("Z:U,hy=2").unwrap().delta, Some(2.0));
        assert!(parse_gyro_spec("X:B1").is_err());
        assert!(parse_gyro_spec("W:U").is_err());
        assert!(parse_gyro_spec("X").is_err());
        assert!(parse_gyro_spec("X:U,speed=3").is_err());
    }

    #[test]
    fn test_args_parse_and_merge() {
        let args = Args::try_parse_from([
            "mspad-gw",
            "-b",
            "A:B1",
            "-b",
            "RT:B2",
            "-d",
            "-s",
            "L,lo=0.3,hi=0.45",
            "-g",
            "-Y:D,LT",
            "-t",
            "0.4",
        ])
        .unwrap();

        let config = args.to_config().unwrap();
        let mappings = &config.config;
        assert_eq!(mappings.buttons.get("A").map(String::as_str), Some("B1"));
        assert_eq!(mappings.buttons.get("RT").map(String::as_str), Some("B2"));
        assert!(mappings.hat);
        assert_eq!(mappings.sticks.len(), 1);
        assert_eq!(mappings.gyro[0].axis, "-Y");
        assert_eq!(mappings.trigger_threshold, Some(0.4));
    }

    #[test]
    fn test_args_extend_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.json");
        let base = r#"{ "version": 1, "config": { "buttons": { "X": "B2" } } }"#;
        std::fs::write(&path, base).unwrap();

        let args = Args::try_parse_from([
            "mspad-gw",
            "-c",
            path.to_str().unwrap(),
            "-b",
            "A:B1",
        ])
        .unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.config.buttons.len(), 2);
    }

    #[test]
    fn test_button_mapped_to_both_actions_is_rejected() {
        let args = Args::try_parse_from(["mspad-gw", "-b", "A:B1", "-b", "A:B2"]).unwrap();
        let err = args.mapping_config().unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateButton {
                name: "A".to_string(),
                first: "B1".to_string(),
                second: "B2".to_string(),
            }
        );
        assert!(args.to_config().is_err());

        // Repeating the same mapping is harmless
        let args = Args::try_parse_from(["mspad-gw", "-b", "A:B1", "-b", "A:B1"]).unwrap();
        assert_eq!(args.mapping_config().unwrap().buttons.len(), 1);
    }

    #[test]
    fn test_args_reject_invalid_values() {
        let args = Args::try_parse_from(["mspad-gw", "-s", "L,lo=0.6,hi=0.5"]).unwrap();
        assert!(args.to_config().is_err());

        let args = Args::try_parse_from(["mspad-gw", "-t", "1.0"]).unwrap();
        assert!(args.to_config().is_err());
    }
}
