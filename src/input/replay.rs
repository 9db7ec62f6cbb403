//! Recorded event logs
//!
//! A replay log is a headerless CSV file, one event per line:
//!
//! ```text
//! # comment
//! button,A,1
//! axis,LX,-0.75
//! gyro,1200,0.0,0.35,0.0
//! ```
//!
//! Button values are `1` (pressed) or `0` (released), axis values are
//! normalized to -1.0..=1.0 (triggers 0.0..=1.0), gyro rows carry a
//! millisecond timestamp followed by X/Y/Z rates in rad/s.

use std::io::Read;

use thiserror::Error;
use tracing::{debug, info};

use crate::output::OutputSink;

use super::listener::{GyroSample, InputEvent};
use super::{Controller, ControllerAxis, SourceButton};

/// Errors while reading a replay log
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read replay log: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Parse every event of a replay log
pub fn read_events<R: Read>(reader: R) -> Result<Vec<InputEvent>, ReplayError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let event =
            parse_record(&record).map_err(|reason| ReplayError::Malformed { line, reason })?;
        events.push(event);
    }

    Ok(events)
}

/// Feed a replay log into `ctrl`, returning the number of events dispatched
pub fn replay<R: Read>(
    reader: R,
    ctrl: &mut Controller,
    sink: &mut dyn OutputSink,
) -> Result<usize, ReplayError> {
    let events = read_events(reader)?;
    info!("▶️  Replaying {} events into {}", events.len(), ctrl.name());

    for event in &events {
        debug!("Replay event: {:?}", event);
        ctrl.handle_event(*event, sink);
    }

    Ok(events.len())
}

fn parse_record(record: &csv::StringRecord) -> Result<InputEvent, String> {
    let field = |i: usize| record.get(i).ok_or_else(|| format!("missing field {}", i + 1));

    let kind = field(0)?;
    let expected = match kind {
        "button" | "axis" => 3,
        "gyro" => 5,
        _ => return Err(format!("unknown event kind \"{kind}\"")),
    };
    if record.len() != expected {
        return Err(format!(
            "{kind} events take {} fields, got {}",
            expected - 1,
            record.len() - 1
        ));
    }

    match kind {
        "button" => {
            let button = field(1)?.parse::<SourceButton>().map_err(|e| format!("{e}"))?;
            let pressed = match field(2)? {
                "1" => true,
                "0" => false,
                other => return Err(format!("invalid button state \"{other}\"")),
            };
            Ok(InputEvent::Button { button, pressed })
        }
        "axis" => {
            let axis = field(1)?.parse::<ControllerAxis>().map_err(|e| format!("{e}"))?;
            let value = parse_number(field(2)?)?;
            Ok(InputEvent::Axis { axis, value })
        }
        _ => {
            let ts = field(1)?;
            let timestamp = ts.parse().map_err(|_| format!("invalid timestamp \"{ts}\""))?;
            Ok(InputEvent::Gyro(GyroSample {
                timestamp,
                rate_x: parse_number(field(2)?)?,
                rate_y: parse_number(field(3)?)?,
                rate_z: parse_number(field(4)?)?,
            }))
        }
    }
}

fn parse_number(value: &str) -> Result<f32, String> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number \"{value}\""))
}
