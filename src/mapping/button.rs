//! Controller buttons to console action buttons

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::ConfigError;
use crate::input::{InputListener, SourceButton};
use crate::output::{OutputButton, OutputSink};

/// The console pad's two action buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionButton {
    B1,
    B2,
}

impl From<ActionButton> for OutputButton {
    fn from(button: ActionButton) -> Self {
        match button {
            ActionButton::B1 => OutputButton::Action1,
            ActionButton::B2 => OutputButton::Action2,
        }
    }
}

impl fmt::Display for ActionButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(OutputButton::from(*self).short_name())
    }
}

impl FromStr for ActionButton {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<OutputButton>()? {
            OutputButton::Action1 => Ok(ActionButton::B1),
            OutputButton::Action2 => Ok(ActionButton::B2),
            other => Err(ConfigError::NotAnActionButton {
                name: s.to_string(),
                target: other.to_string(),
            }),
        }
    }
}

/// Forwards any of its source buttons to one action button
///
/// Stateless: each source press or release is passed through as is.
#[derive(Debug, Clone)]
pub struct ButtonMapper {
    target: ActionButton,
    sources: BTreeSet<SourceButton>,
}

impl ButtonMapper {
    pub fn new(target: ActionButton) -> Self {
        Self {
            target,
            sources: BTreeSet::new(),
        }
    }

    pub fn add_source_button(&mut self, button: SourceButton) {
        self.sources.insert(button);
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

impl InputListener for ButtonMapper {
    fn describe(&self) -> String {
        let sources: Vec<&str> = self.sources.iter().map(|b| b.name()).collect();
        format!("button mapping {} -> {}", sources.join(","), self.target)
    }

    fn on_button_state(&mut self, sink: &mut dyn OutputSink, button: SourceButton, pressed: bool) {
        if !self.sources.contains(&button) {
            return;
        }

        debug!(
            "{} {} (from {})",
            if pressed { "Press" } else { "Release" },
            self.target,
            button
        );
        sink.set_button_state(self.target.into(), pressed);
    }
}
