use thiserror::Error;

/// Invalid mapping configuration, reported before any mapper is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Value {value} for {what} is out of range (must be {bound})")]
    OutOfRange {
        what: &'static str,
        value: f32,
        bound: &'static str,
    },

    #[error("Value {hi} for high deadzone is not greater than value {lo} for low deadzone")]
    DeadzoneOrder { lo: f32, hi: f32 },

    #[error("Invalid {kind} name \"{name}\"")]
    UnknownName { kind: &'static str, name: String },

    #[error("Invalid {what} specification \"{spec}\"")]
    InvalidSpec { what: &'static str, spec: String },

    #[error("Button {name} cannot drive {target} (only B1 and B2 are action buttons)")]
    NotAnActionButton { name: String, target: String },

    #[error("Button {name} is mapped twice ({first} and {second})")]
    DuplicateButton {
        name: String,
        first: String,
        second: String,
    },

    #[error("Unsupported configuration version {0}")]
    UnsupportedVersion(u32),
}
