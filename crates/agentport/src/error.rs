use std::path::PathBuf;

use thiserror::Error;

use crate::capability::{Capability, join_capabilities};

/// Errors raised while parsing, emitting or writing a single descriptor.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed input {origin}: {reason}")]
    MalformedInput { origin: String, reason: String },

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error(
        "'{descriptor}' requires {} which format '{format}' cannot represent",
        join_capabilities(.capabilities)
    )]
    UnsupportedCapability {
        descriptor: String,
        format: String,
        capabilities: Vec<Capability>,
    },

    #[error("cannot merge into existing settings file {}: {reason}", .path.display())]
    InvalidSettings { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        ConvertError::MalformedInput {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(origin: impl Into<String>, field: &str) -> Self {
        ConvertError::malformed(origin, format!("missing required field '{}'", field))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
