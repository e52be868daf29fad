//! Codec error types

use crate::fourcc::FourCC;

/// Errors that abort a read or write.
///
/// Tolerated anomalies (resynchronised chunk headers, truncated float blocks,
/// unparseable embedded XML) are not errors; they are reported through
/// [`Diagnostics`](crate::Diagnostics) instead.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Bad magic, bad tag or an inconsistent size field
    #[error("invalid {format} data: {reason}")]
    Format {
        /// Container being decoded ("FXP", "VST3", "RIFF", ...)
        format: &'static str,
        /// Human readable cause
        reason: String,
    },

    /// The stream ended before a fixed-width field or payload was complete
    #[error("unexpected end of data: requested {requested} bytes, {available} available")]
    UnexpectedEndOfData { requested: u64, available: u64 },

    /// A structurally valid record of the wrong kind (e.g. a bank nested in a bank)
    #[error("unexpected variant: expected {expected}, found {found}")]
    UnexpectedVariant { expected: String, found: String },

    /// The VST3 chunk index has no entry for a required region
    #[error("missing required region '{0}'")]
    MissingRegion(FourCC),

    /// Meta-info XML could not be produced or parsed
    #[error("XML error: {0}")]
    Xml(String),

    /// Underlying stream failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Shorthand for [`CodecError::Format`]
    pub fn format(format: &'static str, reason: impl Into<String>) -> Self {
        CodecError::Format {
            format,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CodecError>;
