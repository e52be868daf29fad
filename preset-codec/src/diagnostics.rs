//! Diagnostic sink for tolerated anomalies
//!
//! Codecs never log directly. Anything a reader chooses to tolerate rather than
//! fail on is reported to a caller-supplied [`Diagnostics`] implementation, so
//! the same parse can feed `tracing` in the CLI and a plain `Vec` in tests.

use crate::fourcc::FourCC;

/// A non-fatal observation made while reading or writing
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A garbage chunk id was recovered by re-reading one byte further on
    Resynchronized { offset: u64, id: FourCC },
    /// The retry also produced garbage; the original id was kept
    ResynchronizationFailure { offset: u64, id: FourCC },
    /// A chunk declared more payload than the container holds
    TruncatedChunk {
        id: FourCC,
        declared: u64,
        available: u64,
    },
    /// A top-level container declared less payload than the stream holds
    ContainerSizeMismatch {
        id: FourCC,
        declared: u64,
        actual: u64,
    },
    /// A float block ended before its declared parameter count
    TruncatedFloatBlock { declared: usize, read: usize },
    /// An FXP chunk payload was not well-formed XML
    EmbeddedXmlIgnored { reason: String },
    /// A VST3 chunk index entry with a tag this codec does not know
    UnknownRegion { tag: FourCC },
    /// Bytes left over after a complete structure
    TrailingBytes { count: u64 },
}

/// Receiver for [`Diagnostic`]s
pub trait Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl Diagnostics for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::Resynchronized { offset, id } => {
                tracing::debug!("Resynchronized chunk header at {offset}: '{id}'");
            }
            Diagnostic::ResynchronizationFailure { offset, id } => {
                tracing::warn!("Unrecognizable chunk id '{id}' at {offset}, skipping by size");
            }
            Diagnostic::TruncatedChunk {
                id,
                declared,
                available,
            } => {
                tracing::warn!(
                    "Chunk '{id}' declares {declared} bytes but only {available} are present"
                );
            }
            Diagnostic::ContainerSizeMismatch {
                id,
                declared,
                actual,
            } => {
                tracing::warn!(
                    "Container '{id}' declares {declared} bytes but {actual} follow, reading to end"
                );
            }
            Diagnostic::TruncatedFloatBlock { declared, read } => {
                tracing::warn!("Float block truncated: read {read} of {declared} parameters");
            }
            Diagnostic::EmbeddedXmlIgnored { reason } => {
                tracing::debug!("Chunk payload is not XML: {reason}");
            }
            Diagnostic::UnknownRegion { tag } => {
                tracing::debug!("Ignoring unknown preset region '{tag}'");
            }
            Diagnostic::TrailingBytes { count } => {
                tracing::debug!("{count} trailing bytes after structure");
            }
        }
    }
}

/// Discards every diagnostic
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
