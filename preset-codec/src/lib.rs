//! Preset-Codec: binary container codecs for audio plugin presets
//!
//! Plugin presets travel in a handful of chunk-oriented binary formats. This
//! crate reads and writes them byte-exact so that a converter can move plugin
//! state between hosts without touching its meaning.
//!
//! # Formats
//!
//! - **RIFF/WAVE** and **AIFF/AIFF-C**: impulse-response files for convolution
//!   reverbs. Chunks are walked generically, odd sizes are padded, and a single
//!   misaligned header is resynchronized.
//! - **FXP/FXB**: VST2 programs and banks, four variants, banks nesting programs.
//!   Big-endian headers around little-endian plugin chunks.
//! - **VST3 `.vstpreset`**: header, class id, component/controller/meta-info
//!   regions and a trailing chunk list of absolute offsets.
//! - **FabFilter float blocks**: magic, version, count and a flat float array.
//!
//! # Diagnostics
//!
//! Readers never log on their own. Anything tolerated instead of rejected is
//! reported to a [`Diagnostics`] sink passed in by the caller;
//! [`TracingDiagnostics`] forwards to `tracing`, and `Vec<Diagnostic>` collects.
//!
//! # Usage
//!
//! ```ignore
//! use preset_codec::{ComponentPayload, TracingDiagnostics, VstPreset};
//!
//! let preset = VstPreset::read_file("Lead.vstpreset".as_ref())?;
//! println!("Class: {}", preset.class_id);
//!
//! match ComponentPayload::classify(&preset.component, &mut TracingDiagnostics)? {
//!     ComponentPayload::WrappedFxp { content, .. } => println!("FXP: {:?}", content.name()),
//!     other => println!("Component: {}", other.kind()),
//! }
//! ```

pub mod aiff;
pub mod chunk;
pub mod component;
pub mod cursor;
pub mod diagnostics;
mod error;
pub mod fabfilter;
mod fourcc;
pub mod fxp;
pub mod vst3;
pub mod wave;

pub use aiff::AiffFile;
pub use chunk::{ChunkHeader, ChunkWalker};
pub use component::ComponentPayload;
pub use cursor::{BinaryCursor, Endian};
pub use diagnostics::{Diagnostic, Diagnostics, NullDiagnostics, TracingDiagnostics};
pub use error::{CodecError, Result};
pub use fabfilter::{Dialect, FloatBlock};
pub use fourcc::FourCC;
pub use fxp::{FxpContent, FxpHeader, OpaqueChunk, Program};
pub use vst3::{ClassId, MetaInfo, Parameter, ParameterSet, VstPreset, WrappedFxp};
pub use wave::WaveFile;

// =============================================================================
// File extensions
// =============================================================================

/// VST2 single program
pub const FXP_EXTENSION: &str = "fxp";

/// VST2 bank
pub const FXB_EXTENSION: &str = "fxb";

/// VST3 preset container
pub const VSTPRESET_EXTENSION: &str = "vstpreset";

/// FabFilter preset
pub const FFP_EXTENSION: &str = "ffp";
