//! Classifying VST3 component data
//!
//! The `Comp` region is plugin-defined. A few layouts are common enough to
//! recognise by their leading magic; anything else stays opaque.

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::fabfilter::{Dialect, FloatBlock};
use crate::fourcc::FourCC;
use crate::fxp::{self, CHUNK_MAGIC, FxpContent};
use crate::vst3::{PARAMETER_RECORD_SIZE, WRAPPER_MAGIC, WrappedFxp, decode_stream};

/// What a component region turned out to hold
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentPayload {
    /// `VstW` wrapper around an FXP/FXB record
    WrappedFxp { bypass: bool, content: FxpContent },
    /// A bare `CcnK` record
    Fxp(FxpContent),
    FabFilter(FloatBlock),
    /// `{u32 index, f64 value}` stream
    Parameters(Vec<(u32, f64)>),
    Opaque(Vec<u8>),
}

impl ComponentPayload {
    /// Recognise `bytes`; a recognised magic that fails to decode is an error
    pub fn classify(bytes: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        if let Some(head) = bytes.first_chunk::<4>() {
            let magic = FourCC::from(head);
            if magic == WRAPPER_MAGIC {
                let wrapped = WrappedFxp::decode(bytes, diagnostics)?;
                return Ok(ComponentPayload::WrappedFxp {
                    bypass: wrapped.bypass,
                    content: wrapped.content,
                });
            }
            if magic == CHUNK_MAGIC {
                return fxp::read_with(bytes, diagnostics).map(ComponentPayload::Fxp);
            }
            if Dialect::from_magic(magic).is_some() {
                return FloatBlock::from_bytes_with(bytes, diagnostics)
                    .map(ComponentPayload::FabFilter);
            }
        }

        if !bytes.is_empty() && bytes.len() % PARAMETER_RECORD_SIZE == 0 {
            return decode_stream(bytes).map(ComponentPayload::Parameters);
        }

        Ok(ComponentPayload::Opaque(bytes.to_vec()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ComponentPayload::WrappedFxp { .. } => "vst2-wrapper",
            ComponentPayload::Fxp(_) => "fxp",
            ComponentPayload::FabFilter(_) => "fabfilter",
            ComponentPayload::Parameters(_) => "parameters",
            ComponentPayload::Opaque(_) => "opaque",
        }
    }

    /// Standalone file contents and extension, for payloads that have one
    pub fn extract(&self) -> Result<Option<(Vec<u8>, &'static str)>> {
        match self {
            ComponentPayload::WrappedFxp { content, .. } | ComponentPayload::Fxp(content) => {
                Ok(Some((fxp::to_bytes(content)?, content.extension())))
            }
            ComponentPayload::FabFilter(block) => Ok(Some((block.to_bytes()?, "ffp"))),
            ComponentPayload::Parameters(_) | ComponentPayload::Opaque(_) => Ok(None),
        }
    }
}
