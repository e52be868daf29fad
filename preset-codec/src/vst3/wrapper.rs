//! VST2-in-VST3 wrapper payload
//!
//! ```text
//! "VstW" | u32 headerSize (8) | u32 version (1) | u32 bypass | FXP/FXB record
//! ```
//!
//! All wrapper integers are big-endian.

use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;
use crate::fxp::{self, FxpContent};

pub const WRAPPER_MAGIC: FourCC = FourCC::new(*b"VstW");
pub const WRAPPER_HEADER_SIZE: u32 = 8;
pub const WRAPPER_VERSION: u32 = 1;

/// Decoded wrapper payload
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedFxp {
    pub bypass: bool,
    pub content: FxpContent,
}

impl WrappedFxp {
    pub fn new(content: FxpContent) -> Self {
        Self {
            bypass: false,
            content,
        }
    }

    pub fn decode(bytes: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        let mut cursor = BinaryCursor::from_slice(bytes, Endian::Big);
        let magic = cursor.read_fourcc()?;
        if magic != WRAPPER_MAGIC {
            return Err(CodecError::format(
                "VstW",
                format!("expected '{WRAPPER_MAGIC}', found '{magic}'"),
            ));
        }
        let header_size = cursor.read_u32(Endian::Inherit)?;
        if header_size < WRAPPER_HEADER_SIZE {
            return Err(CodecError::format(
                "VstW",
                format!("header size {header_size} is smaller than {WRAPPER_HEADER_SIZE}"),
            ));
        }
        let _version = cursor.read_u32(Endian::Inherit)?;
        let bypass = cursor.read_u32(Endian::Inherit)? != 0;
        // Later wrapper versions may grow the header
        cursor.seek(8 + header_size as u64)?;

        let content = fxp::read(&mut cursor, diagnostics)?;
        if cursor.remaining() > 0 {
            diagnostics.report(Diagnostic::TrailingBytes {
                count: cursor.remaining(),
            });
        }
        Ok(Self { bypass, content })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = BinaryCursor::in_memory(Endian::Big);
        cursor.write_fourcc(WRAPPER_MAGIC)?;
        cursor.write_u32(WRAPPER_HEADER_SIZE, Endian::Inherit)?;
        cursor.write_u32(WRAPPER_VERSION, Endian::Inherit)?;
        cursor.write_u32(self.bypass as u32, Endian::Inherit)?;
        fxp::write(&mut cursor, &self.content)?;
        Ok(cursor.into_bytes())
    }
}
