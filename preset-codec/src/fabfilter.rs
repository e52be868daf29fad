//! FabFilter Pro-Q float blocks (`.ffp`)
//!
//! ```text
//! magic[4] | i32 version | i32 count | f32[count]
//! ```
//!
//! Little-endian throughout. Bands and global parameters are positional views
//! over the flat array; no value is converted.

use std::io::{Read, Seek};
use std::path::Path;

use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

/// Floats per band in every Pro-Q generation
pub const BAND_STRIDE: usize = 7;
/// Bands stored per preset
pub const BAND_COUNT: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Pro-Q, `FPQr`
    ProQ,
    /// Pro-Q 2, `FQ2p`
    ProQ2,
    /// Pro-Q 3, `FQ3p`
    ProQ3,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::ProQ, Dialect::ProQ2, Dialect::ProQ3];

    pub fn magic(self) -> FourCC {
        match self {
            Dialect::ProQ => FourCC::new(*b"FPQr"),
            Dialect::ProQ2 => FourCC::new(*b"FQ2p"),
            Dialect::ProQ3 => FourCC::new(*b"FQ3p"),
        }
    }

    pub fn from_magic(magic: FourCC) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.magic() == magic)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::ProQ => "Pro-Q",
            Dialect::ProQ2 => "Pro-Q 2",
            Dialect::ProQ3 => "Pro-Q 3",
        }
    }

    /// Index of the first band slot; Pro-Q leads with the active band count
    pub fn band_offset(self) -> usize {
        match self {
            Dialect::ProQ => 1,
            Dialect::ProQ2 | Dialect::ProQ3 => 0,
        }
    }
}

/// The raw floats of one band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSlots<'a> {
    pub index: usize,
    pub slots: &'a [f32],
}

/// A decoded float block
#[derive(Debug, Clone, PartialEq)]
pub struct FloatBlock {
    pub dialect: Dialect,
    pub version: i32,
    pub values: Vec<f32>,
}

impl FloatBlock {
    pub fn new(dialect: Dialect, version: i32, values: Vec<f32>) -> Self {
        Self {
            dialect,
            version,
            values,
        }
    }

    /// Complete bands present in the array, in slot order
    pub fn bands(&self) -> Vec<BandSlots<'_>> {
        let offset = self.dialect.band_offset();
        (0..BAND_COUNT)
            .map_while(|index| {
                let start = offset + index * BAND_STRIDE;
                self.values
                    .get(start..start + BAND_STRIDE)
                    .map(|slots| BandSlots { index, slots })
            })
            .collect()
    }

    /// Everything after the last band slot
    pub fn globals(&self) -> &[f32] {
        let end = self.dialect.band_offset() + BAND_COUNT * BAND_STRIDE;
        &self.values[end.min(self.values.len())..]
    }

    /// Pro-Q's leading active-band count
    pub fn active_band_count(&self) -> Option<f32> {
        match self.dialect {
            Dialect::ProQ => self.values.first().copied(),
            _ => None,
        }
    }

    /// Read a block, keeping whatever floats are present if it is cut short
    pub fn read<S: Read + Seek>(
        cursor: &mut BinaryCursor<S>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self> {
        let magic = cursor.read_fourcc()?;
        let dialect = Dialect::from_magic(magic).ok_or_else(|| {
            CodecError::format("FabFilter", format!("unknown magic '{magic}'"))
        })?;
        let version = cursor.read_i32(Endian::Little)?;
        let count = cursor.read_i32(Endian::Little)?;
        let declared = usize::try_from(count).map_err(|_| {
            CodecError::format("FabFilter", format!("negative parameter count {count}"))
        })?;

        let available = (cursor.remaining() / 4) as usize;
        let read = declared.min(available);
        if read < declared {
            diagnostics.report(Diagnostic::TruncatedFloatBlock { declared, read });
        }
        let values = cursor.read_f32_array(read, Endian::Little)?;

        Ok(Self {
            dialect,
            version,
            values,
        })
    }

    pub fn from_bytes_with(data: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        let mut cursor = BinaryCursor::from_slice(data, Endian::Little);
        Self::read(&mut cursor, diagnostics)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &mut TracingDiagnostics)
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let mut cursor = BinaryCursor::open(path, Endian::Little)?;
        Self::read(&mut cursor, &mut TracingDiagnostics)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = i32::try_from(self.values.len()).map_err(|_| {
            CodecError::format("FabFilter", "too many parameters for an i32 count")
        })?;
        let mut cursor = BinaryCursor::in_memory(Endian::Little);
        cursor.write_fourcc(self.dialect.magic())?;
        cursor.write_i32(self.version, Endian::Inherit)?;
        cursor.write_i32(count, Endian::Inherit)?;
        for &value in &self.values {
            cursor.write_f32(value, Endian::Inherit)?;
        }
        Ok(cursor.into_bytes())
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}
