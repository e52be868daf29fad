//! AIFF / AIFF-C reader
//!
//! Same chunk shape as RIFF with big-endian sizes. `COMM` carries the sample
//! rate as an 80-bit IEEE extended float, and AIFF-C appends a compression type
//! and a Pascal-string name. Sample data is never decoded.

use std::io::{Read, Seek};
use std::path::Path;

use crate::chunk::{ChunkHeader, ChunkWalker, container_end};
use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

pub const FORM_ID: FourCC = FourCC::new(*b"FORM");
pub const AIFF_FORM: FourCC = FourCC::new(*b"AIFF");
pub const AIFC_FORM: FourCC = FourCC::new(*b"AIFC");
pub const COMMON_ID: FourCC = FourCC::new(*b"COMM");
pub const SOUND_ID: FourCC = FourCC::new(*b"SSND");

/// Chunks whose payload is plain text
pub const TEXT_IDS: [&[u8; 4]; 4] = [b"NAME", b"AUTH", b"ANNO", b"(c) "];

/// Minimum `COMM` size for plain AIFF
const COMMON_SIZE: u64 = 18;

/// AIFF-C compression descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Compression {
    pub kind: FourCC,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommonChunk {
    pub channels: i16,
    pub sample_frames: u32,
    pub sample_size: i16,
    pub sample_rate: f64,
    /// Present only in AIFF-C files
    pub compression: Option<Compression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundData {
    pub offset: u32,
    pub block_size: u32,
    /// Everything after the offset/block-size header, including any leading offset bytes
    pub bytes: Vec<u8>,
}

impl SoundData {
    /// Sample bytes after skipping `offset`
    pub fn samples(&self) -> &[u8] {
        let start = (self.offset as usize).min(self.bytes.len());
        &self.bytes[start..]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiffBody {
    Common(CommonChunk),
    Sound(SoundData),
    Text { id: FourCC, text: String },
    Unknown { id: FourCC, data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiffChunk {
    pub header: ChunkHeader,
    pub body: AiffBody,
}

/// A parsed AIFF or AIFF-C file
#[derive(Debug, Clone, PartialEq)]
pub struct AiffFile {
    pub form_type: FourCC,
    pub chunks: Vec<AiffChunk>,
}

impl AiffFile {
    pub fn is_compressed_form(&self) -> bool {
        self.form_type == AIFC_FORM
    }

    /// The `COMM` chunk; every successfully read file has one
    pub fn common(&self) -> Option<&CommonChunk> {
        self.chunks.iter().find_map(|c| match &c.body {
            AiffBody::Common(common) => Some(common),
            _ => None,
        })
    }

    pub fn sound(&self) -> Option<&SoundData> {
        self.chunks.iter().find_map(|c| match &c.body {
            AiffBody::Sound(sound) => Some(sound),
            _ => None,
        })
    }

    pub fn text(&self, id: &[u8; 4]) -> Option<&str> {
        self.chunks.iter().find_map(|c| match &c.body {
            AiffBody::Text { id: found, text } if found == id => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn read<S: Read + Seek>(
        cursor: &mut BinaryCursor<S>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self> {
        let magic = cursor.read_fourcc()?;
        if magic != FORM_ID {
            return Err(CodecError::format(
                "AIFF",
                format!("expected 'FORM', found '{magic}'"),
            ));
        }
        let form_size = cursor.read_u32(Endian::Big)?;
        let form_type = cursor.read_fourcc()?;
        if form_type != AIFF_FORM && form_type != AIFC_FORM {
            return Err(CodecError::UnexpectedVariant {
                expected: "AIFF or AIFC".to_string(),
                found: form_type.to_string(),
            });
        }

        let end = container_end(FORM_ID, form_size, cursor.len(), diagnostics);

        let walker = ChunkWalker::new(Endian::Big, end);
        let mut chunks = Vec::new();
        let compressed = form_type == AIFC_FORM;

        while let Some(header) = walker.next_header(cursor, diagnostics)? {
            let body = read_body(cursor, &header, end, compressed, diagnostics)?;
            chunks.push(AiffChunk { header, body });
            walker.skip(cursor, &header)?;
        }

        let file = Self { form_type, chunks };
        if file.common().is_none() {
            return Err(CodecError::MissingRegion(COMMON_ID));
        }
        Ok(file)
    }

    pub fn from_bytes_with(data: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        let mut cursor = BinaryCursor::from_slice(data, Endian::Big);
        Self::read(&mut cursor, diagnostics)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &mut TracingDiagnostics)
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let mut cursor = BinaryCursor::open(path, Endian::Big)?;
        Self::read(&mut cursor, &mut TracingDiagnostics)
    }
}

fn read_body<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    header: &ChunkHeader,
    end: u64,
    compressed: bool,
    diagnostics: &mut dyn Diagnostics,
) -> Result<AiffBody> {
    let declared = header.data_size as u64;
    let available = header.available(end);

    if header.id == COMMON_ID {
        if available < declared || declared < COMMON_SIZE {
            return Err(CodecError::UnexpectedEndOfData {
                requested: declared.max(COMMON_SIZE),
                available,
            });
        }
        let payload = cursor.read_bytes(declared as usize)?;
        return parse_common(&payload, compressed).map(AiffBody::Common);
    }

    if available < declared {
        diagnostics.report(Diagnostic::TruncatedChunk {
            id: header.id,
            declared,
            available,
        });
    }
    let payload = cursor.read_bytes(available as usize)?;

    if header.id == SOUND_ID {
        let mut sound = BinaryCursor::from_slice(&payload, Endian::Big);
        let offset = sound.read_u32(Endian::Inherit)?;
        let block_size = sound.read_u32(Endian::Inherit)?;
        return Ok(AiffBody::Sound(SoundData {
            offset,
            block_size,
            bytes: payload[8..].to_vec(),
        }));
    }

    if TEXT_IDS.iter().any(|id| header.id == **id) {
        let len = payload.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        return Ok(AiffBody::Text {
            id: header.id,
            text: String::from_utf8_lossy(&payload[..len]).into_owned(),
        });
    }

    Ok(AiffBody::Unknown {
        id: header.id,
        data: payload,
    })
}

fn parse_common(payload: &[u8], compressed: bool) -> Result<CommonChunk> {
    let mut cursor = BinaryCursor::from_slice(payload, Endian::Big);
    let channels = cursor.read_i16(Endian::Inherit)?;
    let sample_frames = cursor.read_u32(Endian::Inherit)?;
    let sample_size = cursor.read_i16(Endian::Inherit)?;
    let sample_rate = extended_to_f64(cursor.read_array::<10>()?)
        .ok_or_else(|| CodecError::format("AIFF", "sample rate is infinite or NaN"))?;

    let compression = if compressed && cursor.remaining() >= 4 {
        let kind = cursor.read_fourcc()?;
        let name = if cursor.remaining() > 0 {
            let count = cursor.read_u8()? as usize;
            let text = cursor.read_bytes(count.min(cursor.remaining() as usize))?;
            String::from_utf8_lossy(&text).into_owned()
        } else {
            String::new()
        };
        Some(Compression { kind, name })
    } else {
        None
    };

    Ok(CommonChunk {
        channels,
        sample_frames,
        sample_size,
        sample_rate,
        compression,
    })
}

// =============================================================================
// 80-bit extended float
// =============================================================================

/// Decode a big-endian 80-bit IEEE extended value; `None` for infinity or NaN
pub fn extended_to_f64(bytes: [u8; 10]) -> Option<f64> {
    let sign_exponent = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut mantissa = [0u8; 8];
    mantissa.copy_from_slice(&bytes[2..]);
    let mantissa = u64::from_be_bytes(mantissa);

    let negative = sign_exponent & 0x8000 != 0;
    let exponent = (sign_exponent & 0x7FFF) as i32;

    if exponent == 0x7FFF {
        return None;
    }
    if mantissa == 0 {
        return Some(0.0);
    }

    // Explicit integer bit: value = mantissa * 2^(exponent - bias - 63)
    let magnitude = mantissa as f64 * 2f64.powi(exponent - 16383 - 63);
    Some(if negative { -magnitude } else { magnitude })
}

/// Encode a finite `f64` as 80-bit IEEE extended; subnormals encode as zero
pub fn f64_to_extended(value: f64) -> [u8; 10] {
    let mut out = [0u8; 10];
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7FF) as i32;
    if exponent == 0 || !value.is_finite() {
        return out;
    }

    let sign: u16 = if value.is_sign_negative() { 0x8000 } else { 0 };
    let extended_exponent = (exponent - 1023 + 16383) as u16;
    let mantissa = ((bits & ((1u64 << 52) - 1)) | (1u64 << 52)) << 11;

    out[..2].copy_from_slice(&(sign | extended_exponent).to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}
