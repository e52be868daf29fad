//! RIFF/WAVE reader and writer
//!
//! Impulse-response convolvers ship their presets as WAV files, sometimes with
//! vendor chunks in front of `data` and an odd-sized chunk missing its pad byte.
//! The reader walks every chunk with [`ChunkWalker`] (so a misaligned header is
//! resynchronized once) and keeps chunk order and unknown chunks so that
//! `WaveFile::from_bytes(&w.to_bytes()?)` reproduces `w`.
//!
//! Only the `data` chunk may be truncated: its payload is clamped to what the
//! file holds and a [`Diagnostic::TruncatedChunk`] is reported. A truncated
//! `fmt ` or `LIST` chunk is an error.

mod format;
mod info;


use std::io::{Read, Seek};
use std::path::Path;

pub use format::{
    EXTENSIBLE_EXTRA_SIZE, Extensible, FmtChunk, FmtExtension, Guid, SpeakerPositions,
    WAVE_FORMAT_EXTENSIBLE, WAVE_FORMAT_IEEE_FLOAT, WAVE_FORMAT_PCM,
};
pub use info::{INFO_LIST_TYPE, InfoEntry, ListChunk};

use crate::chunk::{
    CHUNK_HEADER_SIZE, ChunkHeader, ChunkWalker, chunk_footprint, container_end, write_chunk,
};
use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

pub const RIFF_ID: FourCC = FourCC::new(*b"RIFF");
pub const WAVE_FORM: FourCC = FourCC::new(*b"WAVE");
pub const FMT_ID: FourCC = FourCC::new(*b"fmt ");
pub const DATA_ID: FourCC = FourCC::new(*b"data");
pub const LIST_ID: FourCC = FourCC::new(*b"LIST");
/// Legacy impulse-response parameter chunk
pub const IMPULSE_ID: FourCC = FourCC::new(*b"IMPS");

/// Offset of the first chunk header: "RIFF" + size + "WAVE"
const FIRST_CHUNK_OFFSET: u64 = 12;

/// Decoded chunk payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkBody {
    Format(FmtChunk),
    /// Raw sample bytes, never decoded
    Data(Vec<u8>),
    List(ListChunk),
    /// `IMPS` payload, kept verbatim
    Impulse(Vec<u8>),
    Unknown { id: FourCC, data: Vec<u8> },
}

impl ChunkBody {
    pub fn id(&self) -> FourCC {
        match self {
            ChunkBody::Format(_) => FMT_ID,
            ChunkBody::Data(_) => DATA_ID,
            ChunkBody::List(_) => LIST_ID,
            ChunkBody::Impulse(_) => IMPULSE_ID,
            ChunkBody::Unknown { id, .. } => *id,
        }
    }

    fn encode(&self) -> Result<Vec<u8>> {
        match self {
            ChunkBody::Format(fmt) => fmt.encode(),
            ChunkBody::List(list) => list.encode(),
            ChunkBody::Data(bytes) | ChunkBody::Impulse(bytes) => Ok(bytes.clone()),
            ChunkBody::Unknown { data, .. } => Ok(data.clone()),
        }
    }
}

/// One chunk with its position in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveChunk {
    pub header: ChunkHeader,
    pub body: ChunkBody,
}

/// A WAVE file as an ordered list of chunks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WaveFile {
    pub chunks: Vec<WaveChunk>,
}

impl WaveFile {
    /// Lay out `bodies` in order, computing each header as `to_bytes` will write it
    pub fn from_bodies(bodies: Vec<ChunkBody>) -> Result<Self> {
        let mut position = FIRST_CHUNK_OFFSET;
        let mut chunks = Vec::with_capacity(bodies.len());
        for body in bodies {
            let len = body.encode()?.len() as u64;
            let size = u32::try_from(len)
                .map_err(|_| CodecError::format("WAVE", format!("chunk of {len} bytes")))?;
            let header = ChunkHeader::new(body.id(), size, position + CHUNK_HEADER_SIZE);
            position += chunk_footprint(len);
            chunks.push(WaveChunk { header, body });
        }
        Ok(Self { chunks })
    }

    /// The first `fmt ` chunk
    pub fn format(&self) -> Option<&FmtChunk> {
        self.chunks.iter().find_map(|c| match &c.body {
            ChunkBody::Format(fmt) => Some(fmt),
            _ => None,
        })
    }

    /// Sample bytes of the first `data` chunk
    pub fn data(&self) -> Option<&[u8]> {
        self.chunks.iter().find_map(|c| match &c.body {
            ChunkBody::Data(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
    }

    /// Header of the first `data` chunk, giving its absolute byte range
    pub fn data_header(&self) -> Option<&ChunkHeader> {
        self.chunks
            .iter()
            .find(|c| matches!(c.body, ChunkBody::Data(_)))
            .map(|c| &c.header)
    }

    /// Entries of the first `LIST/INFO` chunk
    pub fn info(&self) -> &[InfoEntry] {
        self.chunks
            .iter()
            .find_map(|c| match &c.body {
                ChunkBody::List(ListChunk::Info(entries)) => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn info_value(&self, key: &[u8; 4]) -> Option<&str> {
        self.info()
            .iter()
            .find(|e| e.key == *key)
            .map(|e| e.text.as_str())
    }

    /// Number of sample frames in `data`, if the format is known
    pub fn frame_count(&self) -> Option<u64> {
        let fmt = self.format()?;
        let data = self.data()?;
        (fmt.block_align > 0).then(|| data.len() as u64 / fmt.block_align as u64)
    }

    // =========================================================================
    // Reading
    // =========================================================================

    pub fn read<S: Read + Seek>(
        cursor: &mut BinaryCursor<S>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Self> {
        let magic = cursor.read_fourcc()?;
        if magic != RIFF_ID {
            return Err(CodecError::format(
                "WAVE",
                format!("expected 'RIFF', found '{magic}'"),
            ));
        }
        let riff_size = cursor.read_u32(Endian::Little)?;
        let form = cursor.read_fourcc()?;
        if form != WAVE_FORM {
            return Err(CodecError::UnexpectedVariant {
                expected: WAVE_FORM.to_string(),
                found: form.to_string(),
            });
        }

        let end = container_end(RIFF_ID, riff_size, cursor.len(), diagnostics);

        let walker = ChunkWalker::new(Endian::Little, end);
        let mut chunks = Vec::new();

        while let Some(header) = walker.next_header(cursor, diagnostics)? {
            let body = Self::read_body(cursor, &header, end, diagnostics)?;
            chunks.push(WaveChunk { header, body });
            walker.skip(cursor, &header)?;
        }

        Ok(Self { chunks })
    }

    fn read_body<S: Read + Seek>(
        cursor: &mut BinaryCursor<S>,
        header: &ChunkHeader,
        end: u64,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<ChunkBody> {
        let declared = header.data_size as u64;
        let available = header.available(end);

        let body = match header.id.as_bytes() {
            b"fmt " => ChunkBody::Format(FmtChunk::parse(&read_exact(cursor, header, end)?)?),
            b"LIST" => ChunkBody::List(ListChunk::parse(
                &read_exact(cursor, header, end)?,
                diagnostics,
            )?),
            _ => {
                if available < declared {
                    diagnostics.report(Diagnostic::TruncatedChunk {
                        id: header.id,
                        declared,
                        available,
                    });
                }
                let bytes = cursor.read_bytes(available as usize)?;
                match header.id.as_bytes() {
                    b"data" => ChunkBody::Data(bytes),
                    b"IMPS" => ChunkBody::Impulse(bytes),
                    _ => ChunkBody::Unknown {
                        id: header.id,
                        data: bytes,
                    },
                }
            }
        };
        Ok(body)
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

    // =========================================================================
    // Writing
    // =========================================================================

    /// Serialize all chunks in order, padding odd payloads
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = BinaryCursor::in_memory(Endian::Little);
        body.write_fourcc(WAVE_FORM)?;
        for chunk in &self.chunks {
            write_chunk(&mut body, chunk.body.id(), &chunk.body.encode()?, Endian::Little)?;
        }
        let body = body.into_bytes();

        let mut out = BinaryCursor::in_memory(Endian::Little);
        out.write_fourcc(RIFF_ID)?;
        out.write_u32(body.len() as u32, Endian::Inherit)?;
        out.write_bytes(&body)?;
        Ok(out.into_bytes())
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Read a payload that must be complete
fn read_exact<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    header: &ChunkHeader,
    end: u64,
) -> Result<Vec<u8>> {
    let available = header.available(end);
    if available < header.data_size as u64 {
        return Err(CodecError::UnexpectedEndOfData {
            requested: header.data_size as u64,
            available,
        });
    }
    cursor.read_bytes(header.data_size as usize)
}
