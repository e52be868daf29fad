//! `LIST` chunk decoding (INFO tags)

use crate::chunk::{ChunkWalker, round_up_2, write_chunk};
use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

/// List type carrying textual metadata
pub const INFO_LIST_TYPE: FourCC = FourCC::new(*b"INFO");

/// One `INFO` tag, e.g. `INAM` -> title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub key: FourCC,
    pub text: String,
}

impl InfoEntry {
    pub fn new(key: &[u8; 4], text: impl Into<String>) -> Self {
        Self {
            key: FourCC::from(key),
            text: text.into(),
        }
    }
}

/// Decoded `LIST` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChunk {
    /// `INFO` list in file order
    Info(Vec<InfoEntry>),
    /// Any other list type, kept verbatim
    Other { list_type: FourCC, data: Vec<u8> },
}

impl ListChunk {
    pub fn list_type(&self) -> FourCC {
        match self {
            ListChunk::Info(_) => INFO_LIST_TYPE,
            ListChunk::Other { list_type, .. } => *list_type,
        }
    }

    /// Decode a `LIST` payload
    pub fn parse(payload: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<Self> {
        if payload.len() < 4 {
            return Err(CodecError::format("WAVE", "LIST chunk without list type"));
        }

        let mut cursor = BinaryCursor::from_slice(payload, Endian::Little);
        let list_type = cursor.read_fourcc()?;
        if list_type != INFO_LIST_TYPE {
            return Ok(ListChunk::Other {
                list_type,
                data: payload[4..].to_vec(),
            });
        }

        let end = payload.len() as u64;
        let walker = ChunkWalker::new(Endian::Little, end);
        let mut entries = Vec::new();

        while let Some(header) = walker.next_header(&mut cursor, diagnostics)? {
            let available = header.available(end);
            if available < header.data_size as u64 {
                diagnostics.report(Diagnostic::TruncatedChunk {
                    id: header.id,
                    declared: header.data_size as u64,
                    available,
                });
            }
            let bytes = cursor.read_bytes(available as usize)?;
            entries.push(InfoEntry {
                key: header.id,
                text: decode_text(&bytes),
            });
            if header.next_sibling() >= end {
                break;
            }
            walker.skip(&mut cursor, &header)?;
        }

        Ok(ListChunk::Info(entries))
    }

    /// Encode back to a `LIST` payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = BinaryCursor::in_memory(Endian::Little);
        cursor.write_fourcc(self.list_type())?;
        match self {
            ListChunk::Info(entries) => {
                for entry in entries {
                    let mut text = entry.text.as_bytes().to_vec();
                    text.push(0);
                    write_chunk(&mut cursor, entry.key, &text, Endian::Little)?;
                }
            }
            ListChunk::Other { data, .. } => cursor.write_bytes(data)?,
        }
        Ok(cursor.into_bytes())
    }

    /// Size of the encoded payload, INFO padding included
    pub fn encoded_len(&self) -> u64 {
        match self {
            ListChunk::Info(entries) => {
                4 + entries
                    .iter()
                    .map(|e| 8 + round_up_2(e.text.len() as u64 + 1))
                    .sum::<u64>()
            }
            ListChunk::Other { data, .. } => 4 + data.len() as u64,
        }
    }
}

/// ASCII text with any trailing NULs removed
fn decode_text(bytes: &[u8]) -> String {
    let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}
