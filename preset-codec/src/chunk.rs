//! Generic `{ id, size, payload }` chunk walking
//!
//! RIFF and IFF share the same record shape: a FourCC, a 32-bit payload size and
//! the payload itself, padded to an even length. They differ only in the byte
//! order of the size field, so one walker serves both.
//!
//! # Resynchronization
//!
//! Real-world WAV files sometimes carry an odd-sized chunk without its pad byte,
//! which throws every following header off by one. When a header id is neither
//! printable ASCII nor the all-zero sentinel, the walker rewinds three bytes
//! (re-reading one byte further on than the original id) exactly once. If the
//! retry still yields garbage the original id is kept, the chunk is treated as
//! unknown and skipped by its declared size. A second consecutive misalignment
//! is not recovered.

use std::io::{Read, Seek, Write};

use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::fourcc::FourCC;

/// Size of a chunk header (id + size)
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Location of one chunk within its container
///
/// `start` is the first payload byte; `end = start + data_size`. The next
/// sibling begins at `start + round_up_2(data_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: FourCC,
    pub data_size: u32,
    pub start: u64,
    pub end: u64,
}

impl ChunkHeader {
    pub fn new(id: FourCC, data_size: u32, start: u64) -> Self {
        Self {
            id,
            data_size,
            start,
            end: start + data_size as u64,
        }
    }

    /// Absolute position of the following chunk header
    pub fn next_sibling(&self) -> u64 {
        self.start + round_up_2(self.data_size as u64)
    }

    /// Payload length that actually fits before `container_end`
    pub fn available(&self, container_end: u64) -> u64 {
        self.end.min(container_end).saturating_sub(self.start)
    }
}

/// Round up to the next even number (RIFF/IFF word alignment)
pub fn round_up_2(n: u64) -> u64 {
    n + (n & 1)
}

/// End of a top-level container whose payload size is `declared`
///
/// The walk always runs to the end of the stream. A size field that overstates
/// the stream is reported as a truncated chunk; one that understates it (zero
/// from streaming writers, for example) is reported as a size mismatch.
pub fn container_end(
    id: FourCC,
    declared: u32,
    stream_len: u64,
    diagnostics: &mut dyn Diagnostics,
) -> u64 {
    let declared = declared as u64;
    let available = stream_len.saturating_sub(CHUNK_HEADER_SIZE);
    if declared > available {
        diagnostics.report(Diagnostic::TruncatedChunk {
            id,
            declared,
            available,
        });
    } else if declared < available {
        diagnostics.report(Diagnostic::ContainerSizeMismatch {
            id,
            declared,
            actual: available,
        });
    }
    stream_len
}

/// Iterates chunk headers between the current position and `end`
#[derive(Debug, Clone, Copy)]
pub struct ChunkWalker {
    size_order: Endian,
    end: u64,
}

impl ChunkWalker {
    /// `size_order` is the byte order of the size field; `end` is the container end
    pub fn new(size_order: Endian, end: u64) -> Self {
        Self { size_order, end }
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Read the next chunk header, or `None` once fewer than 8 bytes remain
    pub fn next_header<S: Read + Seek>(
        &self,
        cursor: &mut BinaryCursor<S>,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<Option<ChunkHeader>> {
        let offset = cursor.position();
        if self.end.saturating_sub(offset) < CHUNK_HEADER_SIZE {
            return Ok(None);
        }

        let mut id = cursor.read_fourcc()?;
        if !id.is_printable() && !id.is_zero() {
            id = self.resynchronize(cursor, offset, id, diagnostics)?;
        }

        let data_size = cursor.read_u32(self.size_order)?;
        Ok(Some(ChunkHeader::new(id, data_size, cursor.position())))
    }

    /// Position the cursor on the sibling following `header`
    pub fn skip<S: Seek>(&self, cursor: &mut BinaryCursor<S>, header: &ChunkHeader) -> Result<()> {
        cursor.seek(header.next_sibling())
    }

    fn resynchronize<S: Read + Seek>(
        &self,
        cursor: &mut BinaryCursor<S>,
        offset: u64,
        original: FourCC,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<FourCC> {
        let retry_offset = offset + 1;
        if self.end.saturating_sub(retry_offset) >= CHUNK_HEADER_SIZE {
            cursor.seek(retry_offset)?;
            let candidate = cursor.read_fourcc()?;
            if candidate.is_printable() {
                diagnostics.report(Diagnostic::Resynchronized {
                    offset: retry_offset,
                    id: candidate,
                });
                return Ok(candidate);
            }
        }

        cursor.seek(offset + 4)?;
        diagnostics.report(Diagnostic::ResynchronizationFailure {
            offset,
            id: original,
        });
        Ok(original)
    }
}

/// Write `id`, the payload size, the payload and a pad byte if the size is odd
pub fn write_chunk<S: Write + Seek>(
    cursor: &mut BinaryCursor<S>,
    id: FourCC,
    payload: &[u8],
    size_order: Endian,
) -> Result<()> {
    cursor.write_fourcc(id)?;
    cursor.write_u32(payload.len() as u32, size_order)?;
    cursor.write_bytes(payload)?;
    if payload.len() % 2 != 0 {
        cursor.write_u8(0)?;
    }
    Ok(())
}

/// Bytes occupied by a chunk with a payload of `payload_len`, padding included
pub fn chunk_footprint(payload_len: u64) -> u64 {
    CHUNK_HEADER_SIZE + round_up_2(payload_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_chunk(out: &mut Vec<u8>, id: &[u8; 4], payload: &[u8]) {
        out.extend_from_slice(id);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 != 0 {
            out.push(0);
        }
    }

    fn walk(data: &[u8], diagnostics: &mut Vec<Diagnostic>) -> Vec<ChunkHeader> {
        let mut cursor = BinaryCursor::from_slice(data, Endian::Little);
        let walker = ChunkWalker::new(Endian::Little, data.len() as u64);
        let mut headers = Vec::new();
        while let Some(header) = walker.next_header(&mut cursor, diagnostics).unwrap() {
            walker.skip(&mut cursor, &header).unwrap();
            headers.push(header);
        }
        headers
    }

    #[test]
    fn test_round_up_2() {
        assert_eq!(round_up_2(0), 0);
        assert_eq!(round_up_2(3), 4);
        assert_eq!(round_up_2(4), 4);
        assert_eq!(chunk_footprint(5), 14);
    }

    #[test]
    fn test_odd_chunk_pad_is_skipped() {
        let mut data = Vec::new();
        le_chunk(&mut data, b"junk", &[1, 2, 3]);
        le_chunk(&mut data, b"data", &[9, 9]);

        let mut diagnostics = Vec::new();
        let headers = walk(&data, &mut diagnostics);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].id, *b"junk");
        assert_eq!(headers[0].data_size, 3);
        assert_eq!(headers[0].next_sibling(), 12);
        assert_eq!(headers[1].id, *b"data");
        assert_eq!(headers[1].start, 20);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_stops_when_less_than_header_remains() {
        let mut data = Vec::new();
        le_chunk(&mut data, b"abcd", &[0; 4]);
        data.extend_from_slice(&[0x11; 7]);

        let headers = walk(&data, &mut Vec::new());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_resynchronizes_stray_byte() {
        // Odd chunk written without its pad byte
        let mut data = Vec::new();
        data.extend_from_slice(b"odd ");
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[0xF1, 0xF2, 0xF3]);
        data.extend_from_slice(b"data");
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[7, 7]);

        // A stray byte in front of a valid header is recovered by the retry
        let mut shifted = Vec::new();
        le_chunk(&mut shifted, b"odd ", &[0xF1, 0xF2, 0xF3]);
        shifted.push(0x80);
        shifted.extend_from_slice(b"data");
        shifted.extend_from_slice(&2u32.to_le_bytes());
        shifted.extend_from_slice(&[7, 7]);

        let mut diagnostics = Vec::new();
        let headers = walk(&shifted, &mut diagnostics);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[1].id, *b"data");
        assert_eq!(headers[1].data_size, 2);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::Resynchronized {
                offset: 13,
                id: FourCC::new(*b"data")
            }]
        );

        // Two-byte misalignment is not recoverable; it only has to not panic
        let _ = walk(&data, &mut Vec::new());
    }

    #[test]
    fn test_failed_resync_keeps_original_id() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xFF, 0xFE, 0xFD, 0xFC]);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[1, 2]);
        le_chunk(&mut data, b"data", &[3, 4]);

        let mut diagnostics = Vec::new();
        let headers = walk(&data, &mut diagnostics);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].id, FourCC::new([0xFF, 0xFE, 0xFD, 0xFC]));
        assert_eq!(headers[0].data_size, 2);
        assert_eq!(headers[1].id, *b"data");
        assert!(matches!(
            diagnostics[0],
            Diagnostic::ResynchronizationFailure { offset: 0, .. }
        ));
    }

    #[test]
    fn test_zero_id_is_not_resynchronized() {
        let mut data = Vec::new();
        le_chunk(&mut data, &[0, 0, 0, 0], &[0, 0]);
        le_chunk(&mut data, b"data", &[1, 1]);

        let mut diagnostics = Vec::new();
        let headers = walk(&data, &mut diagnostics);
        assert_eq!(headers.len(), 2);
        assert!(headers[0].id.is_zero());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_container_end_follows_stream() {
        let id = FourCC::new(*b"RIFF");
        let mut diagnostics = Vec::new();
        assert_eq!(container_end(id, 40, 48, &mut diagnostics), 48);
        assert!(diagnostics.is_empty());

        assert_eq!(container_end(id, 0, 48, &mut diagnostics), 48);
        assert_eq!(container_end(id, 100, 48, &mut diagnostics), 48);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::ContainerSizeMismatch {
                    id,
                    declared: 0,
                    actual: 40
                },
                Diagnostic::TruncatedChunk {
                    id,
                    declared: 100,
                    available: 40
                },
            ]
        );
    }

    #[test]
    fn test_big_endian_sizes() {
        let mut data = Vec::new();
        data.extend_from_slice(b"COMM");
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&[0; 4]);

        let mut cursor = BinaryCursor::from_slice(&data, Endian::Big);
        let walker = ChunkWalker::new(Endian::Big, data.len() as u64);
        let header = walker
            .next_header(&mut cursor, &mut Vec::new())
            .unwrap()
            .unwrap();
        assert_eq!(header.data_size, 4);
        assert_eq!(header.end, 12);
    }

    #[test]
    fn test_write_chunk_pads_odd_payload() {
        let mut cursor = BinaryCursor::in_memory(Endian::Little);
        write_chunk(&mut cursor, FourCC::new(*b"abc "), &[1, 2, 3], Endian::Little).unwrap();
        let bytes = cursor.into_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[4..8], &3u32.to_le_bytes());
        assert_eq!(bytes[11], 0);
    }
}
