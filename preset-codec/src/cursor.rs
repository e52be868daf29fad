//! Seekable binary cursor with per-call byte order
//!
//! FXP payloads are big-endian, VST3 containers and RIFF are little-endian, and a
//! single `.vstpreset` can carry both. Every fixed-width read and write therefore
//! takes an [`Endian`] argument; [`Endian::Inherit`] falls back to the order the
//! cursor was created with.
//!
//! Reads are bounds-checked up front so a short stream yields
//! [`CodecError::UnexpectedEndOfData`] with the requested and available byte
//! counts instead of a bare IO error. Writes extend the stream, and the cursor
//! can be rewound to patch a previously written field.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

/// Byte order for a single read or write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    Big,
    #[default]
    Little,
    /// Use the cursor's configured order
    Inherit,
}

/// Binary cursor over any seekable stream
///
/// Owned by exactly one codec call at a time; recursive readers borrow it
/// mutably down the call chain.
#[derive(Debug)]
pub struct BinaryCursor<S> {
    stream: S,
    order: Endian,
    position: u64,
    len: u64,
}

// =============================================================================
// Construction
// =============================================================================

impl<S: Seek> BinaryCursor<S> {
    /// Wrap a stream, measuring its length and rewinding to the start
    ///
    /// `Endian::Inherit` as the default order means little-endian.
    pub fn new(mut stream: S, order: Endian) -> Result<Self> {
        let len = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;
        Ok(Self {
            stream,
            order: normalize(order),
            position: 0,
            len,
        })
    }

    /// Current absolute position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to an absolute position (may lie past the end when writing)
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.stream.seek(SeekFrom::Start(position))?;
        self.position = position;
        Ok(())
    }

    /// Total stream length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes between the position and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// The cursor's default byte order
    pub fn order(&self) -> Endian {
        self.order
    }

    pub fn set_order(&mut self, order: Endian) {
        self.order = normalize(order);
    }

    fn ensure(&self, requested: u64) -> Result<()> {
        let available = self.remaining();
        if requested > available {
            return Err(CodecError::UnexpectedEndOfData {
                requested,
                available,
            });
        }
        Ok(())
    }

    fn is_big(&self, order: Endian) -> bool {
        match order {
            Endian::Big => true,
            Endian::Little => false,
            Endian::Inherit => self.order == Endian::Big,
        }
    }

    fn advance(&mut self, count: u64) {
        self.position += count;
        self.len = self.len.max(self.position);
    }
}

impl<'a> BinaryCursor<Cursor<&'a [u8]>> {
    /// Read-only cursor over a byte slice
    pub fn from_slice(data: &'a [u8], order: Endian) -> Self {
        Self {
            stream: Cursor::new(data),
            order: normalize(order),
            position: 0,
            len: data.len() as u64,
        }
    }
}

impl BinaryCursor<Cursor<Vec<u8>>> {
    /// Empty in-memory sink
    pub fn in_memory(order: Endian) -> Self {
        Self {
            stream: Cursor::new(Vec::new()),
            order: normalize(order),
            position: 0,
            len: 0,
        }
    }

    /// Consume the sink and return everything written
    pub fn into_bytes(self) -> Vec<u8> {
        self.stream.into_inner()
    }
}

impl BinaryCursor<BufReader<File>> {
    /// Open a file for reading; the handle is closed when the cursor drops
    pub fn open(path: &Path, order: Endian) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), order)
    }
}

fn normalize(order: Endian) -> Endian {
    match order {
        Endian::Inherit => Endian::Little,
        other => other,
    }
}

// =============================================================================
// Reading
// =============================================================================

macro_rules! read_fixed {
    ($name:ident, $ty:ty, $size:expr, $method:ident) => {
        pub fn $name(&mut self, order: Endian) -> Result<$ty> {
            self.ensure($size)?;
            let value = if self.is_big(order) {
                self.stream.$method::<BigEndian>()?
            } else {
                self.stream.$method::<LittleEndian>()?
            };
            self.advance($size);
            Ok(value)
        }
    };
}

impl<S: Read + Seek> BinaryCursor<S> {
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.stream.read_u8()?;
        self.advance(1);
        Ok(value)
    }

    read_fixed!(read_u16, u16, 2, read_u16);
    read_fixed!(read_u32, u32, 4, read_u32);
    read_fixed!(read_u64, u64, 8, read_u64);
    read_fixed!(read_i16, i16, 2, read_i16);
    read_fixed!(read_i32, i32, 4, read_i32);
    read_fixed!(read_i64, i64, 8, read_i64);
    read_fixed!(read_f32, f32, 4, read_f32);
    read_fixed!(read_f64, f64, 8, read_f64);

    /// Read exactly `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.ensure(count as u64)?;
        let mut buf = vec![0u8; count];
        self.stream.read_exact(&mut buf)?;
        self.advance(count as u64);
        Ok(buf)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N as u64)?;
        let mut buf = [0u8; N];
        self.stream.read_exact(&mut buf)?;
        self.advance(N as u64);
        Ok(buf)
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC> {
        self.read_array::<4>().map(FourCC)
    }

    /// Read the next tag without consuming it
    pub fn peek_fourcc(&mut self) -> Result<FourCC> {
        let start = self.position;
        let tag = self.read_fourcc()?;
        self.seek(start)?;
        Ok(tag)
    }

    /// Read a `width`-byte field and cut it at the first NUL
    pub fn read_fixed_string(&mut self, width: usize) -> Result<String> {
        let bytes = self.read_bytes(width)?;
        Ok(decode_string(&bytes))
    }

    /// Read bytes up to and including a NUL terminator
    pub fn read_null_terminated_string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                b => bytes.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read `count` consecutive floats
    pub fn read_f32_array(&mut self, count: usize, order: Endian) -> Result<Vec<f32>> {
        self.ensure(count as u64 * 4)?;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read_f32(order)?);
        }
        Ok(values)
    }
}

/// Decode a fixed-width text field: everything before the first NUL
pub(crate) fn decode_string(bytes: &[u8]) -> String {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..len]).into_owned()
}

// =============================================================================
// Writing
// =============================================================================

macro_rules! write_fixed {
    ($name:ident, $ty:ty, $size:expr, $method:ident) => {
        pub fn $name(&mut self, value: $ty, order: Endian) -> Result<()> {
            if self.is_big(order) {
                self.stream.$method::<BigEndian>(value)?;
            } else {
                self.stream.$method::<LittleEndian>(value)?;
            }
            self.advance($size);
            Ok(())
        }
    };
}

impl<S: Write + Seek> BinaryCursor<S> {
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.stream.write_u8(value)?;
        self.advance(1);
        Ok(())
    }

    write_fixed!(write_u16, u16, 2, write_u16);
    write_fixed!(write_u32, u32, 4, write_u32);
    write_fixed!(write_u64, u64, 8, write_u64);
    write_fixed!(write_i16, i16, 2, write_i16);
    write_fixed!(write_i32, i32, 4, write_i32);
    write_fixed!(write_i64, i64, 8, write_i64);
    write_fixed!(write_f32, f32, 4, write_f32);
    write_fixed!(write_f64, f64, 8, write_f64);

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.advance(bytes.len() as u64);
        Ok(())
    }

    pub fn write_fourcc(&mut self, tag: FourCC) -> Result<()> {
        self.write_bytes(&tag.0)
    }

    /// Write `text` into a `width`-byte field, truncated or NUL padded
    pub fn write_fixed_string(&mut self, text: &str, width: usize) -> Result<()> {
        self.write_bytes(&encode_fixed(text, width))
    }

    pub fn write_null_terminated_string(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())?;
        self.write_u8(0)
    }
}

/// Encode `text` into exactly `width` bytes, NUL padded
pub(crate) fn encode_fixed(text: &str, width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    let bytes = text.as_bytes();
    let copy_len = bytes.len().min(width);
    buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
    buf
}
