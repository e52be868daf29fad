//! `fmt ` chunk decoding and encoding

use std::fmt;

use bitflags::bitflags;

use crate::cursor::{BinaryCursor, Endian};
use crate::error::{CodecError, Result};

pub const WAVE_FORMAT_PCM: u16 = 0x0001;
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// `extraSize` value that marks a WAVEFORMATEXTENSIBLE layout
pub const EXTENSIBLE_EXTRA_SIZE: u16 = 22;

/// Size of the common PCM portion of a `fmt ` chunk
const BASE_FORMAT_SIZE: usize = 16;

bitflags! {
    /// WAVEFORMATEXTENSIBLE speaker positions (`dwChannelMask`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpeakerPositions: u32 {
        const FRONT_LEFT = 0x1;
        const FRONT_RIGHT = 0x2;
        const FRONT_CENTER = 0x4;
        const LOW_FREQUENCY = 0x8;
        const BACK_LEFT = 0x10;
        const BACK_RIGHT = 0x20;
        const FRONT_LEFT_OF_CENTER = 0x40;
        const FRONT_RIGHT_OF_CENTER = 0x80;
        const BACK_CENTER = 0x100;
        const SIDE_LEFT = 0x200;
        const SIDE_RIGHT = 0x400;
        const TOP_CENTER = 0x800;
        const TOP_FRONT_LEFT = 0x1000;
        const TOP_FRONT_CENTER = 0x2000;
        const TOP_FRONT_RIGHT = 0x4000;
        const TOP_BACK_LEFT = 0x8000;
        const TOP_BACK_CENTER = 0x10000;
        const TOP_BACK_RIGHT = 0x20000;
    }
}

impl SpeakerPositions {
    /// Conventional layout for a channel count, used when a file stores mask 0
    pub fn default_for_channels(channels: u16) -> Self {
        let stereo = Self::FRONT_LEFT | Self::FRONT_RIGHT;
        let quad = stereo | Self::BACK_LEFT | Self::BACK_RIGHT;
        let surround_5_1 = quad | Self::FRONT_CENTER | Self::LOW_FREQUENCY;
        match channels {
            1 => Self::FRONT_CENTER,
            2 => stereo,
            3 => stereo | Self::FRONT_CENTER,
            4 => quad,
            5 => quad | Self::FRONT_CENTER,
            6 => surround_5_1,
            7 => surround_5_1 | Self::BACK_CENTER,
            8 => surround_5_1 | Self::SIDE_LEFT | Self::SIDE_RIGHT,
            n if n < 32 => Self::from_bits_retain((1u32 << n) - 1),
            _ => Self::from_bits_retain(u32::MAX),
        }
    }
}

/// A Windows GUID in its on-disk (mixed-endian) byte layout
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    /// KSDATAFORMAT_SUBTYPE_PCM
    pub const PCM: Guid = Guid([
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B,
        0x71,
    ]);

    /// KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
    pub const IEEE_FLOAT: Guid = Guid([
        0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B,
        0x71,
    ]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The format tag embedded in the first two bytes of a KSDATAFORMAT subtype
    pub fn format_tag(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            u16::from_le_bytes([b[4], b[5]]),
            u16::from_le_bytes([b[6], b[7]]),
            b[8],
            b[9],
            b[10],
            b[11],
            b[12],
            b[13],
            b[14],
            b[15]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}

/// Extensible-format fields following `extraSize == 22`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensible {
    pub valid_bits_per_sample: u16,
    /// Resolved mask; a stored zero becomes the channel-count default
    pub channel_mask: SpeakerPositions,
    /// Resolved subtype; an all-zero GUID becomes PCM
    pub sub_format: Guid,
}

/// What follows the 16 common bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FmtExtension {
    /// Plain 16-byte PCMWAVEFORMAT
    None,
    /// `extraSize` followed by that many opaque bytes
    Extra(Vec<u8>),
    /// WAVEFORMATEXTENSIBLE
    Extensible(Extensible),
}

/// Decoded `fmt ` chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmtChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub avg_bytes_per_sec: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub extension: FmtExtension,
}

impl FmtChunk {
    /// Plain integer PCM description
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = channels * bits_per_sample.div_ceil(8);
        Self {
            format_tag: WAVE_FORMAT_PCM,
            channels,
            sample_rate,
            avg_bytes_per_sec: sample_rate * block_align as u32,
            block_align,
            bits_per_sample,
            extension: FmtExtension::None,
        }
    }

    pub fn is_extensible(&self) -> bool {
        matches!(self.extension, FmtExtension::Extensible(_))
    }

    /// Effective sample format, looking through the extensible subtype
    pub fn sample_format(&self) -> u16 {
        match &self.extension {
            FmtExtension::Extensible(ext) => ext.sub_format.format_tag(),
            _ => self.format_tag,
        }
    }

    /// Channel mask; non-extensible formats get the channel-count default
    pub fn channel_mask(&self) -> SpeakerPositions {
        match &self.extension {
            FmtExtension::Extensible(ext) => ext.channel_mask,
            _ => SpeakerPositions::default_for_channels(self.channels),
        }
    }

    /// Decode a `fmt ` payload
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < BASE_FORMAT_SIZE {
            return Err(CodecError::format(
                "WAVE",
                format!("fmt chunk too small: {} bytes", payload.len()),
            ));
        }

        let mut cursor = BinaryCursor::from_slice(payload, Endian::Little);
        let format_tag = cursor.read_u16(Endian::Inherit)?;
        let channels = cursor.read_u16(Endian::Inherit)?;
        let sample_rate = cursor.read_u32(Endian::Inherit)?;
        let avg_bytes_per_sec = cursor.read_u32(Endian::Inherit)?;
        let block_align = cursor.read_u16(Endian::Inherit)?;
        let bits_per_sample = cursor.read_u16(Endian::Inherit)?;

        let extension = if cursor.remaining() >= 2 {
            let extra_size = cursor.read_u16(Endian::Inherit)?;
            if extra_size == EXTENSIBLE_EXTRA_SIZE {
                let valid_bits_per_sample = cursor.read_u16(Endian::Inherit)?;
                let stored_mask = cursor.read_u32(Endian::Inherit)?;
                let stored_guid = Guid(cursor.read_array::<16>()?);

                let channel_mask = if stored_mask == 0 {
                    SpeakerPositions::default_for_channels(channels)
                } else {
                    SpeakerPositions::from_bits_retain(stored_mask)
                };
                let sub_format = if stored_guid.is_zero() {
                    Guid::PCM
                } else {
                    stored_guid
                };

                FmtExtension::Extensible(Extensible {
                    valid_bits_per_sample,
                    channel_mask,
                    sub_format,
                })
            } else {
                FmtExtension::Extra(cursor.read_bytes(extra_size as usize)?)
            }
        } else {
            FmtExtension::None
        };

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            avg_bytes_per_sec,
            block_align,
            bits_per_sample,
            extension,
        })
    }

    /// Encode back to a `fmt ` payload
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = BinaryCursor::in_memory(Endian::Little);
        cursor.write_u16(self.format_tag, Endian::Inherit)?;
        cursor.write_u16(self.channels, Endian::Inherit)?;
        cursor.write_u32(self.sample_rate, Endian::Inherit)?;
        cursor.write_u32(self.avg_bytes_per_sec, Endian::Inherit)?;
        cursor.write_u16(self.block_align, Endian::Inherit)?;
        cursor.write_u16(self.bits_per_sample, Endian::Inherit)?;

        match &self.extension {
            FmtExtension::None => {}
            FmtExtension::Extra(bytes) => {
                cursor.write_u16(bytes.len() as u16, Endian::Inherit)?;
                cursor.write_bytes(bytes)?;
            }
            FmtExtension::Extensible(ext) => {
                cursor.write_u16(EXTENSIBLE_EXTRA_SIZE, Endian::Inherit)?;
                cursor.write_u16(ext.valid_bits_per_sample, Endian::Inherit)?;
                cursor.write_u32(ext.channel_mask.bits(), Endian::Inherit)?;
                cursor.write_bytes(&ext.sub_format.0)?;
            }
        }

        Ok(cursor.into_bytes())
    }
}
