//! 32-digit plugin class identifiers

use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, Result};
use crate::fourcc::FourCC;

/// Width of the class id field in the preset header
pub const CLASS_ID_SIZE: usize = 32;

/// Plugin class id as 32 ASCII hex digits, case preserved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassId(String);

impl ClassId {
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != CLASS_ID_SIZE {
            return Err(CodecError::format(
                "VST3",
                format!("class id must be {CLASS_ID_SIZE} characters, got {}", text.len()),
            ));
        }
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CodecError::format(
                "VST3",
                format!("class id is not hexadecimal: {text:?}"),
            ));
        }
        Ok(Self(text.to_string()))
    }

    pub fn from_bytes(bytes: &[u8; CLASS_ID_SIZE]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| CodecError::format("VST3", "class id is not ASCII"))?;
        Self::parse(text)
    }

    /// Class id of a VST2 plugin loaded through the VST3 wrapper
    ///
    /// `"VST"`, the four-byte effect id, then the first nine bytes of the
    /// lower-cased plugin name, zero padded to sixteen bytes.
    pub fn vst2_wrapped(fx_id: FourCC, plugin_name: &str) -> Self {
        let mut raw = [0u8; 16];
        raw[..3].copy_from_slice(b"VST");
        raw[3..7].copy_from_slice(fx_id.as_bytes());
        let lower = plugin_name.to_lowercase();
        let name = lower.as_bytes();
        let len = name.len().min(9);
        raw[7..7 + len].copy_from_slice(&name[..len]);
        Self(raw.iter().map(|b| format!("{b:02X}")).collect())
    }

    /// Effect id embedded in a VST2-wrapper class id
    pub fn vst2_fx_id(&self) -> Option<FourCC> {
        let raw = self.to_raw();
        (&raw[..3] == b"VST").then(|| FourCC::new([raw[3], raw[4], raw[5], raw[6]]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The header field bytes
    pub fn to_bytes(&self) -> [u8; CLASS_ID_SIZE] {
        let mut out = [0u8; CLASS_ID_SIZE];
        out.copy_from_slice(self.0.as_bytes());
        out
    }

    /// The sixteen bytes the hex digits encode
    pub fn to_raw(&self) -> [u8; 16] {
        let mut raw = [0u8; 16];
        for (i, pair) in self.0.as_bytes().chunks(2).enumerate() {
            raw[i] = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        raw
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

impl FromStr for ClassId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validates_length_and_digits() {
        assert!(ClassId::parse("E45D59E8CB2540FAB0F346E115F8AFD4").is_ok());
        assert!(matches!(
            ClassId::parse("E45D59E8"),
            Err(CodecError::Format { .. })
        ));
        assert!(matches!(
            ClassId::parse("Z45D59E8CB2540FAB0F346E115F8AFD4"),
            Err(CodecError::Format { .. })
        ));
    }

    #[test]
    fn test_vst2_wrapped() {
        let id = ClassId::vst2_wrapped(FourCC::new(*b"FQ2p"), "FabFilter Pro-Q 2");
        assert_eq!(id.as_str(), "5653544651327066616266696C746572");
        assert_eq!(id.vst2_fx_id(), Some(FourCC::new(*b"FQ2p")));

        let short = ClassId::vst2_wrapped(FourCC::new(*b"abcd"), "Eq");
        assert_eq!(short.as_str(), "56535461626364657100000000000000");
    }

    #[test]
    fn test_native_id_has_no_fx_id() {
        let id = ClassId::parse("E45D59E8CB2540FAB0F346E115F8AFD4").unwrap();
        assert_eq!(id.vst2_fx_id(), None);
        assert_eq!(id.to_raw()[0], 0xE4);
    }
}
