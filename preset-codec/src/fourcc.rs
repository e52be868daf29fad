//! Four-character codes

use std::fmt;

/// A 4-byte ASCII tag identifying a chunk, region or record type
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// All four bytes are printable ASCII (space included)
    pub fn is_printable(&self) -> bool {
        self.0.iter().all(|b| (0x20..=0x7E).contains(b))
    }

    /// The all-zero sentinel some writers leave in padding
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }
}

impl PartialEq<[u8; 4]> for FourCC {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&[u8; 4]> for FourCC {
    fn eq(&self, other: &&[u8; 4]) -> bool {
        &self.0 == *other
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if (0x20..=0x7E).contains(&b) {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_escapes_binary() {
        assert_eq!(FourCC::new(*b"fmt ").to_string(), "fmt ");
        assert_eq!(FourCC::new([b'a', 0, 0xFF, b'z']).to_string(), "a\\x00\\xFFz");
    }

    #[test]
    fn test_printable_and_zero() {
        assert!(FourCC::new(*b"LIST").is_printable());
        assert!(!FourCC::new([0, b'd', b'a', b't']).is_printable());
        assert!(FourCC::new([0; 4]).is_zero());
        assert!(FourCC::new(*b"data") == *b"data");
    }
}
