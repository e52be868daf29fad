//! Parameter presets: raw `{index, value}` stream plus names from the meta XML

use crate::cursor::{BinaryCursor, Endian};
use crate::error::{CodecError, Result};

/// Bytes per stream record: u32 index + f64 value
pub const PARAMETER_RECORD_SIZE: usize = 12;

/// One named parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub index: u32,
    pub value: f64,
}

/// Parameters in declaration order
///
/// Hosts read parameters back positionally, so the order of `add` calls is
/// the order written to both the component stream and the meta XML.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, index: u32, value: f64) -> &mut Self {
        self.parameters.push(Parameter {
            name: name.into(),
            index,
            value,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn by_index(&self, index: u32) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.index == index)
    }

    /// Pair stream values with names declared in the meta XML
    ///
    /// Stream order wins; a value without a declared name gets an empty one.
    pub fn from_parts(declared: &[Parameter], stream: &[(u32, f64)]) -> Self {
        let parameters = stream
            .iter()
            .map(|&(index, value)| Parameter {
                name: declared
                    .iter()
                    .find(|p| p.index == index)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                index,
                value,
            })
            .collect();
        Self { parameters }
    }

    pub fn to_stream(&self) -> Vec<u8> {
        let pairs: Vec<(u32, f64)> = self.parameters.iter().map(|p| (p.index, p.value)).collect();
        encode_stream(&pairs)
    }
}

impl From<Vec<Parameter>> for ParameterSet {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Decode a little-endian `{u32 index, f64 value}` stream
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<(u32, f64)>> {
    if bytes.len() % PARAMETER_RECORD_SIZE != 0 {
        return Err(CodecError::format(
            "VST3",
            format!(
                "parameter stream of {} bytes is not a multiple of {PARAMETER_RECORD_SIZE}",
                bytes.len()
            ),
        ));
    }

    let mut cursor = BinaryCursor::from_slice(bytes, Endian::Little);
    let mut pairs = Vec::with_capacity(bytes.len() / PARAMETER_RECORD_SIZE);
    while cursor.remaining() > 0 {
        let index = cursor.read_u32(Endian::Inherit)?;
        let value = cursor.read_f64(Endian::Inherit)?;
        pairs.push((index, value));
    }
    Ok(pairs)
}

pub fn encode_stream(pairs: &[(u32, f64)]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pairs.len() * PARAMETER_RECORD_SIZE);
    for &(index, value) in pairs {
        out.extend_from_slice(&index.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_layout() {
        let bytes = encode_stream(&[(3, 0.5)]);
        assert_eq!(&bytes[..4], &[3, 0, 0, 0]);
        assert_eq!(&bytes[4..], &0.5f64.to_le_bytes());
        assert_eq!(decode_stream(&bytes).unwrap(), vec![(3, 0.5)]);
    }

    #[test]
    fn test_stream_length_must_be_record_multiple() {
        assert!(matches!(
            decode_stream(&[0; 13]),
            Err(CodecError::Format { .. })
        ));
        assert_eq!(decode_stream(&[]).unwrap(), vec![]);
    }

    #[test]
    fn test_from_parts_keeps_stream_order() {
        let declared = vec![
            Parameter {
                name: "Gain".to_string(),
                index: 7,
                value: 0.0,
            },
            Parameter {
                name: "Mix".to_string(),
                index: 2,
                value: 0.0,
            },
        ];
        let set = ParameterSet::from_parts(&declared, &[(2, 1.0), (7, -6.0), (9, 0.1)]);
        let names: Vec<&str> = set.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mix", "Gain", ""]);
        assert_eq!(set.get("Gain").unwrap().value, -6.0);
        assert_eq!(set.by_index(9).unwrap().value, 0.1);
    }
}
