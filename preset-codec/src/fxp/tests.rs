//! Tests for the FXP/FXB codec

use super::*;
use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::Diagnostic;
use crate::error::CodecError;

fn be_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn padded_name(name: &str) -> Vec<u8> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.resize(PROGRAM_NAME_SIZE, 0);
    bytes
}

/// The hand-assembled `FxCk` record from the format description
fn sample_program_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"CcnK");
    be_i32(&mut out, 56);
    out.extend_from_slice(b"FxCk");
    be_i32(&mut out, 1);
    out.extend_from_slice(b"abcd");
    be_i32(&mut out, 1);
    be_i32(&mut out, 2);
    out.extend_from_slice(&padded_name("Test"));
    out.extend_from_slice(&0.5f32.to_be_bytes());
    out.extend_from_slice(&1.0f32.to_be_bytes());
    out
}

fn header() -> FxpHeader {
    FxpHeader::new(FourCC::new(*b"abcd"), 1)
}

fn program(name: &str, parameters: Vec<f32>) -> Program {
    Program {
        header: header(),
        name: name.to_string(),
        parameters,
    }
}

#[test]
fn test_parse_flat_program() {
    let bytes = sample_program_bytes();
    let content = read_with(&bytes, &mut Vec::new()).unwrap();

    match &content {
        FxpContent::Program(program) => {
            assert_eq!(program.name, "Test");
            assert_eq!(program.parameters, vec![0.5, 1.0]);
            assert_eq!(program.header.fx_id, *b"abcd");
            assert_eq!(program.header.version, 1);
            assert_eq!(program.header.fx_version, 1);
        }
        other => panic!("expected Program, got {:?}", other),
    }

    // Writing it back reproduces the input byte for byte
    assert_eq!(to_bytes(&content).unwrap(), bytes);
}

#[test]
fn test_byte_size_formulas() {
    let chunk = OpaqueChunk::new(vec![7; 33]);

    let with_chunk = FxpContent::ProgramWithChunk {
        header: header(),
        num_programs: 1,
        name: "Lead".to_string(),
        chunk: chunk.clone(),
    };
    let bytes = to_bytes(&with_chunk).unwrap();
    assert_eq!(&bytes[4..8], &(52i32 + 33).to_be_bytes());
    assert_eq!(bytes.len() as u64, PREFIX_SIZE + with_chunk.byte_size());

    let bank_chunk = FxpContent::BankWithChunk {
        header: header(),
        num_programs: 16,
        reserved: [0; BANK_RESERVED_SIZE],
        chunk,
    };
    let bytes = to_bytes(&bank_chunk).unwrap();
    assert_eq!(&bytes[4..8], &(152i32 + 33).to_be_bytes());

    let flat = FxpContent::Program(program("Pad", vec![0.0; 5]));
    let bytes = to_bytes(&flat).unwrap();
    assert_eq!(&bytes[4..8], &(48i32 + 4 * 5).to_be_bytes());
    assert_eq!(bytes.len(), 8 + 48 + 20);
}

#[test]
fn test_roundtrip_all_variants() {
    let variants = vec![
        FxpContent::ProgramWithChunk {
            header: FxpHeader {
                version: 2,
                fx_id: FourCC::new(*b"Syl1"),
                fx_version: 1200,
            },
            num_programs: 1,
            name: "Exactly twenty-eight chars!!".to_string(),
            chunk: OpaqueChunk::new(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]),
        },
        FxpContent::BankWithChunk {
            header: header(),
            num_programs: 128,
            reserved: {
                let mut reserved = [0u8; BANK_RESERVED_SIZE];
                reserved[0] = 3;
                reserved[127] = 0xFF;
                reserved
            },
            chunk: OpaqueChunk::new(b"<State gain=\"0.5\"/>".to_vec()),
        },
        FxpContent::Program(program("", vec![])),
        FxpContent::Bank {
            header: header(),
            reserved: [0; BANK_RESERVED_SIZE],
            programs: vec![
                program("One", vec![0.25, 0.75]),
                program("Two", vec![-1.0]),
                program("Three", vec![]),
            ],
        },
    ];

    for content in variants {
        let bytes = to_bytes(&content).unwrap();
        let mut diagnostics = Vec::new();
        let decoded = read_with(&bytes, &mut diagnostics).unwrap();
        assert_eq!(decoded, content);
        assert_eq!(
            i32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as u64,
            content.byte_size()
        );
        assert!(
            !diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::TrailingBytes { .. }))
        );
    }
}

#[test]
fn test_name_is_truncated_to_field_width() {
    let long = "A name that is much longer than twenty-eight bytes";
    let content = FxpContent::Program(program(long, vec![1.0]));
    let bytes = to_bytes(&content).unwrap();
    assert_eq!(bytes.len(), 8 + 48 + 4);

    let decoded = read_with(&bytes, &mut Vec::new()).unwrap();
    assert_eq!(decoded.name(), Some(&long[..PROGRAM_NAME_SIZE]));
}

#[test]
fn test_chunk_payload_keeps_little_endian_bytes() {
    // Plugin state holding two little-endian integers
    let mut payload = Vec::new();
    payload.extend_from_slice(&0x0102_0304u32.to_le_bytes());
    payload.extend_from_slice(&(-2i32).to_le_bytes());

    let content = FxpContent::ProgramWithChunk {
        header: FxpHeader {
            version: 1,
            fx_id: FourCC::new(*b"NiMa"),
            fx_version: 0x0001_0203,
        },
        num_programs: 1,
        name: "Init".to_string(),
        chunk: OpaqueChunk::new(payload),
    };
    let bytes = to_bytes(&content).unwrap();

    // Outer fields are big-endian
    assert_eq!(&bytes[4..8], &[0, 0, 0, 60]);
    assert_eq!(&bytes[20..24], &[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(&bytes[56..60], &[0, 0, 0, 8]);

    let decoded = read_with(&bytes, &mut Vec::new()).unwrap();
    let chunk = decoded.chunk().unwrap();
    let mut inner = BinaryCursor::from_slice(&chunk.data, Endian::Little);
    assert_eq!(inner.read_u32(Endian::Inherit).unwrap(), 0x0102_0304);
    assert_eq!(inner.read_i32(Endian::Inherit).unwrap(), -2);
}

#[test]
fn test_embedded_xml_is_opportunistic() {
    let xml = OpaqueChunk::new(b"<?xml version=\"1.0\"?><Preset><Gain v=\"1\"/></Preset>\0".to_vec());
    assert_eq!(
        xml.xml.as_deref(),
        Some("<?xml version=\"1.0\"?><Preset><Gain v=\"1\"/></Preset>")
    );

    let mut diagnostics = Vec::new();
    let broken = OpaqueChunk::inspect(b"<Preset><Gain></Preset>".to_vec(), &mut diagnostics);
    assert_eq!(broken.xml, None);
    assert_eq!(broken.data, b"<Preset><Gain></Preset>");
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::EmbeddedXmlIgnored { .. }]
    ));

    let binary = OpaqueChunk::new(vec![0xFF, 0xFE, 0x00, 0x01]);
    assert_eq!(binary.xml, None);
}

#[test]
fn test_bad_magic() {
    let mut bytes = sample_program_bytes();
    bytes[..4].copy_from_slice(b"RIFF");
    assert!(matches!(
        read_with(&bytes, &mut Vec::new()),
        Err(CodecError::Format { format: "FXP", .. })
    ));

    let mut bytes = sample_program_bytes();
    bytes[8..12].copy_from_slice(b"FxZz");
    assert!(matches!(
        read_with(&bytes, &mut Vec::new()),
        Err(CodecError::Format { .. })
    ));
}

#[test]
fn test_byte_size_mismatch_is_fatal() {
    let mut bytes = sample_program_bytes();
    bytes[4..8].copy_from_slice(&60i32.to_be_bytes());
    assert!(matches!(
        read_with(&bytes, &mut Vec::new()),
        Err(CodecError::Format { .. })
    ));
}

#[test]
fn test_truncated_parameters() {
    let mut bytes = sample_program_bytes();
    bytes.truncate(bytes.len() - 2);
    assert!(matches!(
        read_with(&bytes, &mut Vec::new()),
        Err(CodecError::UnexpectedEndOfData { .. })
    ));
}

#[test]
fn test_bank_inside_bank_is_rejected() {
    let inner = to_bytes(&FxpContent::Bank {
        header: header(),
        reserved: [0; BANK_RESERVED_SIZE],
        programs: vec![],
    })
    .unwrap();

    let mut body = Vec::new();
    body.extend_from_slice(b"FxBk");
    be_i32(&mut body, 1);
    body.extend_from_slice(b"abcd");
    be_i32(&mut body, 1);
    be_i32(&mut body, 1);
    body.extend_from_slice(&[0; BANK_RESERVED_SIZE]);
    body.extend_from_slice(&inner);

    let mut bytes = b"CcnK".to_vec();
    be_i32(&mut bytes, body.len() as i32);
    bytes.extend_from_slice(&body);

    match read_with(&bytes, &mut Vec::new()) {
        Err(CodecError::UnexpectedVariant { expected, found }) => {
            assert_eq!(expected, "FxCk");
            assert_eq!(found, "FxBk");
        }
        other => panic!("expected UnexpectedVariant, got {:?}", other),
    }
}

#[test]
fn test_malformed_nested_program_fails_bank() {
    let bank = FxpContent::Bank {
        header: header(),
        reserved: [0; BANK_RESERVED_SIZE],
        programs: vec![program("One", vec![0.5]), program("Two", vec![0.5])],
    };
    let mut bytes = to_bytes(&bank).unwrap();
    // Second nested record: corrupt its CcnK
    let second = 8 + BANK_BASE as usize + 8 + 52;
    assert_eq!(&bytes[second..second + 4], b"CcnK");
    bytes[second..second + 4].copy_from_slice(b"XXXX");

    assert!(matches!(
        read_with(&bytes, &mut Vec::new()),
        Err(CodecError::UnexpectedVariant { .. })
    ));
}

#[test]
fn test_trailing_bytes_reported() {
    let mut bytes = sample_program_bytes();
    bytes.extend_from_slice(&[0; 3]);
    let mut diagnostics = Vec::new();
    read_with(&bytes, &mut diagnostics).unwrap();
    assert_eq!(diagnostics, vec![Diagnostic::TrailingBytes { count: 3 }]);
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("patch.fxp");
    let content = FxpContent::Program(program("Saved", vec![0.1, 0.2, 0.3]));
    write_file(&path, &content).unwrap();
    assert_eq!(read_file(&path).unwrap(), content);
}
