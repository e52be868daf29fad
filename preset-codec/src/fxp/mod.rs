//! FXP/FXB program and bank containers
//!
//! ```text
//! "CcnK" | i32 byteSize | fxMagic | i32 version | fxID | i32 fxVersion | body
//! ```
//!
//! All header integers and flat parameter floats are big-endian. The opaque
//! chunk carried by `FPCh`/`FBCh` is stored byte-for-byte; plugins usually fill
//! it with little-endian data, so it is never reinterpreted here.

mod read;
mod write;

#[cfg(test)]
mod tests;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::diagnostics::{Diagnostic, Diagnostics, NullDiagnostics};
use crate::fourcc::FourCC;

pub use read::{read, read_file, read_with};
pub use write::{to_bytes, write, write_file};

/// Outer container magic
pub const CHUNK_MAGIC: FourCC = FourCC::new(*b"CcnK");
/// Program with opaque chunk
pub const PROGRAM_CHUNK_MAGIC: FourCC = FourCC::new(*b"FPCh");
/// Bank with opaque chunk
pub const BANK_CHUNK_MAGIC: FourCC = FourCC::new(*b"FBCh");
/// Program with flat float parameters
pub const PROGRAM_MAGIC: FourCC = FourCC::new(*b"FxCk");
/// Bank of flat programs
pub const BANK_MAGIC: FourCC = FourCC::new(*b"FxBk");

/// Fixed width of a program name
pub const PROGRAM_NAME_SIZE: usize = 28;
/// Fixed width of the reserved bank field
pub const BANK_RESERVED_SIZE: usize = 128;
/// `CcnK` + byteSize, not counted in byteSize itself
pub const PREFIX_SIZE: u64 = 8;

/// byteSize of `FPCh` without the chunk
pub const PROGRAM_CHUNK_BASE: u64 = 52;
/// byteSize of `FBCh` without the chunk
pub const BANK_CHUNK_BASE: u64 = 152;
/// byteSize of `FxCk` without the parameters
pub const PROGRAM_BASE: u64 = 48;
/// byteSize of `FxBk` without the nested programs
pub const BANK_BASE: u64 = 148;

/// Fields shared by every variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FxpHeader {
    pub version: i32,
    pub fx_id: FourCC,
    pub fx_version: i32,
}

impl FxpHeader {
    pub fn new(fx_id: FourCC, fx_version: i32) -> Self {
        Self {
            version: 1,
            fx_id,
            fx_version,
        }
    }
}

/// Opaque plugin state with an opportunistic XML reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueChunk {
    pub data: Vec<u8>,
    /// The payload as text, when it is well-formed XML
    pub xml: Option<String>,
}

impl OpaqueChunk {
    pub fn new(data: Vec<u8>) -> Self {
        Self::inspect(data, &mut NullDiagnostics)
    }

    /// Keep `data` and try to read it as XML, reporting why it is not
    pub fn inspect(data: Vec<u8>, diagnostics: &mut dyn Diagnostics) -> Self {
        let xml = match detect_xml(&data) {
            Ok(text) => Some(text),
            Err(reason) => {
                diagnostics.report(Diagnostic::EmbeddedXmlIgnored { reason });
                None
            }
        };
        Self { data, xml }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A flat program (`FxCk`), also the element type of `FxBk` banks
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub header: FxpHeader,
    pub name: String,
    pub parameters: Vec<f32>,
}

/// Decoded FXP/FXB content
#[derive(Debug, Clone, PartialEq)]
pub enum FxpContent {
    ProgramWithChunk {
        header: FxpHeader,
        num_programs: i32,
        name: String,
        chunk: OpaqueChunk,
    },
    BankWithChunk {
        header: FxpHeader,
        num_programs: i32,
        reserved: [u8; BANK_RESERVED_SIZE],
        chunk: OpaqueChunk,
    },
    Program(Program),
    Bank {
        header: FxpHeader,
        reserved: [u8; BANK_RESERVED_SIZE],
        programs: Vec<Program>,
    },
}

impl FxpContent {
    pub fn header(&self) -> &FxpHeader {
        match self {
            FxpContent::ProgramWithChunk { header, .. }
            | FxpContent::BankWithChunk { header, .. }
            | FxpContent::Bank { header, .. } => header,
            FxpContent::Program(program) => &program.header,
        }
    }

    /// Variant tag written after `CcnK`
    pub fn magic(&self) -> FourCC {
        match self {
            FxpContent::ProgramWithChunk { .. } => PROGRAM_CHUNK_MAGIC,
            FxpContent::BankWithChunk { .. } => BANK_CHUNK_MAGIC,
            FxpContent::Program(_) => PROGRAM_MAGIC,
            FxpContent::Bank { .. } => BANK_MAGIC,
        }
    }

    pub fn is_bank(&self) -> bool {
        matches!(
            self,
            FxpContent::BankWithChunk { .. } | FxpContent::Bank { .. }
        )
    }

    /// File extension without the dot: `fxb` for banks, `fxp` otherwise
    pub fn extension(&self) -> &'static str {
        if self.is_bank() { "fxb" } else { "fxp" }
    }

    /// Program name; banks have none
    pub fn name(&self) -> Option<&str> {
        match self {
            FxpContent::ProgramWithChunk { name, .. } => Some(name),
            FxpContent::Program(program) => Some(&program.name),
            _ => None,
        }
    }

    pub fn chunk(&self) -> Option<&OpaqueChunk> {
        match self {
            FxpContent::ProgramWithChunk { chunk, .. }
            | FxpContent::BankWithChunk { chunk, .. } => Some(chunk),
            _ => None,
        }
    }

    /// Number of programs the container describes
    pub fn num_programs(&self) -> i32 {
        match self {
            FxpContent::ProgramWithChunk { num_programs, .. }
            | FxpContent::BankWithChunk { num_programs, .. } => *num_programs,
            FxpContent::Program(_) => 1,
            FxpContent::Bank { programs, .. } => programs.len() as i32,
        }
    }

    /// The byteSize field `write` emits for this content
    pub fn byte_size(&self) -> u64 {
        match self {
            FxpContent::ProgramWithChunk { chunk, .. } => PROGRAM_CHUNK_BASE + chunk.len() as u64,
            FxpContent::BankWithChunk { chunk, .. } => BANK_CHUNK_BASE + chunk.len() as u64,
            FxpContent::Program(program) => program_byte_size(program),
            FxpContent::Bank { programs, .. } => {
                BANK_BASE
                    + programs
                        .iter()
                        .map(|p| PREFIX_SIZE + program_byte_size(p))
                        .sum::<u64>()
            }
        }
    }
}

fn program_byte_size(program: &Program) -> u64 {
    PROGRAM_BASE + 4 * program.parameters.len() as u64
}

/// Well-formed XML text, or the reason the payload is not
fn detect_xml(data: &[u8]) -> Result<String, String> {
    let len = data.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    let text = std::str::from_utf8(&data[..len]).map_err(|e| format!("not UTF-8: {e}"))?;
    if !text.trim_start_matches('\u{feff}').trim_start().starts_with('<') {
        return Err("no leading markup".to_string());
    }

    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    let mut elements = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                elements += 1;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Empty(_)) => elements += 1,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    if elements == 0 {
        return Err("no elements".to_string());
    }
    if depth != 0 {
        return Err("unclosed element".to_string());
    }
    Ok(text.to_string())
}
