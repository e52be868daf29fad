//! FXP/FXB reading

use std::io::{Read, Seek};
use std::path::Path;

use super::*;
use crate::cursor::{BinaryCursor, Endian};
use crate::diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
use crate::error::{CodecError, Result};

/// Read one `CcnK` record at the cursor
///
/// Banks recurse into this function for each nested program, sharing the
/// cursor. The declared byteSize must match what was consumed.
pub fn read<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<FxpContent> {
    let start = cursor.position();
    let magic = cursor.read_fourcc()?;
    if magic != CHUNK_MAGIC {
        return Err(CodecError::format(
            "FXP",
            format!("expected '{CHUNK_MAGIC}', found '{magic}'"),
        ));
    }
    let byte_size = cursor.read_i32(Endian::Big)?;
    let fx_magic = cursor.read_fourcc()?;
    let header = read_header(cursor)?;

    let content = match fx_magic.as_bytes() {
        b"FPCh" => {
            let num_programs = cursor.read_i32(Endian::Big)?;
            let name = cursor.read_fixed_string(PROGRAM_NAME_SIZE)?;
            let chunk = read_chunk(cursor, diagnostics)?;
            FxpContent::ProgramWithChunk {
                header,
                num_programs,
                name,
                chunk,
            }
        }
        b"FBCh" => {
            let num_programs = cursor.read_i32(Endian::Big)?;
            let reserved = cursor.read_array::<BANK_RESERVED_SIZE>()?;
            let chunk = read_chunk(cursor, diagnostics)?;
            FxpContent::BankWithChunk {
                header,
                num_programs,
                reserved,
                chunk,
            }
        }
        b"FxCk" => FxpContent::Program(read_program_body(cursor, header)?),
        b"FxBk" => {
            let num_programs = read_count(cursor, "numPrograms")?;
            let reserved = cursor.read_array::<BANK_RESERVED_SIZE>()?;
            let mut programs = Vec::with_capacity(num_programs.min(1024));
            for _ in 0..num_programs {
                programs.push(read_nested_program(cursor, diagnostics)?);
            }
            FxpContent::Bank {
                header,
                reserved,
                programs,
            }
        }
        _ => {
            return Err(CodecError::format(
                "FXP",
                format!("unknown variant '{fx_magic}'"),
            ));
        }
    };

    let consumed = cursor.position() - start - PREFIX_SIZE;
    if byte_size < 0 || byte_size as u64 != consumed {
        return Err(CodecError::format(
            "FXP",
            format!("byteSize {byte_size} does not match {consumed} bytes of '{fx_magic}'"),
        ));
    }

    Ok(content)
}

/// Read a complete FXP/FXB buffer, reporting any bytes after the record
pub fn read_with(data: &[u8], diagnostics: &mut dyn Diagnostics) -> Result<FxpContent> {
    let mut cursor = BinaryCursor::from_slice(data, Endian::Big);
    let content = read(&mut cursor, diagnostics)?;
    if cursor.remaining() > 0 {
        diagnostics.report(Diagnostic::TrailingBytes {
            count: cursor.remaining(),
        });
    }
    Ok(content)
}

pub fn read_file(path: &Path) -> Result<FxpContent> {
    let mut cursor = BinaryCursor::open(path, Endian::Big)?;
    read(&mut cursor, &mut TracingDiagnostics)
}

fn read_header<S: Read + Seek>(cursor: &mut BinaryCursor<S>) -> Result<FxpHeader> {
    Ok(FxpHeader {
        version: cursor.read_i32(Endian::Big)?,
        fx_id: cursor.read_fourcc()?,
        fx_version: cursor.read_i32(Endian::Big)?,
    })
}

fn read_count<S: Read + Seek>(cursor: &mut BinaryCursor<S>, field: &str) -> Result<usize> {
    let count = cursor.read_i32(Endian::Big)?;
    usize::try_from(count)
        .map_err(|_| CodecError::format("FXP", format!("negative {field}: {count}")))
}

fn read_program_body<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    header: FxpHeader,
) -> Result<Program> {
    let num_params = read_count(cursor, "numParams")?;
    let name = cursor.read_fixed_string(PROGRAM_NAME_SIZE)?;
    let parameters = cursor.read_f32_array(num_params, Endian::Big)?;
    Ok(Program {
        header,
        name,
        parameters,
    })
}

/// Chunk size is big-endian; the payload is kept as raw bytes
fn read_chunk<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<OpaqueChunk> {
    let size = read_count(cursor, "chunkSize")?;
    let data = cursor.read_bytes(size)?;
    Ok(OpaqueChunk::inspect(data, diagnostics))
}

/// A bank entry must be a `CcnK` record holding an `FxCk` program
fn read_nested_program<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<Program> {
    let magic = cursor.peek_fourcc()?;
    if magic != CHUNK_MAGIC {
        return Err(CodecError::UnexpectedVariant {
            expected: CHUNK_MAGIC.to_string(),
            found: magic.to_string(),
        });
    }

    match read(cursor, diagnostics)? {
        FxpContent::Program(program) => Ok(program),
        other => Err(CodecError::UnexpectedVariant {
            expected: PROGRAM_MAGIC.to_string(),
            found: other.magic().to_string(),
        }),
    }
}
