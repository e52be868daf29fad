//! FXP/FXB writing
//!
//! The record body is serialized into memory first; byteSize is then the
//! body length and is written in front of it.

use std::io::{Seek, Write};
use std::path::Path;

use super::*;
use crate::cursor::{BinaryCursor, Endian};
use crate::error::{CodecError, Result};

/// Serialize `content` to a complete `CcnK` record
pub fn to_bytes(content: &FxpContent) -> Result<Vec<u8>> {
    stitch(&encode_body(content)?)
}

/// Prefix a serialized body with `CcnK` and its byteSize
fn stitch(body: &[u8]) -> Result<Vec<u8>> {
    let byte_size = checked_i32(body.len(), "byteSize")?;

    let mut out = BinaryCursor::in_memory(Endian::Big);
    out.write_fourcc(CHUNK_MAGIC)?;
    out.write_i32(byte_size, Endian::Inherit)?;
    out.write_bytes(body)?;
    Ok(out.into_bytes())
}

/// Append the record for `content` at the cursor
pub fn write<S: Write + Seek>(cursor: &mut BinaryCursor<S>, content: &FxpContent) -> Result<()> {
    cursor.write_bytes(&to_bytes(content)?)
}

pub fn write_file(path: &Path, content: &FxpContent) -> Result<()> {
    std::fs::write(path, to_bytes(content)?)?;
    Ok(())
}

fn encode_body(content: &FxpContent) -> Result<Vec<u8>> {
    let mut body = BinaryCursor::in_memory(Endian::Big);
    body.write_fourcc(content.magic())?;
    write_header(&mut body, content.header())?;

    match content {
        FxpContent::ProgramWithChunk {
            num_programs,
            name,
            chunk,
            ..
        } => {
            body.write_i32(*num_programs, Endian::Inherit)?;
            body.write_fixed_string(name, PROGRAM_NAME_SIZE)?;
            write_chunk(&mut body, chunk)?;
        }
        FxpContent::BankWithChunk {
            num_programs,
            reserved,
            chunk,
            ..
        } => {
            body.write_i32(*num_programs, Endian::Inherit)?;
            body.write_bytes(reserved)?;
            write_chunk(&mut body, chunk)?;
        }
        FxpContent::Program(program) => write_program_body(&mut body, program)?,
        FxpContent::Bank {
            reserved, programs, ..
        } => {
            body.write_i32(checked_i32(programs.len(), "numPrograms")?, Endian::Inherit)?;
            body.write_bytes(reserved)?;
            for program in programs {
                let mut nested = BinaryCursor::in_memory(Endian::Big);
                nested.write_fourcc(PROGRAM_MAGIC)?;
                write_header(&mut nested, &program.header)?;
                write_program_body(&mut nested, program)?;
                body.write_bytes(&stitch(&nested.into_bytes())?)?;
            }
        }
    }

    Ok(body.into_bytes())
}

fn write_header<S: Write + Seek>(cursor: &mut BinaryCursor<S>, header: &FxpHeader) -> Result<()> {
    cursor.write_i32(header.version, Endian::Big)?;
    cursor.write_fourcc(header.fx_id)?;
    cursor.write_i32(header.fx_version, Endian::Big)
}

fn write_program_body<S: Write + Seek>(
    cursor: &mut BinaryCursor<S>,
    program: &Program,
) -> Result<()> {
    cursor.write_i32(
        checked_i32(program.parameters.len(), "numParams")?,
        Endian::Big,
    )?;
    cursor.write_fixed_string(&program.name, PROGRAM_NAME_SIZE)?;
    for &value in &program.parameters {
        cursor.write_f32(value, Endian::Big)?;
    }
    Ok(())
}

fn write_chunk<S: Write + Seek>(cursor: &mut BinaryCursor<S>, chunk: &OpaqueChunk) -> Result<()> {
    cursor.write_i32(checked_i32(chunk.len(), "chunkSize")?, Endian::Big)?;
    cursor.write_bytes(&chunk.data)
}

fn checked_i32(value: usize, field: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| CodecError::format("FXP", format!("{field} {value} exceeds i32")))
}
