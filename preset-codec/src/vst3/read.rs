//! `.vstpreset` reading

use std::io::{Read, Seek};

use super::*;
use crate::diagnostics::Diagnostic;
use crate::error::CodecError;

/// Read a preset from the start of the cursor
pub fn read<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    diagnostics: &mut dyn Diagnostics,
) -> Result<VstPreset> {
    let (version, class_id, list_offset) = read_header(cursor)?;
    let entries = read_list(cursor, list_offset)?;

    let mut component = None;
    let mut controller = None;
    let mut meta_info = None;

    for entry in &entries {
        match entry.tag.as_bytes() {
            b"Comp" => component = Some(read_region(cursor, entry)?),
            b"Cont" => controller = Some(read_region(cursor, entry)?),
            b"Info" => {
                let bytes = read_region(cursor, entry)?;
                match MetaInfo::from_xml(&bytes) {
                    Ok(meta) => meta_info = Some(meta),
                    Err(e) => diagnostics.report(Diagnostic::EmbeddedXmlIgnored {
                        reason: e.to_string(),
                    }),
                }
            }
            _ => diagnostics.report(Diagnostic::UnknownRegion { tag: entry.tag }),
        }
    }

    let component = component.ok_or(CodecError::MissingRegion(COMPONENT_TAG))?;

    Ok(VstPreset {
        version,
        class_id,
        component,
        controller,
        meta_info,
    })
}

/// The chunk list of a preset, without reading any region
pub fn read_index<S: Read + Seek>(cursor: &mut BinaryCursor<S>) -> Result<Vec<RegionEntry>> {
    cursor.seek(0)?;
    let (_, _, list_offset) = read_header(cursor)?;
    read_list(cursor, list_offset)
}

fn read_header<S: Read + Seek>(cursor: &mut BinaryCursor<S>) -> Result<(u32, ClassId, i64)> {
    let magic = cursor.read_fourcc()?;
    if magic != PRESET_MAGIC {
        return Err(CodecError::format(
            "VST3",
            format!("expected '{PRESET_MAGIC}', found '{magic}'"),
        ));
    }
    let version = cursor.read_u32(Endian::Little)?;
    let class_id = ClassId::from_bytes(&cursor.read_array::<CLASS_ID_SIZE>()?)?;
    let list_offset = cursor.read_i64(Endian::Little)?;
    Ok((version, class_id, list_offset))
}

fn read_list<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    list_offset: i64,
) -> Result<Vec<RegionEntry>> {
    let position = match header_list_position(cursor, list_offset)? {
        Some(position) => position,
        None => scan_for_list(cursor)?,
    };

    cursor.seek(position + 4)?;
    let count = cursor.read_u32(Endian::Little)? as u64;
    let table = count * LIST_ENTRY_SIZE;
    if table > cursor.remaining() {
        return Err(CodecError::UnexpectedEndOfData {
            requested: table,
            available: cursor.remaining(),
        });
    }

    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let tag = cursor.read_fourcc()?;
        let offset = read_length(cursor, "offset")?;
        let size = read_length(cursor, "size")?;
        entries.push(RegionEntry { tag, offset, size });
    }
    Ok(entries)
}

/// The header's list offset, if it points at a `List` tag
fn header_list_position<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    list_offset: i64,
) -> Result<Option<u64>> {
    let Ok(position) = u64::try_from(list_offset) else {
        return Ok(None);
    };
    if position < HEADER_SIZE || position + 8 > cursor.len() {
        return Ok(None);
    }
    cursor.seek(position)?;
    Ok((cursor.read_fourcc()? == LIST_TAG).then_some(position))
}

/// Search backwards for a `List` whose entry table ends exactly at end of file
fn scan_for_list<S: Read + Seek>(cursor: &mut BinaryCursor<S>) -> Result<u64> {
    let len = cursor.len();
    if len < HEADER_SIZE + 8 {
        return Err(CodecError::format("VST3", "no chunk list"));
    }
    cursor.seek(HEADER_SIZE)?;
    let tail = cursor.read_bytes((len - HEADER_SIZE) as usize)?;

    for pos in (0..=tail.len() - 8).rev() {
        if tail[pos..pos + 4] != *LIST_TAG.as_bytes() {
            continue;
        }
        let count = u32::from_le_bytes([tail[pos + 4], tail[pos + 5], tail[pos + 6], tail[pos + 7]]);
        let table_end = pos as u64 + 8 + count as u64 * LIST_ENTRY_SIZE;
        if table_end == tail.len() as u64 {
            return Ok(HEADER_SIZE + pos as u64);
        }
    }

    Err(CodecError::format("VST3", "no chunk list"))
}

fn read_length<S: Read + Seek>(cursor: &mut BinaryCursor<S>, field: &str) -> Result<u64> {
    let value = cursor.read_i64(Endian::Little)?;
    u64::try_from(value)
        .map_err(|_| CodecError::format("VST3", format!("negative region {field}: {value}")))
}

fn read_region<S: Read + Seek>(
    cursor: &mut BinaryCursor<S>,
    entry: &RegionEntry,
) -> Result<Vec<u8>> {
    let len = cursor.len();
    let fits = entry
        .offset
        .checked_add(entry.size)
        .is_some_and(|end| end <= len);
    if !fits {
        return Err(CodecError::UnexpectedEndOfData {
            requested: entry.size,
            available: len.saturating_sub(entry.offset),
        });
    }
    cursor.seek(entry.offset)?;
    cursor.read_bytes(entry.size as usize)
}
