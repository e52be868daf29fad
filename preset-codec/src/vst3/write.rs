//! `.vstpreset` writing
//!
//! Regions are emitted into a buffer that starts right after the header,
//! recording each offset as it is written; the list goes last and the header
//! is stitched on once the list offset is known.

use super::*;

pub(super) fn to_bytes(preset: &VstPreset) -> Result<Vec<u8>> {
    let info = preset.meta_info.as_ref().map(MetaInfo::to_xml).transpose()?;

    let mut regions: Vec<(FourCC, &[u8])> = vec![(COMPONENT_TAG, preset.component.as_slice())];
    if let Some(controller) = &preset.controller {
        regions.push((CONTROLLER_TAG, controller.as_slice()));
    }
    if let Some(info) = &info {
        regions.push((INFO_TAG, info.as_slice()));
    }

    let mut body = BinaryCursor::in_memory(Endian::Little);
    let mut entries = Vec::with_capacity(regions.len());
    for (tag, bytes) in regions {
        entries.push(RegionEntry {
            tag,
            offset: HEADER_SIZE + body.position(),
            size: bytes.len() as u64,
        });
        body.write_bytes(bytes)?;
    }

    let list_offset = HEADER_SIZE + body.position();
    body.write_fourcc(LIST_TAG)?;
    body.write_u32(entries.len() as u32, Endian::Inherit)?;
    for entry in &entries {
        body.write_fourcc(entry.tag)?;
        body.write_i64(entry.offset as i64, Endian::Inherit)?;
        body.write_i64(entry.size as i64, Endian::Inherit)?;
    }

    let mut out = BinaryCursor::in_memory(Endian::Little);
    out.write_fourcc(PRESET_MAGIC)?;
    out.write_u32(preset.version, Endian::Inherit)?;
    out.write_bytes(&preset.class_id.to_bytes())?;
    out.write_i64(list_offset as i64, Endian::Inherit)?;
    out.write_bytes(&body.into_bytes())?;
    Ok(out.into_bytes())
}
