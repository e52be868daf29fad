//! JSON summaries of decoded files
//!
//! One [`Summary`] per input, tagged by `format`. Values are reported as
//! stored; nothing is converted into engineering units.

use preset_codec::aiff::AiffBody;
use preset_codec::fabfilter::FloatBlock;
use preset_codec::vst3::RegionEntry;
use preset_codec::{AiffFile, ComponentPayload, FxpContent, VstPreset, WaveFile};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Summary {
    VstPreset(PresetSummary),
    Fxp(FxpSummary),
    FabFilter(FloatBlockSummary),
    Wave(WaveSummary),
    Aiff(AiffSummary),
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// VST3
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegionSummary {
    pub tag: String,
    pub offset: u64,
    pub size: u64,
}

impl From<&RegionEntry> for RegionSummary {
    fn from(entry: &RegionEntry) -> Self {
        Self {
            tag: entry.tag.to_string(),
            offset: entry.offset,
            size: entry.size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub index: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetSummary {
    pub class_id: String,
    pub version: u32,
    /// Effect id when the class id is a VST2-wrapper id
    pub vst2_fx_id: Option<String>,
    pub regions: Vec<RegionSummary>,
    pub component_kind: &'static str,
    pub component_size: usize,
    pub controller_size: Option<usize>,
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fxp: Option<FxpSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fabfilter: Option<FloatBlockSummary>,
}

impl PresetSummary {
    pub fn new(preset: &VstPreset, regions: &[RegionEntry], payload: &ComponentPayload) -> Self {
        let attributes = preset
            .meta_info
            .iter()
            .flat_map(|meta| &meta.attributes)
            .map(|attr| (attr.id.clone(), attr.value.clone()))
            .collect();

        let parameters = match payload {
            ComponentPayload::Parameters(_) => preset
                .parameters()
                .map(|set| {
                    set.iter()
                        .map(|p| ParameterSummary {
                            name: p.name.clone(),
                            index: p.index,
                            value: p.value,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let fxp = match payload {
            ComponentPayload::WrappedFxp { content, .. } | ComponentPayload::Fxp(content) => {
                Some(FxpSummary::new(content))
            }
            _ => None,
        };

        let fabfilter = match payload {
            ComponentPayload::FabFilter(block) => Some(FloatBlockSummary::new(block)),
            _ => None,
        };

        Self {
            class_id: preset.class_id.to_string(),
            version: preset.version,
            vst2_fx_id: preset.class_id.vst2_fx_id().map(|id| id.to_string()),
            regions: regions.iter().map(RegionSummary::from).collect(),
            component_kind: payload.kind(),
            component_size: preset.component.len(),
            controller_size: preset.controller.as_ref().map(Vec::len),
            attributes,
            parameters,
            fxp,
            fabfilter,
        }
    }
}

// =============================================================================
// FXP / FXB
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FxpSummary {
    pub variant: String,
    pub fx_id: String,
    pub fx_version: i32,
    pub version: i32,
    pub name: Option<String>,
    pub num_programs: i32,
    pub byte_size: u64,
    pub chunk_size: Option<usize>,
    pub chunk_is_xml: bool,
    /// Parameter count of a flat program
    pub parameter_count: Option<usize>,
    /// Program names of a flat bank
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub programs: Vec<String>,
}

impl FxpSummary {
    pub fn new(content: &FxpContent) -> Self {
        let header = content.header();
        let chunk = content.chunk();
        let (parameter_count, programs) = match content {
            FxpContent::Program(program) => (Some(program.parameters.len()), Vec::new()),
            FxpContent::Bank { programs, .. } => {
                (None, programs.iter().map(|p| p.name.clone()).collect())
            }
            _ => (None, Vec::new()),
        };

        Self {
            variant: content.magic().to_string(),
            fx_id: header.fx_id.to_string(),
            fx_version: header.fx_version,
            version: header.version,
            name: content.name().map(str::to_string),
            num_programs: content.num_programs(),
            byte_size: content.byte_size(),
            chunk_size: chunk.map(|c| c.len()),
            chunk_is_xml: chunk.is_some_and(|c| c.xml.is_some()),
            parameter_count,
            programs,
        }
    }
}

// =============================================================================
// FabFilter
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BandSummary {
    pub index: usize,
    pub slots: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatBlockSummary {
    pub dialect: &'static str,
    pub magic: String,
    pub version: i32,
    pub value_count: usize,
    pub active_band_count: Option<f32>,
    pub bands: Vec<BandSummary>,
    pub globals: Vec<f32>,
}

impl FloatBlockSummary {
    pub fn new(block: &FloatBlock) -> Self {
        Self {
            dialect: block.dialect.name(),
            magic: block.dialect.magic().to_string(),
            version: block.version,
            value_count: block.values.len(),
            active_band_count: block.active_band_count(),
            bands: block
                .bands()
                .into_iter()
                .map(|band| BandSummary {
                    index: band.index,
                    slots: band.slots.to_vec(),
                })
                .collect(),
            globals: block.globals().to_vec(),
        }
    }
}

// =============================================================================
// Audio
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct WaveSummary {
    pub format_tag: Option<u16>,
    pub sample_format: Option<u16>,
    pub channels: Option<u16>,
    pub sample_rate: Option<u32>,
    pub bits_per_sample: Option<u16>,
    pub channel_mask: Option<u32>,
    pub frames: Option<u64>,
    pub data_size: Option<usize>,
    pub chunks: Vec<String>,
    pub info: Vec<(String, String)>,
}

impl WaveSummary {
    pub fn new(wave: &WaveFile) -> Self {
        let fmt = wave.format();
        Self {
            format_tag: fmt.map(|f| f.format_tag),
            sample_format: fmt.map(|f| f.sample_format()),
            channels: fmt.map(|f| f.channels),
            sample_rate: fmt.map(|f| f.sample_rate),
            bits_per_sample: fmt.map(|f| f.bits_per_sample),
            channel_mask: fmt.map(|f| f.channel_mask().bits()),
            frames: wave.frame_count(),
            data_size: wave.data().map(|data| data.len()),
            chunks: wave
                .chunks
                .iter()
                .map(|c| c.header.id.to_string())
                .collect(),
            info: wave
                .info()
                .iter()
                .map(|e| (e.key.to_string(), e.text.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AiffSummary {
    pub form_type: String,
    pub channels: Option<i16>,
    pub sample_frames: Option<u32>,
    pub sample_size: Option<i16>,
    pub sample_rate: Option<f64>,
    pub compression: Option<String>,
    pub sound_size: Option<usize>,
    pub chunks: Vec<String>,
    pub texts: Vec<(String, String)>,
}

impl AiffSummary {
    pub fn new(aiff: &AiffFile) -> Self {
        let common = aiff.common();
        Self {
            form_type: aiff.form_type.to_string(),
            channels: common.map(|c| c.channels),
            sample_frames: common.map(|c| c.sample_frames),
            sample_size: common.map(|c| c.sample_size),
            sample_rate: common.map(|c| c.sample_rate),
            compression: common
                .and_then(|c| c.compression.as_ref())
                .map(|c| format!("{} ({})", c.kind, c.name)),
            sound_size: aiff.sound().map(|s| s.samples().len()),
            chunks: aiff
                .chunks
                .iter()
                .map(|c| c.header.id.to_string())
                .collect(),
            texts: aiff
                .chunks
                .iter()
                .filter_map(|c| match &c.body {
                    AiffBody::Text { id, text } => Some((id.to_string(), text.clone())),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preset_codec::fxp::{FxpHeader, Program};
    use preset_codec::vst3::{ClassId, ParameterSet};
    use preset_codec::wave::{ChunkBody, FmtChunk, InfoEntry, ListChunk};
    use preset_codec::{Dialect, FourCC};

    #[test]
    fn test_parameter_preset_summary() {
        let mut set = ParameterSet::new();
        set.add("Gain", 0, 0.5).add("Mix", 4, 1.0);
        let class_id = ClassId::parse("E45D59E8CB2540FAB0F346E115F8AFD4").unwrap();
        let preset = VstPreset::from_parameters(class_id, &set);
        let payload = ComponentPayload::classify(&preset.component, &mut Vec::new()).unwrap();

        let summary = PresetSummary::new(&preset, &[], &payload);
        assert_eq!(summary.component_kind, "parameters");
        assert_eq!(summary.parameters.len(), 2);
        assert_eq!(summary.parameters[1].name, "Mix");
        assert_eq!(summary.vst2_fx_id, None);

        let json = Summary::VstPreset(summary).to_json().unwrap();
        assert!(json.contains("\"format\": \"vst_preset\""));
        assert!(json.contains("E45D59E8CB2540FAB0F346E115F8AFD4"));
    }

    #[test]
    fn test_wrapped_fxp_summary() {
        let content = FxpContent::Program(Program {
            header: FxpHeader::new(FourCC::new(*b"FQ2p"), 3),
            name: "Air".to_string(),
            parameters: vec![0.0; 5],
        });
        let preset = VstPreset::wrap_fxp(content, "FabFilter Pro-Q 2").unwrap();
        let payload = ComponentPayload::classify(&preset.component, &mut Vec::new()).unwrap();

        let summary = PresetSummary::new(&preset, &[], &payload);
        assert_eq!(summary.vst2_fx_id.as_deref(), Some("FQ2p"));
        let fxp = summary.fxp.unwrap();
        assert_eq!(fxp.variant, "FxCk");
        assert_eq!(fxp.name.as_deref(), Some("Air"));
        assert_eq!(fxp.parameter_count, Some(5));
        assert!(summary.parameters.is_empty());
    }

    #[test]
    fn test_float_block_summary() {
        let block = FloatBlock::new(Dialect::ProQ3, 4, vec![0.25; 16]);
        let summary = FloatBlockSummary::new(&block);
        assert_eq!(summary.dialect, "Pro-Q 3");
        assert_eq!(summary.magic, "FQ3p");
        assert_eq!(summary.bands.len(), 2);
        assert!(summary.globals.is_empty());
    }

    #[test]
    fn test_wave_summary() {
        let wave = WaveFile::from_bodies(vec![
            ChunkBody::Format(FmtChunk::pcm(2, 48000, 16)),
            ChunkBody::Data(vec![0; 40]),
            ChunkBody::List(ListChunk::Info(vec![InfoEntry::new(b"INAM", "Hall")])),
        ])
        .unwrap();
        let summary = WaveSummary::new(&wave);
        assert_eq!(summary.channels, Some(2));
        assert_eq!(summary.frames, Some(10));
        assert_eq!(summary.chunks, vec!["fmt ", "data", "LIST"]);
        assert_eq!(summary.info, vec![("INAM".to_string(), "Hall".to_string())]);
    }
}
