//! Per-file conversion
//!
//! The input's extension picks the codec. Outputs land at the same relative
//! path under the output root: `Lead.fxp` becomes `Lead.fxp.json` and
//! `Lead.vstpreset`, `Lead.vstpreset` becomes `Lead.vstpreset.json` and
//! whatever its component unwraps to (`Lead.fxp`, `Lead.ffp`, ...).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use preset_codec::vst3::read_index;
use preset_codec::{
    AiffFile, BinaryCursor, ComponentPayload, Endian, FFP_EXTENSION, FXB_EXTENSION,
    FXP_EXTENSION, FloatBlock, TracingDiagnostics, VSTPRESET_EXTENSION, VstPreset, WaveFile,
    fxp,
};

use crate::config::ConvertConfig;
use crate::summary::{
    AiffSummary, FloatBlockSummary, FxpSummary, PresetSummary, Summary, WaveSummary,
};

/// Input formats the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    VstPreset,
    /// `.fxp` program or `.fxb` bank
    Fxp,
    FabFilter,
    Wave,
    Aiff,
}

impl InputKind {
    /// Detect by lower-cased extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())?;

        match ext.as_str() {
            VSTPRESET_EXTENSION => Some(Self::VstPreset),
            FXP_EXTENSION | FXB_EXTENSION => Some(Self::Fxp),
            FFP_EXTENSION => Some(Self::FabFilter),
            "wav" => Some(Self::Wave),
            "aif" | "aiff" => Some(Self::Aiff),
            _ => None,
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Paths of every file written
    Converted(Vec<PathBuf>),
    /// Not a format the converter handles
    Skipped,
}

/// Convert `path`, which lies under `input_root`, into the mirrored location
/// under `output_root`
pub fn convert_file(
    path: &Path,
    input_root: &Path,
    output_root: &Path,
    config: &ConvertConfig,
) -> Result<Outcome> {
    let Some(kind) = InputKind::from_path(path) else {
        tracing::debug!("Skipping {}", path.display());
        return Ok(Outcome::Skipped);
    };

    let relative = path.strip_prefix(input_root).with_context(|| {
        format!(
            "{} is not under {}",
            path.display(),
            input_root.display()
        )
    })?;
    let target = output_root.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut outputs = Vec::new();
    let summary = match kind {
        InputKind::VstPreset => convert_preset(&data, &target, config, &mut outputs)?,
        InputKind::Fxp => convert_fxp(&data, &target, config, &mut outputs)?,
        InputKind::FabFilter => {
            let block = FloatBlock::from_bytes_with(&data, &mut TracingDiagnostics)
                .context("Invalid FabFilter preset")?;
            Summary::FabFilter(FloatBlockSummary::new(&block))
        }
        InputKind::Wave => {
            let wave = WaveFile::from_bytes_with(&data, &mut TracingDiagnostics)
                .context("Invalid WAV file")?;
            Summary::Wave(WaveSummary::new(&wave))
        }
        InputKind::Aiff => {
            let aiff = AiffFile::from_bytes_with(&data, &mut TracingDiagnostics)
                .context("Invalid AIFF file")?;
            Summary::Aiff(AiffSummary::new(&aiff))
        }
    };

    if config.write_summaries {
        let json_path = append_extension(&target, "json");
        write_output(&json_path, summary.to_json()?.as_bytes())?;
        outputs.push(json_path);
    }

    Ok(Outcome::Converted(outputs))
}

fn convert_preset(
    data: &[u8],
    target: &Path,
    config: &ConvertConfig,
    outputs: &mut Vec<PathBuf>,
) -> Result<Summary> {
    let preset = VstPreset::from_bytes_with(data, &mut TracingDiagnostics)
        .context("Invalid VST3 preset")?;
    let regions = read_index(&mut BinaryCursor::from_slice(data, Endian::Little))?;

    let payload = ComponentPayload::classify(&preset.component, &mut TracingDiagnostics)
        .unwrap_or_else(|err| {
            tracing::warn!("Component data kept opaque: {err}");
            ComponentPayload::Opaque(preset.component.clone())
        });
    tracing::debug!("Component data: {}", payload.kind());

    if config.extract_component {
        if let Some((bytes, extension)) = payload.extract()? {
            let path = target.with_extension(extension);
            write_output(&path, &bytes)?;
            outputs.push(path);
        }
    }

    Ok(Summary::VstPreset(PresetSummary::new(
        &preset, &regions, &payload,
    )))
}

fn convert_fxp(
    data: &[u8],
    target: &Path,
    config: &ConvertConfig,
    outputs: &mut Vec<PathBuf>,
) -> Result<Summary> {
    let content =
        fxp::read_with(data, &mut TracingDiagnostics).context("Invalid FXP/FXB file")?;

    if config.wrap_fxp {
        let plugin_name = config.plugin_name(content.header().fx_id);
        let preset = VstPreset::wrap_fxp(content.clone(), &plugin_name)?;
        let path = append_extension(target, VSTPRESET_EXTENSION);
        write_output(&path, &preset.to_bytes()?)?;
        outputs.push(path);
    }

    Ok(Summary::Fxp(FxpSummary::new(&content)))
}

/// `Lead.fxp` + `json` -> `Lead.fxp.json`
fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use preset_codec::fxp::{FxpHeader, Program};
    use preset_codec::{FourCC, FxpContent, WrappedFxp};
    use tempfile::tempdir;

    fn program() -> FxpContent {
        FxpContent::Program(Program {
            header: FxpHeader::new(FourCC::new(*b"Syn1"), 1),
            name: "Pad".to_string(),
            parameters: vec![0.1, 0.2, 0.3],
        })
    }

    #[test]
    fn test_input_kind_from_path() {
        let cases = [
            ("a/Lead.vstpreset", Some(InputKind::VstPreset)),
            ("Lead.FXP", Some(InputKind::Fxp)),
            ("Bank.fxb", Some(InputKind::Fxp)),
            ("eq.ffp", Some(InputKind::FabFilter)),
            ("hall.WAV", Some(InputKind::Wave)),
            ("hall.aif", Some(InputKind::Aiff)),
            ("hall.aiff", Some(InputKind::Aiff)),
            ("Live Set.als", None),
            ("README", None),
        ];
        for (path, expected) in cases {
            assert_eq!(InputKind::from_path(Path::new(path)), expected, "{path}");
        }
    }

    #[test]
    fn test_append_extension() {
        assert_eq!(
            append_extension(Path::new("out/Lead.fxp"), "json"),
            PathBuf::from("out/Lead.fxp.json")
        );
    }

    #[test]
    fn test_unknown_extension_is_skipped() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let outcome = convert_file(
            &path,
            dir.path(),
            &dir.path().join("out"),
            &ConvertConfig::default(),
        )
        .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_fxp_is_wrapped_and_summarized() {
        let input = tempdir().expect("Failed to create temp dir");
        let output = tempdir().expect("Failed to create temp dir");
        let path = input.path().join("synth").join("Pad.fxp");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        fxp::write_file(&path, &program()).unwrap();

        let outcome =
            convert_file(&path, input.path(), output.path(), &ConvertConfig::default()).unwrap();
        let wrapped = output.path().join("synth").join("Pad.fxp.vstpreset");
        let summary = output.path().join("synth").join("Pad.fxp.json");
        assert_eq!(
            outcome,
            Outcome::Converted(vec![wrapped.clone(), summary.clone()])
        );

        let preset = VstPreset::read_file(&wrapped).unwrap();
        let inner = WrappedFxp::decode(&preset.component, &mut Vec::new()).unwrap();
        assert_eq!(inner.content, program());

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
        assert_eq!(json["format"], "fxp");
        assert_eq!(json["name"], "Pad");
        assert_eq!(json["parameter_count"], 3);
    }

    #[test]
    fn test_vstpreset_component_is_extracted() {
        let input = tempdir().expect("Failed to create temp dir");
        let output = tempdir().expect("Failed to create temp dir");
        let path = input.path().join("Pad.vstpreset");
        VstPreset::wrap_fxp(program(), "Synth One")
            .unwrap()
            .write_file(&path)
            .unwrap();

        let config = ConvertConfig {
            write_summaries: false,
            ..ConvertConfig::default()
        };
        let outcome = convert_file(&path, input.path(), output.path(), &config).unwrap();
        let extracted = output.path().join("Pad.fxp");
        assert_eq!(outcome, Outcome::Converted(vec![extracted.clone()]));
        assert_eq!(fxp::read_file(&extracted).unwrap(), program());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let input = tempdir().expect("Failed to create temp dir");
        let output = tempdir().expect("Failed to create temp dir");
        let path = input.path().join("eq.ffp");
        std::fs::write(&path, b"FQ9x\0\0\0\0").unwrap();

        let err = convert_file(&path, input.path(), output.path(), &ConvertConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("FabFilter"));
        assert!(!output.path().join("eq.ffp.json").exists());
    }
}
