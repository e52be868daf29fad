//! Directory batch: one file per rayon task

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ConvertConfig;
use crate::convert::{Outcome, convert_file};

/// Totals for one run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: usize,
    pub skipped: usize,
    /// Failed inputs with their error chain
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed.len()
    }
}

/// Every regular file under `root`, sorted for a stable processing order
pub fn collect_inputs(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Convert everything under `input` into `output`
///
/// Only a missing input directory or an unusable output directory fail the
/// run; per-file errors are logged and collected in the report.
pub fn run(
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
    jobs: Option<usize>,
) -> Result<BatchReport> {
    if !input.is_dir() {
        bail!("Input directory does not exist: {}", input.display());
    }
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;
    let canonical_input = input.canonicalize()?;
    if output.canonicalize()?.starts_with(&canonical_input) {
        bail!("Output directory must be outside the input directory");
    }

    let files = collect_inputs(input);
    tracing::info!("Found {} files under {}", files.len(), input.display());

    let convert_all = || -> Vec<(PathBuf, Result<Outcome>)> {
        files
            .par_iter()
            .map(|path| {
                let _span = tracing::info_span!("file", path = %path.display()).entered();
                (path.clone(), convert_file(path, input, output, config))
            })
            .collect()
    };

    let results = match jobs {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build thread pool")?
            .install(convert_all),
        None => convert_all(),
    };

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(Outcome::Converted(outputs)) => {
                tracing::info!("Converted {} ({} outputs)", path.display(), outputs.len());
                report.converted += 1;
            }
            Ok(Outcome::Skipped) => report.skipped += 1,
            Err(err) => {
                tracing::error!("Failed to convert {}: {:#}", path.display(), err);
                report.failed.push((path, format!("{err:#}")));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use preset_codec::fxp::{self, BANK_RESERVED_SIZE};
    use preset_codec::{
        Dialect, FloatBlock, FourCC, FxpContent, FxpHeader, Program, VstPreset, WrappedFxp,
    };
    use tempfile::tempdir;

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = run(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &ConvertConfig::default(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(run(dir.path(), dir.path(), &ConvertConfig::default(), None).is_err());
    }

    #[test]
    fn test_output_inside_input_is_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let nested = dir.path().join("out");
        assert!(run(dir.path(), &nested, &ConvertConfig::default(), None).is_err());
        assert!(collect_inputs(dir.path()).is_empty());
    }

    #[test]
    fn test_program_and_bank_with_same_stem() {
        let input = tempdir().expect("Failed to create temp dir");
        let output = tempdir().expect("Failed to create temp dir");
        let program = Program {
            header: FxpHeader::new(FourCC::new(*b"Syn1"), 1),
            name: "Lead".to_string(),
            parameters: vec![0.25, 0.75],
        };
        fxp::write_file(
            &input.path().join("Lead.fxp"),
            &FxpContent::Program(program.clone()),
        )
        .unwrap();
        fxp::write_file(
            &input.path().join("Lead.fxb"),
            &FxpContent::Bank {
                header: FxpHeader::new(FourCC::new(*b"Syn1"), 1),
                reserved: [0; BANK_RESERVED_SIZE],
                programs: vec![program.clone(), program],
            },
        )
        .unwrap();

        let report = run(input.path(), output.path(), &ConvertConfig::default(), Some(2)).unwrap();
        assert_eq!(report.converted, 2);
        assert!(report.failed.is_empty());

        for (name, magic) in [
            ("Lead.fxp.vstpreset", *b"FxCk"),
            ("Lead.fxb.vstpreset", *b"FxBk"),
        ] {
            let preset = VstPreset::read_file(&output.path().join(name)).unwrap();
            let wrapped = WrappedFxp::decode(&preset.component, &mut Vec::new()).unwrap();
            assert_eq!(wrapped.content.magic(), FourCC::new(magic));
        }
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let input = tempdir().expect("Failed to create temp dir");
        let output = tempdir().expect("Failed to create temp dir");
        let nested = input.path().join("eq");
        std::fs::create_dir_all(&nested).unwrap();

        FloatBlock::new(Dialect::ProQ2, 2, vec![0.5; 8])
            .write_file(&nested.join("Good.ffp"))
            .unwrap();
        std::fs::write(nested.join("Bad.ffp"), b"nope").unwrap();
        std::fs::write(input.path().join("readme.md"), b"# presets").unwrap();

        let report = run(input.path(), output.path(), &ConvertConfig::default(), Some(2)).unwrap();
        assert_eq!(report.converted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].0.ends_with("eq/Bad.ffp"));
        assert_eq!(report.total(), 3);
        assert!(output.path().join("eq").join("Good.ffp.json").exists());
    }

    #[test]
    fn test_collect_inputs_is_sorted_and_recursive() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b").join("x.fxp"), b"").unwrap();
        std::fs::write(dir.path().join("a.wav"), b"").unwrap();

        let files = collect_inputs(dir.path());
        assert_eq!(
            files,
            vec![dir.path().join("a.wav"), dir.path().join("b").join("x.fxp")]
        );
    }
}
