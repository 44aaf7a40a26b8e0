//! OCR backend wrapping the `tesseract` CLI tool.

use std::fs::read_to_string;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::DynamicImage;
use tracing::{debug, instrument};

use super::data::{parse_tsv, DataRow};
use super::{OcrBackend, OcrParams};
use crate::error::OcrError;

/// Runs the `tesseract` executable on images written to a temporary directory.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
}

/// Output mode of a single engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Text,
    Tsv,
}

impl OutputMode {
    fn extension(self) -> &'static str {
        match self {
            OutputMode::Text => "txt",
            OutputMode::Tsv => "tsv",
        }
    }
}

impl TesseractEngine {
    /// Create an engine calling `command` (a name on `PATH` or a path).
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The executable this engine calls.
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Return the first line of `tesseract --version`.
    ///
    /// Fails with [`OcrError::EngineNotFound`] when the executable is missing.
    pub fn version(&self) -> Result<String, OcrError> {
        let output = self.spawn(Command::new(&self.command).arg("--version"))?;
        self.check_status(&output)?;

        // Older releases print the version banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    /// Arguments for one engine call, following the input and output base.
    fn build_args(params: &OcrParams, mode: OutputMode) -> Vec<String> {
        let mut args = vec![
            "-l".to_string(),
            params.language.clone(),
            "--psm".to_string(),
            params.psm.to_string(),
        ];
        args.extend(params.extra_args.iter().cloned());
        // Config file names go last
        if mode == OutputMode::Tsv {
            args.push("tsv".to_string());
        }
        args
    }

    #[instrument(level = "debug", skip_all, fields(mode = ?mode))]
    fn run(
        &self,
        image: &DynamicImage,
        params: &OcrParams,
        mode: OutputMode,
    ) -> Result<String, OcrError> {
        let tmpdir = tempfile::TempDir::with_prefix("pdf-ocr")?;
        let input_path = tmpdir.path().join("input.png");
        let output_base = tmpdir.path().join("output");

        image
            .save_with_format(&input_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::Input(e.to_string()))?;

        let output = self.spawn(
            Command::new(&self.command)
                .arg(&input_path)
                .arg(&output_base)
                .args(Self::build_args(params, mode)),
        )?;
        self.check_status(&output)?;

        let output_path = output_base.with_extension(mode.extension());
        let content = read_to_string(&output_path).map_err(|e| {
            OcrError::Output(format!("cannot read {}: {}", output_path.display(), e))
        })?;

        debug!("tesseract produced {} bytes", content.len());
        Ok(content)
    }

    fn spawn(&self, command: &mut Command) -> Result<Output, OcrError> {
        command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => OcrError::EngineNotFound(self.command.clone()),
            _ => OcrError::Io(e),
        })
    }

    fn check_status(&self, output: &Output) -> Result<(), OcrError> {
        if output.status.success() {
            return Ok(());
        }
        Err(OcrError::EngineFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrBackend for TesseractEngine {
    fn image_to_string(&self, image: &DynamicImage, params: &OcrParams) -> Result<String, OcrError> {
        self.run(image, params, OutputMode::Text)
    }

    fn image_to_data(
        &self,
        image: &DynamicImage,
        params: &OcrParams,
    ) -> Result<Vec<DataRow>, OcrError> {
        let tsv = self.run(image, params, OutputMode::Tsv)?;
        parse_tsv(&tsv)
    }
}
