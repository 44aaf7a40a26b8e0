//! OCR a PDF file and emit per-page JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use pdf_ocr_core::models::config::{PdfOcrConfig, MAX_PSM};
use pdf_ocr_core::pdf::PageSource;
use pdf_ocr_core::{to_json, OcrPipeline, PdfOcrError, PdfiumRenderer, Stage};

/// Arguments for processing a PDF.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Path to the PDF file to process
    #[arg(required = true)]
    pdf_file: PathBuf,

    /// Path to the output JSON file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language for Tesseract OCR, e.g. jpn, eng [default: jpn]
    #[arg(short, long)]
    lang: Option<String>,

    /// Resolution (DPI) for page rendering [default: 300]
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    dpi: Option<u32>,

    /// Tesseract page segmentation mode [default: 6]
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=MAX_PSM as i64))]
    psm: Option<u8>,

    /// Skip binarization and line removal
    #[arg(long)]
    no_preprocess: bool,

    /// Tesseract executable to run
    #[arg(long, value_name = "CMD")]
    tesseract: Option<PathBuf>,

    /// Directory containing the PDFium shared library
    #[arg(long, value_name = "DIR")]
    pdfium_lib: Option<PathBuf>,

    /// Write single-line JSON instead of indented output
    #[arg(long)]
    compact: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl ProcessArgs {
    /// Override configuration values with the ones given on the command line.
    fn apply(&self, mut config: PdfOcrConfig) -> PdfOcrConfig {
        if let Some(lang) = &self.lang {
            config.ocr.language = lang.clone();
        }
        if let Some(dpi) = self.dpi {
            config.render.dpi = dpi;
        }
        if let Some(psm) = self.psm {
            config.ocr.psm = psm;
        }
        if let Some(cmd) = &self.tesseract {
            config.ocr.tesseract_cmd = cmd.clone();
        }
        if let Some(dir) = &self.pdfium_lib {
            config.render.pdfium_library_dir = Some(dir.clone());
        }
        if self.no_preprocess {
            config.preprocess.enabled = false;
        }
        config
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Check input file before loading any library
    if !args.pdf_file.is_file() {
        anyhow::bail!(
            "Input file not found or is not a file: {}",
            args.pdf_file.display()
        );
    }

    let config = args.apply(load_config(config_path)?);
    config.validate()?;

    info!("Processing file: {}", args.pdf_file.display());

    let pipeline = OcrPipeline::from_config(config.clone())?;
    match pipeline.backend().version() {
        Ok(version) => debug!("Using {}", version),
        Err(e) if e.is_engine_missing() => return Err(anyhow!("{}", e)),
        Err(e) => warn!("Could not query tesseract version: {}", e),
    }

    let renderer = PdfiumRenderer::new(config.render.pdfium_library_dir.as_deref())?;
    let document = renderer
        .open(&args.pdf_file)
        .map_err(|e| anyhow!("Could not open PDF file. Reason: {}", e))?;

    let page_count = document.page_count();
    debug!(
        "PDF has {} pages, rendering at {} DPI, preprocessing {}",
        page_count,
        pipeline.dpi(),
        if pipeline.preprocesses() { "on" } else { "off" }
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(page_count as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("OCR...");

    let result = pipeline.run(&document, |page, total| {
        pb.set_message(format!(
            "page {}/{}: {} words",
            page.page_number,
            total,
            page.word_count()
        ));
        pb.inc(1);
    });
    pb.finish_and_clear();

    let pages = result.map_err(describe_failure)?;

    let output = to_json(&pages, !args.compact)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output).map_err(|e| {
            anyhow!(
                "Could not write to output file {}. Reason: {}",
                output_path.display(),
                e
            )
        })?;
        if !args.quiet {
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                output_path.display()
            );
        }
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pdf-ocr").join("config.json"))
}

/// Load `--config` if given, else the per-user config file if present.
fn load_config(config_path: Option<&Path>) -> anyhow::Result<PdfOcrConfig> {
    if let Some(path) = config_path {
        return PdfOcrConfig::from_file(path)
            .with_context(|| format!("Could not read config file {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Using config file {}", path.display());
            PdfOcrConfig::from_file(&path)
                .with_context(|| format!("Could not read config file {}", path.display()))
        }
        _ => Ok(PdfOcrConfig::default()),
    }
}

/// Turn a pipeline failure into the message shown to the user.
fn describe_failure(err: PdfOcrError) -> anyhow::Error {
    if err.is_engine_missing() {
        if let PdfOcrError::Ocr(inner) = err.root() {
            return anyhow!("{}", inner);
        }
    }

    if let PdfOcrError::Page {
        page,
        stage,
        source,
    } = &err
    {
        return match stage {
            Stage::Rendering => anyhow!("Could not render page {}. Reason: {}", page, source),
            _ => anyhow!(
                "An unexpected error occurred during {} on page {}: {}",
                stage,
                page,
                source
            ),
        };
    }

    err.into()
}
