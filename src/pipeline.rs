use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, ImageReader};
use thiserror::Error;
use tracing::{info, warn};

use crate::assemble::assemble_record;
use crate::core::model::{FieldRecord, OcrAttemptConfig, OcrCandidate, PropertyRecord};
use crate::export::SqlExporter;
use crate::extract::{FieldExtractor, PatternTable};
use crate::ocr::{select_best, OcrEngine, OcrRunner, RunReport, TesseractCli};
use crate::preprocess::Preprocessor;

pub const NO_TEXT_SENTINEL: &str = "-- No text extracted from image";
pub const NO_DATA_SENTINEL: &str = "-- No structured data parsed";

/// Which preprocessing steps, OCR configs and pattern table to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Raw image only, `jpn`/`eng` at psm 6, the short pattern table.
    Simple,
    #[default]
    Improved,
}

impl Profile {
    pub fn preprocessor(self) -> Preprocessor {
        match self {
            Profile::Simple => Preprocessor::original_only(),
            Profile::Improved => Preprocessor::default(),
        }
    }

    pub fn ocr_configs(self) -> Vec<OcrAttemptConfig> {
        match self {
            Profile::Simple => OcrAttemptConfig::simple_set(),
            Profile::Improved => OcrAttemptConfig::improved_set(),
        }
    }

    pub fn pattern_table(self) -> PatternTable {
        match self {
            Profile::Simple => PatternTable::simple(),
            Profile::Improved => PatternTable::improved(),
        }
    }
}

/// How the tesseract subprocess is launched.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    pub binary: PathBuf,
    pub tessdata: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl OcrOptions {
    pub fn engine(&self) -> TesseractCli {
        TesseractCli::new()
            .with_binary(self.binary.clone())
            .with_tessdata(self.tessdata.clone())
            .with_timeout(self.timeout)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub profile: Profile,
    pub ocr: OcrOptions,
    pub table: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            ocr: OcrOptions::default(),
            table: "properties".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.ocr.binary = binary;
        self
    }

    pub fn with_tessdata(mut self, tessdata: Option<PathBuf>) -> Self {
        self.ocr.tessdata = tessdata;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.ocr.timeout = timeout;
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn sql_exporter(&self) -> SqlExporter {
        SqlExporter::new(self.table.clone())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read image {}: {reason}", path.display())]
    Input { path: PathBuf, reason: String },
}

/// Final outcome of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Record {
        fields: FieldRecord,
        record: Box<PropertyRecord>,
    },
    /// Every OCR attempt failed or produced only whitespace.
    NoTextExtracted,
    /// Text was recognized but no field could be extracted from it.
    NoStructuredData,
}

impl Extraction {
    pub fn record(&self) -> Option<&PropertyRecord> {
        match self {
            Extraction::Record { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Extraction::Record { .. } => None,
            Extraction::NoTextExtracted => Some(NO_TEXT_SENTINEL),
            Extraction::NoStructuredData => Some(NO_DATA_SENTINEL),
        }
    }
}

#[derive(Debug)]
pub struct PipelineRun {
    pub report: RunReport,
    pub selected: Option<OcrCandidate>,
    pub extraction: Extraction,
}

pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    let input_error = |reason: String| PipelineError::Input {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(input_error("file does not exist".to_string()));
    }
    ImageReader::open(path)
        .map_err(|err| input_error(err.to_string()))?
        .with_guessed_format()
        .map_err(|err| input_error(err.to_string()))?
        .decode()
        .map_err(|err| input_error(err.to_string()))
}

/// Preprocesses `image`, runs every OCR attempt, keeps the best text and
/// extracts a record from it.
pub fn run_image(image: &DynamicImage, profile: Profile, engine: &dyn OcrEngine) -> PipelineRun {
    let variants = profile.preprocessor().variants(image);
    info!(variants = variants.len(), "preprocessing done");

    let configs = profile.ocr_configs();
    let report = OcrRunner::new(engine, &configs).run(&variants);
    info!(
        attempts = report.attempts(),
        succeeded = report.candidates.len(),
        failed = report.failures.len(),
        "OCR attempts done"
    );

    let selected = select_best(&report.candidates).cloned();
    let extraction = match &selected {
        Some(best) => {
            info!(
                variant = %best.variant,
                config = %best.config.label(),
                score = best.score,
                "selected OCR result"
            );
            run_text(&best.text, profile)
        }
        None => {
            warn!("no OCR attempt produced usable text");
            Extraction::NoTextExtracted
        }
    };

    PipelineRun {
        report,
        selected,
        extraction,
    }
}

/// Extraction and normalization over already-recognized text.
pub fn run_text(text: &str, profile: Profile) -> Extraction {
    if text.trim().is_empty() {
        return Extraction::NoTextExtracted;
    }

    let fields = FieldExtractor::new(profile.pattern_table()).extract(text);
    if fields.is_empty() {
        info!("no listing fields found in text");
        return Extraction::NoStructuredData;
    }
    info!(fields = fields.len(), "fields extracted");

    let record = assemble_record(&fields);
    Extraction::Record {
        fields,
        record: Box::new(record),
    }
}
