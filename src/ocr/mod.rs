pub mod runner;
pub mod select;
pub mod tesseract;

use std::io;

use image::DynamicImage;
use thiserror::Error;

use crate::core::model::OcrAttemptConfig;

pub use runner::{AttemptFailure, OcrRunner, RunReport};
pub use select::select_best;
pub use tesseract::TesseractCli;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to launch {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("OCR attempt exceeded {secs}s and was killed")]
    Timeout { secs: u64 },
    #[error("failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("OCR scratch file error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Engine(String),
}

/// Turns one image into text under one configuration.
pub trait OcrEngine {
    fn recognize(
        &self,
        image: &DynamicImage,
        config: &OcrAttemptConfig,
    ) -> Result<String, OcrError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(
        &self,
        image: &DynamicImage,
        config: &OcrAttemptConfig,
    ) -> Result<String, OcrError> {
        (**self).recognize(image, config)
    }
}
