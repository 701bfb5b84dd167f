use tracing::{debug, warn};

use crate::core::model::{OcrAttemptConfig, OcrCandidate};
use crate::core::scoring::score_text;
use crate::ocr::{OcrEngine, OcrError};
use crate::preprocess::ImageVariant;

/// A (variant, config) pair whose OCR call failed.
#[derive(Debug)]
pub struct AttemptFailure {
    pub variant: &'static str,
    pub config: OcrAttemptConfig,
    pub error: OcrError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Successful attempts in variant-major, config-minor order.
    pub candidates: Vec<OcrCandidate>,
    pub failures: Vec<AttemptFailure>,
}

impl RunReport {
    pub fn attempts(&self) -> usize {
        self.candidates.len() + self.failures.len()
    }
}

pub struct OcrRunner<'a> {
    engine: &'a dyn OcrEngine,
    configs: &'a [OcrAttemptConfig],
}

impl<'a> OcrRunner<'a> {
    pub fn new(engine: &'a dyn OcrEngine, configs: &'a [OcrAttemptConfig]) -> Self {
        Self { engine, configs }
    }

    /// Tries every config on every variant. A failing attempt is recorded and
    /// skipped; it never ends the run.
    pub fn run(&self, variants: &[ImageVariant]) -> RunReport {
        let mut report = RunReport::default();

        for variant in variants {
            debug!(variant = variant.label, "running OCR configs");
            for config in self.configs {
                match self.engine.recognize(&variant.image, config) {
                    Ok(text) => {
                        let score = score_text(&text);
                        debug!(
                            variant = variant.label,
                            config = %config.label(),
                            score,
                            chars = text.trim().chars().count(),
                            "OCR attempt finished"
                        );
                        report.candidates.push(OcrCandidate {
                            variant: variant.label.to_string(),
                            config: config.clone(),
                            text,
                            score,
                        });
                    }
                    Err(error) => {
                        warn!(
                            variant = variant.label,
                            config = %config.label(),
                            %error,
                            "OCR attempt failed, skipping"
                        );
                        report.failures.push(AttemptFailure {
                            variant: variant.label,
                            config: config.clone(),
                            error,
                        });
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use std::cell::RefCell;

    /// Fails for one language and records call order.
    struct Recording {
        calls: RefCell<Vec<String>>,
        failing_language: &'static str,
    }

    impl OcrEngine for Recording {
        fn recognize(
            &self,
            _image: &DynamicImage,
            config: &OcrAttemptConfig,
        ) -> Result<String, OcrError> {
            self.calls.borrow_mut().push(config.label());
            if config.language == self.failing_language {
                return Err(OcrError::Engine(format!("{} pack missing", config.language)));
            }
            Ok(format!("価格 {}", config.psm))
        }
    }

    #[test]
    fn walks_cross_product_and_isolates_failures() {
        let engine = Recording {
            calls: RefCell::new(Vec::new()),
            failing_language: "jpn_vert",
        };
        let configs = vec![
            OcrAttemptConfig::new("jpn", 6),
            OcrAttemptConfig::new("jpn_vert", 5),
            OcrAttemptConfig::new("eng", 6),
        ];
        let variants = vec![
            ImageVariant::new("original", DynamicImage::new_luma8(2, 2)),
            ImageVariant::new("threshold", DynamicImage::new_luma8(2, 2)),
        ];

        let report = OcrRunner::new(&engine, &configs).run(&variants);

        assert_eq!(report.attempts(), 6);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures.iter().all(|f| f.config.language == "jpn_vert"));
        let order: Vec<_> = report
            .candidates
            .iter()
            .map(|c| (c.variant.as_str(), c.config.language.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("original", "jpn"),
                ("original", "eng"),
                ("threshold", "jpn"),
                ("threshold", "eng"),
            ]
        );
        assert_eq!(engine.calls.borrow().len(), 6);
        assert!(report.candidates.iter().all(|c| c.score > 0));
    }
}
