//! Image variants fed to OCR.
//!
//! Every step works from the decoded screenshot independently, so one step
//! failing only removes that variant. `original` is always first.

use std::panic::{catch_unwind, AssertUnwindSafe};

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::close;
use thiserror::Error;
use tracing::debug;

/// Integral images are accumulated in `u32`; past this many pixels a white
/// page overflows them.
const ADAPTIVE_PIXEL_LIMIT: u64 = (u32::MAX / 255) as u64;

#[derive(Debug, Clone)]
pub struct ImageVariant {
    pub label: &'static str,
    pub image: DynamicImage,
}

impl ImageVariant {
    pub fn new(label: &'static str, image: DynamicImage) -> Self {
        Self { label, image }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("image has no pixels")]
    Empty,
    #[error("image {width}x{height} is smaller than the {window}px filter window")]
    TooSmall { width: u32, height: u32, window: u32 },
    #[error("image has {pixels} pixels, limit is {limit}")]
    TooLarge { pixels: u64, limit: u64 },
    #[error("{0} panicked")]
    Panicked(&'static str),
}

/// Result of one preprocessing step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub label: &'static str,
    pub result: Result<ImageVariant, PreprocessError>,
}

impl StepOutcome {
    fn from_gray(label: &'static str, result: Result<GrayImage, PreprocessError>) -> Self {
        Self {
            label,
            result: result.map(|gray| ImageVariant::new(label, DynamicImage::ImageLuma8(gray))),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessOptions {
    pub contrast_gain: f32,
    pub median_radius: u32,
    /// 5 gives an 11x11 neighbourhood.
    pub adaptive_block_radius: u32,
    pub close_radius: u8,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            contrast_gain: 2.0,
            median_radius: 1,
            adaptive_block_radius: 5,
            close_radius: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preprocessor {
    options: PreprocessOptions,
    enhance: bool,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessOptions::default())
    }
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self {
            options,
            enhance: true,
        }
    }

    /// Passes the image through untouched.
    pub fn original_only() -> Self {
        Self {
            options: PreprocessOptions::default(),
            enhance: false,
        }
    }

    /// Runs every step and reports each outcome, skipped ones included.
    pub fn run(&self, image: &DynamicImage) -> Vec<StepOutcome> {
        let mut outcomes = vec![StepOutcome {
            label: "original",
            result: Ok(ImageVariant::new("original", image.clone())),
        }];
        if !self.enhance {
            return outcomes;
        }

        let gray = image.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            for label in ["contrast", "threshold", "denoised", "adaptive", "morphological"] {
                outcomes.push(StepOutcome::from_gray(label, Err(PreprocessError::Empty)));
            }
            return outcomes;
        }

        let binary = otsu_binarize(&gray);
        outcomes.push(StepOutcome::from_gray(
            "contrast",
            Ok(stretch_contrast(&gray, self.options.contrast_gain)),
        ));
        outcomes.push(StepOutcome::from_gray("threshold", Ok(binary.clone())));
        outcomes.push(StepOutcome::from_gray(
            "denoised",
            denoise(&gray, self.options.median_radius),
        ));
        outcomes.push(StepOutcome::from_gray(
            "adaptive",
            adaptive(&gray, self.options.adaptive_block_radius),
        ));
        outcomes.push(StepOutcome::from_gray(
            "morphological",
            Ok(close(&binary, Norm::LInf, self.options.close_radius)),
        ));

        for outcome in &outcomes {
            if let Err(err) = &outcome.result {
                debug!(step = outcome.label, %err, "preprocessing step skipped");
            }
        }
        outcomes
    }

    /// The variants that could be produced, in step order.
    pub fn variants(&self, image: &DynamicImage) -> Vec<ImageVariant> {
        self.run(image)
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .collect()
    }
}

fn stretch_contrast(gray: &GrayImage, gain: f32) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = (pixel.0[0] as f32 * gain).round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn otsu_binarize(gray: &GrayImage) -> GrayImage {
    threshold(gray, otsu_level(gray), ThresholdType::Binary)
}

fn denoise(gray: &GrayImage, radius: u32) -> Result<GrayImage, PreprocessError> {
    let window = radius * 2 + 1;
    if gray.width() < window || gray.height() < window {
        return Err(PreprocessError::TooSmall {
            width: gray.width(),
            height: gray.height(),
            window,
        });
    }
    Ok(median_filter(gray, radius, radius))
}

fn adaptive(gray: &GrayImage, block_radius: u32) -> Result<GrayImage, PreprocessError> {
    let pixels = gray.width() as u64 * gray.height() as u64;
    if pixels > ADAPTIVE_PIXEL_LIMIT {
        return Err(PreprocessError::TooLarge {
            pixels,
            limit: ADAPTIVE_PIXEL_LIMIT,
        });
    }
    catch_unwind(AssertUnwindSafe(|| adaptive_threshold(gray, block_radius)))
        .map_err(|_| PreprocessError::Panicked("adaptive threshold"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn striped(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x % 4 < 2 {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 230, 230])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn produces_all_variants_in_order() {
        let variants = Preprocessor::default().variants(&striped(32, 32));
        let labels: Vec<_> = variants.iter().map(|v| v.label).collect();
        assert_eq!(
            labels,
            vec!["original", "contrast", "threshold", "denoised", "adaptive", "morphological"]
        );
    }

    #[test]
    fn tiny_image_skips_denoise_only() {
        let outcomes = Preprocessor::default().run(&striped(2, 2));
        let denoised = outcomes.iter().find(|o| o.label == "denoised").unwrap();
        assert!(matches!(
            denoised.result,
            Err(PreprocessError::TooSmall { window: 3, .. })
        ));
        let variants = Preprocessor::default().variants(&striped(2, 2));
        assert_eq!(variants[0].label, "original");
        assert!(variants.iter().all(|v| v.label != "denoised"));
        assert_eq!(variants.len(), 5);
    }

    #[test]
    fn empty_image_keeps_original() {
        let outcomes = Preprocessor::default().run(&DynamicImage::new_rgb8(0, 0));
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1..]
            .iter()
            .all(|o| o.result.as_ref().err() == Some(&PreprocessError::Empty)));
    }

    #[test]
    fn original_only_is_untouched() {
        let image = striped(8, 8);
        let variants = Preprocessor::original_only().variants(&image);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].image.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn contrast_saturates() {
        let gray = GrayImage::from_pixel(2, 1, Luma([200]));
        let out = stretch_contrast(&gray, 2.0);
        assert_eq!(out.get_pixel(0, 0).0[0], 255);
        let gray = GrayImage::from_pixel(1, 1, Luma([60]));
        assert_eq!(stretch_contrast(&gray, 2.0).get_pixel(0, 0).0[0], 120);
    }

    #[test]
    fn threshold_is_binary() {
        let gray = striped(16, 4).to_luma8();
        let out = otsu_binarize(&gray);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // dark stripes fall below the Otsu level, light ones above it
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(2, 0).0[0], 255);
    }
}
