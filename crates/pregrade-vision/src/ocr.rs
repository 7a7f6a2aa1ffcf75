// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction from the card face.
//
// The grader only needs the card's printed text to look up rarity keywords and
// to feed the confidence estimate. Extraction sits behind [`TextExtractor`] so
// the analyzer runs without any models installed; the `ocr` feature adds an
// extractor backed by the `ocrs` engine.
//
// # Model Setup
//
// The `ocrs` extractor needs `text-detection.rten` and `text-recognition.rten`.
// Running `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs` (typically
// `~/.cache/ocrs`), which is where [`OcrConfig::default`] looks.

use pregrade_core::error::PregradeError;
use pregrade_core::ExtractedText;

use crate::raster::RasterImage;

/// Something that can read the printed text off a card photo.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, image: &RasterImage) -> Result<ExtractedText, PregradeError>;
}

/// Extractor used when no OCR engine is configured. Always returns empty,
/// zero-confidence text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTextExtractor;

impl TextExtractor for NoTextExtractor {
    fn extract(&self, _image: &RasterImage) -> Result<ExtractedText, PregradeError> {
        Ok(ExtractedText::empty())
    }
}

/// Returns the same text for every image. Useful when the card's name is
/// already known.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixedTextExtractor(pub ExtractedText);

impl FixedTextExtractor {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        let text = text.into();
        let words = text.split_whitespace().map(str::to_string).collect();
        Self(ExtractedText {
            text,
            confidence,
            words,
        })
    }
}

impl TextExtractor for FixedTextExtractor {
    fn extract(&self, _image: &RasterImage) -> Result<ExtractedText, PregradeError> {
        Ok(self.0.clone())
    }
}

/// Package raw recognised text. The engine reports no per-character scores,
/// so confidence is the share of characters that are alphanumeric or
/// whitespace, on a 0–100 scale.
pub fn summarize_text(text: String) -> ExtractedText {
    let total = text.chars().count();
    let confidence = if total == 0 {
        0.0
    } else {
        let clean = text
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .count();
        clean as f64 / total as f64 * 100.0
    };
    let words = text.split_whitespace().map(str::to_string).collect();
    ExtractedText {
        text,
        confidence,
        words,
    }
}

#[cfg(feature = "ocr")]
pub use engine::{OcrConfig, OcrsExtractor};

#[cfg(feature = "ocr")]
mod engine {
    use std::path::{Path, PathBuf};

    use image::DynamicImage;
    use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
    use pregrade_core::error::PregradeError;
    use pregrade_core::ExtractedText;
    use rten::Model;
    use tracing::{debug, info, instrument};

    use super::{summarize_text, TextExtractor};
    use crate::raster::RasterImage;

    const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
    const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

    fn default_model_dir() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            PathBuf::from(xdg).join("ocrs")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".cache").join("ocrs")
        } else {
            PathBuf::from("ocrs-models")
        }
    }

    /// Where to find the two `.rten` model files.
    #[derive(Debug, Clone)]
    pub struct OcrConfig {
        pub detection_model_path: PathBuf,
        pub recognition_model_path: PathBuf,
    }

    impl Default for OcrConfig {
        fn default() -> Self {
            Self::from_dir(default_model_dir())
        }
    }

    impl OcrConfig {
        /// Expects `text-detection.rten` and `text-recognition.rten` in `dir`.
        pub fn from_dir(dir: impl AsRef<Path>) -> Self {
            let dir = dir.as_ref();
            Self {
                detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
                recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
            }
        }

        pub fn validate(&self) -> Result<(), PregradeError> {
            for (label, path) in [
                ("detection", &self.detection_model_path),
                ("recognition", &self.recognition_model_path),
            ] {
                if !path.exists() {
                    return Err(PregradeError::Ocr(format!(
                        "{label} model not found at {}; run `ocrs-cli` once to download models",
                        path.display()
                    )));
                }
            }
            Ok(())
        }
    }

    /// [`TextExtractor`] on the `ocrs` engine. Loading the models is the
    /// expensive step, so build one and reuse it for every card.
    ///
    /// `ocrs` and `rten` are very slow in debug builds.
    pub struct OcrsExtractor {
        engine: OcrEngine,
    }

    impl OcrsExtractor {
        #[instrument(skip_all, fields(
            detection = %config.detection_model_path.display(),
            recognition = %config.recognition_model_path.display(),
        ))]
        pub fn new(config: &OcrConfig) -> Result<Self, PregradeError> {
            config.validate()?;

            let load = |path: &Path| {
                Model::load_file(path).map_err(|err| {
                    PregradeError::Ocr(format!("failed to load model from {}: {err}", path.display()))
                })
            };
            info!("loading OCR models");
            let detection_model = load(&config.detection_model_path)?;
            let recognition_model = load(&config.recognition_model_path)?;

            let engine = OcrEngine::new(OcrEngineParams {
                detection_model: Some(detection_model),
                recognition_model: Some(recognition_model),
                ..Default::default()
            })
            .map_err(|err| PregradeError::Ocr(format!("failed to initialise OCR engine: {err}")))?;

            info!("OCR engine ready");
            Ok(Self { engine })
        }

        pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self, PregradeError> {
            Self::new(&OcrConfig::from_dir(dir))
        }
    }

    impl TextExtractor for OcrsExtractor {
        #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
        fn extract(&self, image: &RasterImage) -> Result<ExtractedText, PregradeError> {
            let rgb = DynamicImage::ImageRgba8(image.as_rgba().clone()).to_rgb8();
            let (width, height) = rgb.dimensions();

            let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
                PregradeError::Ocr(format!("failed to create image source ({width}x{height}): {err}"))
            })?;
            let input = self
                .engine
                .prepare_input(source)
                .map_err(|err| PregradeError::Ocr(format!("OCR preprocessing failed: {err}")))?;
            let text = self
                .engine
                .get_text(&input)
                .map_err(|err| PregradeError::Ocr(format!("OCR text recognition failed: {err}")))?;

            let extracted = summarize_text(text);
            debug!(
                words = extracted.words.len(),
                confidence = extracted.confidence,
                "OCR complete"
            );
            Ok(extracted)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn blank() -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]))).unwrap()
    }

    #[test]
    fn no_extractor_reads_nothing() {
        let text = NoTextExtractor.extract(&blank()).unwrap();
        assert_eq!(text, ExtractedText::empty());
        assert_eq!(text.confidence, 0.0);
    }

    #[test]
    fn fixed_text_splits_words() {
        let text = FixedTextExtractor::new("Charizard  HP 120", 90.0)
            .extract(&blank())
            .unwrap();
        assert_eq!(text.words, vec!["Charizard", "HP", "120"]);
        assert_eq!(text.confidence, 90.0);
    }

    #[test]
    fn summary_confidence_is_clean_character_share() {
        let text = summarize_text("ab#!".to_string());
        assert_eq!(text.confidence, 50.0);
        assert_eq!(text.words, vec!["ab#!"]);
        assert_eq!(summarize_text(String::new()).confidence, 0.0);
    }
}
