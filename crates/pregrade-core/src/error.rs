// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pregrade.

use thiserror::Error;

use crate::types::ErrorClass;

/// Top-level error type for all Pregrade operations.
#[derive(Debug, Error)]
pub enum PregradeError {
    // -- Input errors (rejected before analysis) --
    #[error("no front image was supplied")]
    MissingImage,

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("image is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("invalid image: {0}")]
    InvalidImage(String),

    // -- Fatal --
    #[error("image decode failed: {0}")]
    Decode(String),

    // -- Analysis errors (a stage degrades, the run continues) --
    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("{stage}: region sampled no pixels")]
    EmptyRegion { stage: &'static str },

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PregradeError {
    /// How the pipeline treats this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingImage
            | Self::UnsupportedFormat(_)
            | Self::TooLarge { .. }
            | Self::InvalidImage(_) => ErrorClass::Input,

            Self::Decode(_) => ErrorClass::Fatal,

            Self::OutOfBounds { .. }
            | Self::EmptyRegion { .. }
            | Self::Ocr(_)
            | Self::Encode(_) => ErrorClass::Degraded,

            // A missing file is the caller's to fix; anything else is fatal.
            Self::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    ErrorClass::Input
                }
                _ => ErrorClass::Fatal,
            },
            Self::Serialization(_) => ErrorClass::Fatal,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PregradeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_classify_as_input() {
        assert_eq!(PregradeError::MissingImage.class(), ErrorClass::Input);
        let err = PregradeError::TooLarge {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.class(), ErrorClass::Input);
    }

    #[test]
    fn decode_is_fatal() {
        assert_eq!(
            PregradeError::Decode("truncated".into()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn stage_failures_degrade() {
        let err = PregradeError::EmptyRegion { stage: "surface" };
        assert_eq!(err.class(), ErrorClass::Degraded);
        assert_eq!(err.to_string(), "surface: region sampled no pixels");
    }

    #[test]
    fn ocr_and_encode_failures_degrade() {
        assert_eq!(PregradeError::Ocr("no models".into()).class(), ErrorClass::Degraded);
        assert_eq!(PregradeError::Encode("png".into()).class(), ErrorClass::Degraded);
    }

    #[test]
    fn missing_file_is_input() {
        let err = PregradeError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.class(), ErrorClass::Input);
    }
}
