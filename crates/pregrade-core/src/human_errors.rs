// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for collectors using the grader.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity follows the pipeline's error classes: input problems the user can
// fix, degraded results worth a second look, and failures that end the run.

use crate::error::PregradeError;
use crate::types::ErrorClass;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must supply a different photo or setting.
    ActionRequired,
    /// The report was still produced but part of it is a neutral placeholder.
    Partial,
    /// Nothing could be graded.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `PregradeError` into a `HumanError`.
pub fn humanize_error(err: &PregradeError) -> HumanError {
    match err {
        // -- Input errors --
        PregradeError::MissingImage => HumanError {
            message: "No card photo was provided.".into(),
            suggestion: "Take a photo of the front of the card and try again.".into(),
            severity: Severity::ActionRequired,
        },

        PregradeError::UnsupportedFormat(detail) => HumanError {
            message: "This type of image isn't supported.".into(),
            suggestion: format!("Save the photo as JPEG, PNG, or WebP and try again. (File type: {detail})"),
            severity: Severity::ActionRequired,
        },

        PregradeError::TooLarge { size, limit } => HumanError {
            message: "The photo is too large.".into(),
            suggestion: format!(
                "Photos must be under {} MB; this one is {:.1} MB. Try a lower resolution setting.",
                limit / (1024 * 1024),
                *size as f64 / (1024.0 * 1024.0)
            ),
            severity: Severity::ActionRequired,
        },

        PregradeError::InvalidImage(detail) => HumanError {
            message: "That photo can't be graded.".into(),
            suggestion: format!("Retake the photo with the whole card in frame. ({detail})"),
            severity: Severity::ActionRequired,
        },

        // -- Fatal --
        PregradeError::Decode(_) => HumanError {
            message: "The photo file appears to be damaged.".into(),
            suggestion: "Try exporting the photo again from your camera or gallery app.".into(),
            severity: Severity::Permanent,
        },

        // -- Degraded stages --
        PregradeError::Ocr(_) => HumanError {
            message: "We couldn't read the text on the card.".into(),
            suggestion: "The grade is still valid, but the value estimate ignores the card name. Better lighting usually helps.".into(),
            severity: Severity::Partial,
        },

        PregradeError::OutOfBounds { .. } | PregradeError::EmptyRegion { .. } => HumanError {
            message: "Part of the card couldn't be measured.".into(),
            suggestion: format!("That part of the report shows a neutral placeholder. A larger, sharper photo may help. ({err})"),
            severity: Severity::Partial,
        },

        PregradeError::Encode(_) => HumanError {
            message: "We couldn't draw the highlight images.".into(),
            suggestion: "The scores are unaffected. Try again without highlight rendering.".into(),
            severity: Severity::Partial,
        },

        // -- Storage / persistence --
        PregradeError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The photo file couldn't be found.".into(),
                suggestion: "Check the file name and folder, then try again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We don't have permission to open that file.".into(),
                suggestion: "Copy the photo somewhere you own, such as your home folder, and try again.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "A file couldn't be read or written.".into(),
                suggestion: format!("Check there is free disk space and try again. ({io_err})"),
                severity: Severity::Permanent,
            },
        },

        PregradeError::Serialization(_) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestion: "Fix the JSON in your config file, or delete it to use the defaults.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// Map an error class onto the user-facing severity.
pub fn severity_for(class: ErrorClass) -> Severity {
    match class {
        ErrorClass::Input => Severity::ActionRequired,
        ErrorClass::Degraded => Severity::Partial,
        ErrorClass::Fatal => Severity::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversize_upload_is_action_required() {
        let err = PregradeError::TooLarge {
            size: 12 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("10 MB"));
    }

    #[test]
    fn corrupt_file_is_permanent() {
        let human = humanize_error(&PregradeError::Decode("bad huffman code".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn ocr_failure_is_partial() {
        let human = humanize_error(&PregradeError::Ocr("model missing".into()));
        assert_eq!(human.severity, Severity::Partial);
    }

    #[test]
    fn humanized_severity_agrees_with_error_class() {
        let errors = [
            PregradeError::MissingImage,
            PregradeError::UnsupportedFormat("image/gif".into()),
            PregradeError::Decode("eof".into()),
            PregradeError::EmptyRegion { stage: "corners" },
            PregradeError::Encode("png".into()),
        ];
        for err in &errors {
            assert_eq!(humanize_error(err).severity, severity_for(err.class()), "{err}");
        }
    }
}
