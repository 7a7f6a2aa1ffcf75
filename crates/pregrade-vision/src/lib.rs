// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pregrade-vision: pixel-level card analysis for Pregrade.
//
// Provides the raster wrapper and brightness sampling, the four graded
// criteria (centering, corners, edges, surface), the eight defect detectors,
// quality and texture metrics, card segmentation, enhancement previews, and
// text extraction.

pub mod analysis;
pub mod border;
pub mod condition;
pub mod defects;
pub mod enhance;
pub mod ocr;
pub mod plane;
pub mod quality;
pub mod raster;
pub mod scan;
pub mod segmentation;
pub mod wear;

// Re-export the primary entry points so callers can use `pregrade_vision::CardAnalyzer` etc.
pub use analysis::{Analysis, CardAnalyzer, OverallCondition};
pub use defects::{DefectFinding, DefectReport, DefectScanner};
pub use enhance::{enhance_card, Enhanced, Enhancement};
pub use ocr::{FixedTextExtractor, NoTextExtractor, TextExtractor};
pub use quality::{analyze_quality, QualityReport};
pub use raster::RasterImage;
pub use segmentation::{segment_card, SegmentationReport};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrsExtractor};
