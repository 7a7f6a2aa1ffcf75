// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality and texture analysis.
//
// Informational only: the report feeds the grading confidence (lighting and
// focus) and is attached to the output record, but never moves a score.

pub mod artifacts;
pub mod capture;
pub mod composition;
pub mod metadata;

use pregrade_core::Level;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::raster::RasterImage;

pub use artifacts::ArtifactAnalysis;
pub use capture::{Exposure, FocusAnalysis, LightingAnalysis};
pub use composition::CompositionAnalysis;
pub use metadata::ImageMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub metadata: ImageMetadata,
    pub focus: FocusAnalysis,
    pub lighting: LightingAnalysis,
    pub composition: CompositionAnalysis,
    pub artifacts: ArtifactAnalysis,
}

impl QualityReport {
    pub fn lighting_ok(&self) -> bool {
        self.lighting.is_good()
    }

    pub fn focus_ok(&self) -> bool {
        self.focus.quality != Level::Low
    }
}

/// Run every quality pass over one shared brightness plane. With `parallel`
/// the independent passes are split across the rayon pool.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_quality(image: &RasterImage, parallel: bool) -> QualityReport {
    info!("quality analysis starting");
    let plane = image.brightness_plane();

    let (metadata, focus, lighting, composition, artifacts) = if parallel {
        let ((metadata, (focus, lighting)), (composition, artifacts)) = rayon::join(
            || {
                rayon::join(
                    || metadata::extract_metadata(image, &plane),
                    || {
                        (
                            capture::analyze_focus(&plane),
                            capture::analyze_lighting(&plane),
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || composition::analyze_composition(image, &plane),
                    || artifacts::detect_artifacts(image, &plane),
                )
            },
        );
        (metadata, focus, lighting, composition, artifacts)
    } else {
        (
            metadata::extract_metadata(image, &plane),
            capture::analyze_focus(&plane),
            capture::analyze_lighting(&plane),
            composition::analyze_composition(image, &plane),
            artifacts::detect_artifacts(image, &plane),
        )
    };

    info!(
        focus = ?focus.quality,
        exposure = ?lighting.exposure,
        quality_score = metadata.quality_metrics.quality_score,
        "quality analysis complete"
    );

    QualityReport {
        metadata,
        focus,
        lighting,
        composition,
        artifacts,
    }
}
