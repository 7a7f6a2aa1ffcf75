// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The per-image analysis record: the four graded criteria, the extracted
// text, and the equal-weight overall condition.

use pregrade_core::error::PregradeError;
use pregrade_core::{round1, AnalysisConfig, CriterionScores, Dimensions, ExtractedText, GradeLabel};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::condition::{
    analyze_centering, analyze_corners, analyze_edges, analyze_surface, CenteringAnalysis,
    CornerAnalysis, EdgeAnalysis, SurfaceAnalysis,
};
use crate::ocr::{NoTextExtractor, TextExtractor};
use crate::raster::RasterImage;

// -- Records ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallCondition {
    pub score: f64,
    pub grade: GradeLabel,
    pub breakdown: CriterionScores,
}

impl OverallCondition {
    /// Equal-weight mean of the four criteria, rounded to one decimal. The
    /// grade is taken from the rounded score so the two always agree.
    pub fn from_scores(breakdown: CriterionScores) -> Self {
        let score = round1(breakdown.weighted_score());
        Self {
            score,
            grade: GradeLabel::from_score(score),
            breakdown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub card_type: String,
    pub dimensions: Dimensions,
    pub centering: CenteringAnalysis,
    pub corners: CornerAnalysis,
    pub edges: EdgeAnalysis,
    pub surface: SurfaceAnalysis,
    pub text: ExtractedText,
    pub overall_condition: OverallCondition,
    /// Stages that failed and were replaced by neutral defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl Analysis {
    pub fn criterion_scores(&self) -> CriterionScores {
        CriterionScores {
            centering: self.centering.score,
            corners: self.corners.average_score,
            edges: self.edges.average_score,
            surface: self.surface.score,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

// -- Analyzer ---------------------------------------------------------------

/// Runs the four criterion scorers and the text extractor over one image.
pub struct CardAnalyzer {
    card_type: String,
    parallel: bool,
    extractor: Box<dyn TextExtractor>,
}

impl Default for CardAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl CardAnalyzer {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            card_type: config.card_type.clone(),
            parallel: config.parallel,
            extractor: Box::new(NoTextExtractor),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Score one image. Scorer and extractor failures never abort the run;
    /// the failing stage reports neutral defaults and is listed in
    /// [`Analysis::degraded`].
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn analyze(&self, image: &RasterImage) -> Analysis {
        info!(card_type = %self.card_type, "card analysis starting");

        let text = || self.extractor.extract(image);
        let (centering, (corners, edges, surface), text) = if self.parallel {
            let ((centering, corners), ((edges, surface), text)) = rayon::join(
                || rayon::join(|| analyze_centering(image), || analyze_corners(image)),
                || {
                    rayon::join(
                        || rayon::join(|| analyze_edges(image), || analyze_surface(image)),
                        text,
                    )
                },
            );
            (centering, (corners, edges, surface), text)
        } else {
            (
                analyze_centering(image),
                (analyze_corners(image), analyze_edges(image), analyze_surface(image)),
                text(),
            )
        };

        let mut degraded = Vec::new();
        let corners = settle("corners", corners, CornerAnalysis::degraded, &mut degraded);
        let edges = settle("edges", edges, EdgeAnalysis::degraded, &mut degraded);
        let surface = settle("surface", surface, SurfaceAnalysis::degraded, &mut degraded);
        let text = settle("text", text, ExtractedText::empty, &mut degraded);

        let breakdown = CriterionScores {
            centering: centering.score,
            corners: corners.average_score,
            edges: edges.average_score,
            surface: surface.score,
        };
        let analysis = Analysis {
            card_type: self.card_type.clone(),
            dimensions: image.dimensions(),
            centering,
            corners,
            edges,
            surface,
            text,
            overall_condition: OverallCondition::from_scores(breakdown),
            degraded,
        };

        info!(
            score = analysis.overall_condition.score,
            grade = %analysis.overall_condition.grade,
            degraded = analysis.degraded.len(),
            "card analysis complete"
        );
        analysis
    }
}

fn settle<T>(
    stage: &str,
    result: Result<T, PregradeError>,
    fallback: impl FnOnce() -> T,
    degraded: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(stage, class = ?e.class(), "stage degraded to neutral defaults: {e}");
            degraded.push(stage.to_string());
            fallback()
        }
    }
}
