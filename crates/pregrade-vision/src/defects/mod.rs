// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defect scanning: eight independent detectors and their overall score, with
// optional visualisations and per-defect recommendations.

pub mod advice;
pub mod detectors;
pub mod visualize;

use std::collections::BTreeMap;

use pregrade_core::{DefectKind, Impact, LocatedRegion, Priority, PRIORITY_BANDS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::raster::RasterImage;

pub use detectors::{Detector, DETECTORS};

/// Findings at or below this severity get no recommendation.
pub const RECOMMENDATION_THRESHOLD: f64 = 0.3;

// -- Records ----------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectFinding {
    #[serde(rename = "type")]
    pub kind: DefectKind,
    pub severity: f64,
    pub locations: Vec<LocatedRegion>,
    pub description: String,
    pub impact: Impact,
}

impl DefectFinding {
    pub fn new(kind: DefectKind, severity: f64, locations: Vec<LocatedRegion>) -> Self {
        let impact = Impact::from_locations(&locations);
        Self {
            kind,
            severity,
            locations,
            description: kind.description().to_string(),
            impact,
        }
    }

    /// The finding reported when a detector could not run.
    pub fn empty(kind: DefectKind) -> Self {
        Self::new(kind, 0.0, Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallDefectScore {
    pub score: f64,
    pub confidence: f64,
}

impl OverallDefectScore {
    /// Score is the mean severity of findings that located something.
    /// Confidence is the mean location count per finding, capped at 1.
    pub fn from_findings(findings: &[DefectFinding]) -> Self {
        if findings.is_empty() {
            return Self::default();
        }
        let located: Vec<f64> = findings
            .iter()
            .filter(|f| !f.locations.is_empty())
            .map(|f| f.severity)
            .collect();
        let score = if located.is_empty() {
            0.0
        } else {
            located.iter().sum::<f64>() / located.len() as f64
        };
        let mean_count = findings.iter().map(|f| f.locations.len()).sum::<usize>() as f64
            / findings.len() as f64;
        Self {
            score,
            confidence: mean_count.min(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectRecommendation {
    #[serde(rename = "type")]
    pub kind: DefectKind,
    pub severity: f64,
    pub recommendation: String,
    pub priority: Priority,
}

/// Recommendations for findings above the threshold, most severe first.
pub fn recommendations_for(findings: &[DefectFinding]) -> Vec<DefectRecommendation> {
    let mut recommendations: Vec<DefectRecommendation> = findings
        .iter()
        .filter(|f| f.severity > RECOMMENDATION_THRESHOLD)
        .map(|f| {
            let priority = PRIORITY_BANDS.classify(f.severity);
            DefectRecommendation {
                kind: f.kind,
                severity: f.severity,
                recommendation: advice::recommendation_text(f.kind, priority).to_string(),
                priority,
            }
        })
        .collect();
    recommendations.sort_by(|a, b| b.severity.total_cmp(&a.severity));
    recommendations
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectReport {
    pub overall: OverallDefectScore,
    pub details: Vec<DefectFinding>,
    /// PNG overlays keyed by kind. Written as artifacts, never serialised.
    #[serde(skip)]
    pub visualizations: BTreeMap<DefectKind, Vec<u8>>,
    pub recommendations: Vec<DefectRecommendation>,
}

impl DefectReport {
    pub fn finding(&self, kind: DefectKind) -> Option<&DefectFinding> {
        self.details.iter().find(|f| f.kind == kind)
    }

    pub fn located_findings(&self) -> impl Iterator<Item = &DefectFinding> {
        self.details.iter().filter(|f| !f.locations.is_empty())
    }
}

// -- Scanner ----------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct DefectScanner {
    parallel: bool,
    visualize: bool,
}

impl Default for DefectScanner {
    fn default() -> Self {
        Self {
            parallel: true,
            visualize: false,
        }
    }
}

impl DefectScanner {
    pub fn new(parallel: bool, visualize: bool) -> Self {
        Self {
            parallel,
            visualize,
        }
    }

    /// Run all eight detectors. A detector that fails contributes an empty
    /// finding; only visualisation encoding can fail the whole scan.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn scan(&self, image: &RasterImage) -> DefectReport {
        info!("defect scan starting");

        let run = |detector: &Detector| match detector.detect(image) {
            Ok(finding) => finding,
            Err(err) => {
                warn!(kind = %detector.kind(), error = %err, "detector degraded to empty finding");
                DefectFinding::empty(detector.kind())
            }
        };
        let details: Vec<DefectFinding> = if self.parallel {
            DETECTORS.par_iter().map(run).collect()
        } else {
            DETECTORS.iter().map(run).collect()
        };

        let overall = OverallDefectScore::from_findings(&details);
        let recommendations = recommendations_for(&details);

        let visualizations = if self.visualize {
            visualize::render_visualizations(image, &details).unwrap_or_else(|err| {
                warn!(error = %err, "defect visualisations skipped");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        info!(
            score = overall.score,
            located = details.iter().filter(|f| !f.locations.is_empty()).count(),
            "defect scan complete"
        );

        DefectReport {
            overall,
            details,
            visualizations,
            recommendations,
        }
    }
}
