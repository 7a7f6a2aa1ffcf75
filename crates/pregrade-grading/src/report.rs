// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The output record handed to presentation and report collaborators, and the
// on-disk artifact layout for it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pregrade_core::error::PregradeError;
use pregrade_vision::{Analysis, DefectReport, Enhanced, QualityReport, SegmentationReport};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::aggregator::Grading;

/// Unique identifier for one grading run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReport {
    pub report_id: ReportId,
    pub generated_at: DateTime<Utc>,
    pub source_sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_sha256: Option<String>,
    pub card_type: String,
    pub analysis: Analysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_analysis: Option<Analysis>,
    pub grading: Grading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defects: Option<DefectReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<SegmentationReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<Enhanced>,
    /// Every stage, on either side, that fell back to neutral defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

impl CardReport {
    pub fn to_json_pretty(&self) -> Result<String, PregradeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `report.json` plus every rendered image into `dir`:
    /// `defect_<kind>.png`, `segment_<family>_<name>.png`, and
    /// `enhanced_<kind>.png`. Returns the paths written.
    #[instrument(skip(self), fields(report_id = %self.report_id, dir = %dir.display()))]
    pub fn write_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>, PregradeError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let report_path = dir.join("report.json");
        std::fs::write(&report_path, self.to_json_pretty()?)?;
        written.push(report_path);

        if let Some(defects) = &self.defects {
            for (kind, png) in &defects.visualizations {
                let path = dir.join(format!("defect_{}.png", kind.as_str()));
                std::fs::write(&path, png)?;
                written.push(path);
            }
        }

        if let Some(segmentation) = &self.segmentation {
            for (name, png) in segmentation.highlight_images() {
                let path = dir.join(format!("segment_{name}.png"));
                std::fs::write(&path, png)?;
                written.push(path);
            }
        }

        if let Some(enhanced) = &self.enhanced {
            for variant in &enhanced.variants {
                if let Some(image) = &variant.image {
                    let path = dir.join(format!("enhanced_{}.png", variant.kind.as_str()));
                    image.save(&path)?;
                    written.push(path);
                }
            }
        }

        info!(files = written.len(), "report artifacts written");
        Ok(written)
    }
}
