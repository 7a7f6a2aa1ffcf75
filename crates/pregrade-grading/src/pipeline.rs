// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The grading pipeline: decode the submission, run every enabled stage, and
// join the results into one report.
//
// Stages share nothing mutable: each receives the decoded raster by reference
// and returns its own record, so with `parallel` enabled they run on the rayon
// pool and the aggregator is the only join point.

use std::path::Path;

use pregrade_core::error::PregradeError;
use pregrade_core::AnalysisConfig;
use pregrade_vision::{
    analyze_quality, enhance_card, segment_card, CardAnalyzer, DefectScanner, TextExtractor,
};
use tracing::{info, instrument, warn};

use crate::aggregator::{grade_card, CriterionResults, GradingInputs};
use crate::intake::{Submission, Upload};
use crate::rarity::{KeywordRarity, RarityLookup};
use crate::report::{CardReport, ReportId};

/// Runs `a` and `b` on the rayon pool when `parallel`, otherwise in order.
fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}

/// Grades card submissions under one [`AnalysisConfig`]. Build once and reuse:
/// the text extractor may hold loaded models.
pub struct CardGrader {
    config: AnalysisConfig,
    analyzer: CardAnalyzer,
    rarity: Box<dyn RarityLookup>,
}

impl Default for CardGrader {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl CardGrader {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analyzer: CardAnalyzer::from_config(&config),
            rarity: Box::new(KeywordRarity::new(config.rarity_keywords.clone())),
            config,
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.analyzer = self.analyzer.with_extractor(extractor);
        self
    }

    pub fn with_rarity(mut self, rarity: Box<dyn RarityLookup>) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate and grade image files from disk.
    pub fn grade_files(&self, front: &Path, back: Option<&Path>) -> Result<CardReport, PregradeError> {
        let limit = self.config.max_upload_bytes;
        let mut submission = Submission::new(Upload::from_path(front, limit)?);
        if let Some(back) = back {
            submission = submission.with_back(Upload::from_path(back, limit)?);
        }
        self.grade(&submission)
    }

    /// Grade one submission. Only a missing front or an undecodable image
    /// fails the run; every other stage failure degrades in place and is
    /// listed in [`CardReport::degraded`].
    #[instrument(skip_all, fields(has_back = submission.back.is_some()))]
    pub fn grade(&self, submission: &Submission) -> Result<CardReport, PregradeError> {
        let front_upload = submission.front()?;
        let front = front_upload.decode()?;
        let back = submission.back.as_ref().map(Upload::decode).transpose()?;
        info!(
            width = front.width(),
            height = front.height(),
            back = back.is_some(),
            "grading starting"
        );

        let cfg = &self.config;
        let parallel = cfg.parallel;
        let scanner = DefectScanner::new(parallel, cfg.visualizations);

        let ((analysis, back_analysis), ((defects, quality), (segmentation, enhanced))) = join(
            parallel,
            || {
                join(
                    parallel,
                    || self.analyzer.analyze(&front),
                    || back.as_ref().map(|b| self.analyzer.analyze(b)),
                )
            },
            || {
                join(
                    parallel,
                    || {
                        join(
                            parallel,
                            || cfg.defects.then(|| scanner.scan(&front)),
                            || cfg.quality.then(|| analyze_quality(&front, parallel)),
                        )
                    },
                    || {
                        join(
                            parallel,
                            || cfg.segmentation.then(|| segment_card(&front, cfg.render_highlights)),
                            || cfg.enhancement.then(|| enhance_card(&front, parallel)),
                        )
                    },
                )
            },
        );

        let mut degraded = analysis.degraded.clone();
        if let Some(back_analysis) = &back_analysis {
            degraded.extend(back_analysis.degraded.iter().map(|s| format!("back.{s}")));
        }
        let segmentation = match segmentation {
            Some(Ok(report)) => Some(report),
            Some(Err(e)) => {
                warn!("segmentation degraded, omitting it from the report: {e}");
                degraded.push("segmentation".into());
                None
            }
            None => None,
        };

        let mut criteria = CriterionResults::from_analysis(&analysis);
        if let Some(back_analysis) = &back_analysis {
            criteria = criteria.worse_of(&CriterionResults::from_analysis(back_analysis));
        }
        let inputs = GradingInputs {
            criteria,
            dimensions: analysis.dimensions,
            text: &analysis.text,
            lighting_ok: quality.as_ref().is_none_or(|q| q.lighting_ok()),
            focus_ok: quality.as_ref().is_none_or(|q| q.focus_ok()),
        };
        let grading = grade_card(&inputs, self.rarity.as_ref());

        let report = CardReport {
            report_id: ReportId::new(),
            generated_at: chrono::Utc::now(),
            source_sha256: front_upload.sha256.clone(),
            back_sha256: submission.back.as_ref().map(|b| b.sha256.clone()),
            card_type: cfg.card_type.clone(),
            analysis,
            back_analysis,
            grading,
            defects,
            quality,
            segmentation,
            enhanced,
            degraded,
        };
        info!(
            report_id = %report.report_id,
            grade = %report.grading.overall_grade,
            score = report.grading.overall_score,
            degraded = report.degraded.len(),
            "grading complete"
        );
        Ok(report)
    }
}
