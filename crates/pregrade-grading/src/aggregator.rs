// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grade aggregation: combines the four criterion scores into the overall
// grade, then derives the probability, confidence, per-criterion impact,
// recommendations, market value, and submission advice.

use pregrade_core::banding::{Bands, Comparison};
use pregrade_core::{
    Criterion, CriterionScores, Dimensions, ExtractedText, GradeLabel, Priority,
    ScoreResult,
};
use pregrade_vision::{Analysis, OverallCondition};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::market::estimate_value;
use crate::rarity::RarityLookup;

/// Criteria below this score get a recommendation.
pub const RECOMMENDATION_THRESHOLD: f64 = 7.0;
/// Overall score that earns the "high-grade potential" note.
pub const HIGH_GRADE_THRESHOLD: f64 = 9.0;
pub const SUBMIT_THRESHOLD: f64 = 8.5;
pub const WARNING_THRESHOLD: f64 = 6.0;
/// Centering or corners below this trigger the caution advice.
pub const CAUTION_THRESHOLD: f64 = 6.0;

pub const MIN_PROBABILITY: f64 = 0.05;
pub const MAX_PROBABILITY: f64 = 0.95;

/// Both sides must reach this many pixels for full resolution confidence.
pub const MIN_CONFIDENT_SIDE: u32 = 500;
/// OCR confidence (0–100) above which the text counts as read.
pub const MIN_TEXT_CONFIDENCE: f64 = 50.0;

// -- Impact -----------------------------------------------------------------

/// How one criterion pulls the overall grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionImpact {
    #[serde(rename = "High Positive")]
    HighPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "High Negative")]
    HighNegative,
}

/// Weighted contribution (`score * 0.25`) to impact.
pub const IMPACT_BANDS: Bands<CriterionImpact> = Bands::new(
    Comparison::AtLeast,
    &[
        (2.4, CriterionImpact::HighPositive),
        (2.0, CriterionImpact::Positive),
        (1.5, CriterionImpact::Neutral),
        (1.0, CriterionImpact::Negative),
    ],
    CriterionImpact::HighNegative,
);

impl CriterionImpact {
    pub fn from_score(score: f64) -> Self {
        IMPACT_BANDS.classify(score * Criterion::WEIGHT)
    }
}

// -- Inputs -----------------------------------------------------------------

/// One score and grade per criterion. A degraded criterion keeps its
/// `Unknown` grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionResults {
    pub centering: ScoreResult,
    pub corners: ScoreResult,
    pub edges: ScoreResult,
    pub surface: ScoreResult,
}

impl CriterionResults {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        Self {
            centering: ScoreResult {
                score: analysis.centering.score,
                grade: analysis.centering.grade,
            },
            corners: ScoreResult {
                score: analysis.corners.average_score,
                grade: analysis.corners.grade,
            },
            edges: ScoreResult {
                score: analysis.edges.average_score,
                grade: analysis.edges.grade,
            },
            surface: ScoreResult {
                score: analysis.surface.score,
                grade: analysis.surface.grade,
            },
        }
    }

    pub fn get(&self, criterion: Criterion) -> ScoreResult {
        match criterion {
            Criterion::Centering => self.centering,
            Criterion::Corners => self.corners,
            Criterion::Edges => self.edges,
            Criterion::Surface => self.surface,
        }
    }

    pub fn scores(&self) -> CriterionScores {
        CriterionScores {
            centering: self.centering.score,
            corners: self.corners.score,
            edges: self.edges.score,
            surface: self.surface.score,
        }
    }

    /// Criterion-wise lower of two sides. Ties keep `self`.
    pub fn worse_of(&self, other: &Self) -> Self {
        let pick = |a: ScoreResult, b: ScoreResult| if b.score < a.score { b } else { a };
        Self {
            centering: pick(self.centering, other.centering),
            corners: pick(self.corners, other.corners),
            edges: pick(self.edges, other.edges),
            surface: pick(self.surface, other.surface),
        }
    }
}

/// Everything the aggregator reads.
#[derive(Debug, Clone, Copy)]
pub struct GradingInputs<'a> {
    pub criteria: CriterionResults,
    pub dimensions: Dimensions,
    pub text: &'a ExtractedText,
    /// `true` when the quality stage was skipped.
    pub lighting_ok: bool,
    /// `true` when the quality stage was skipped.
    pub focus_ok: bool,
}

// -- Output records ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionBreakdown {
    pub score: f64,
    pub grade: GradeLabel,
    pub impact: CriterionImpact,
}

impl CriterionBreakdown {
    fn new(result: ScoreResult) -> Self {
        Self {
            score: result.score,
            grade: result.grade,
            impact: CriterionImpact::from_score(result.score),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub centering: CriterionBreakdown,
    pub corners: CriterionBreakdown,
    pub edges: CriterionBreakdown,
    pub surface: CriterionBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationImpact {
    High,
    Medium,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub issue: String,
    pub suggestion: String,
    pub impact: RecommendationImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdviceKind {
    Positive,
    Warning,
    Caution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAdvice {
    #[serde(rename = "type")]
    pub kind: AdviceKind,
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grading {
    pub overall_grade: GradeLabel,
    pub overall_score: f64,
    pub probability: f64,
    pub confidence: f64,
    pub breakdown: Breakdown,
    pub recommendations: Vec<Recommendation>,
    pub market_value: u64,
    pub submission_advice: Vec<SubmissionAdvice>,
}

// -- Aggregation ------------------------------------------------------------

#[instrument(skip_all, fields(width = inputs.dimensions.width, height = inputs.dimensions.height))]
pub fn grade_card(inputs: &GradingInputs<'_>, rarity: &dyn RarityLookup) -> Grading {
    let scores = inputs.criteria.scores();
    let overall = OverallCondition::from_scores(scores);
    let probability = probability(overall.score, &scores);
    let confidence = confidence(inputs);
    debug!(
        overall = overall.score,
        probability, confidence, "criteria aggregated"
    );

    Grading {
        overall_grade: overall.grade,
        overall_score: overall.score,
        probability,
        confidence,
        breakdown: Breakdown {
            centering: CriterionBreakdown::new(inputs.criteria.centering),
            corners: CriterionBreakdown::new(inputs.criteria.corners),
            edges: CriterionBreakdown::new(inputs.criteria.edges),
            surface: CriterionBreakdown::new(inputs.criteria.surface),
        },
        recommendations: recommendations(&inputs.criteria, overall.score),
        market_value: estimate_value(overall.grade, overall.score, &inputs.text.text, rarity),
        submission_advice: submission_advice(&inputs.criteria, overall.score),
    }
}

/// How likely the card lands in the grade its score maps to: highest at the
/// middle of the grade's guideline range, plus a bonus when the four
/// criteria agree. Always within `[0.05, 0.95]`.
pub fn probability(overall: f64, scores: &CriterionScores) -> f64 {
    let Some(range) = GradeLabel::from_score(overall).range() else {
        return MIN_PROBABILITY;
    };
    let base = (1.0 - (overall - range.midpoint()).abs() / range.width()).max(0.1);
    let consistency = ((1.0 - scores.std_dev() / 10.0) * 0.1).max(0.0);
    (base + consistency).clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// Mean of four factors, each 1.0 when satisfied: resolution (else 0.5),
/// text legibility (0.7), lighting (0.8), focus (0.8).
pub fn confidence(inputs: &GradingInputs<'_>) -> f64 {
    let resolution = inputs.dimensions.width >= MIN_CONFIDENT_SIDE
        && inputs.dimensions.height >= MIN_CONFIDENT_SIDE;
    let factors = [
        if resolution { 1.0 } else { 0.5 },
        if inputs.text.confidence > MIN_TEXT_CONFIDENCE { 1.0 } else { 0.7 },
        if inputs.lighting_ok { 1.0 } else { 0.8 },
        if inputs.focus_ok { 1.0 } else { 0.8 },
    ];
    factors.iter().sum::<f64>() / factors.len() as f64
}

fn criterion_recommendation(criterion: Criterion) -> Recommendation {
    let (issue, suggestion, impact) = match criterion {
        Criterion::Centering => (
            "Poor centering detected",
            "Consider if the centering issue significantly affects the card's appeal",
            RecommendationImpact::High,
        ),
        Criterion::Corners => (
            "Corner damage detected",
            "Examine corners under magnification for wear or damage",
            RecommendationImpact::High,
        ),
        Criterion::Edges => (
            "Edge wear detected",
            "Check for edge whitening, chipping, or other damage",
            RecommendationImpact::Medium,
        ),
        Criterion::Surface => (
            "Surface issues detected",
            "Look for scratches, print defects, or surface wear under good lighting",
            RecommendationImpact::High,
        ),
    };
    Recommendation {
        category: criterion.label().into(),
        issue: issue.into(),
        suggestion: suggestion.into(),
        impact,
    }
}

pub fn recommendations(criteria: &CriterionResults, overall: f64) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = Criterion::ALL
        .into_iter()
        .filter(|c| criteria.get(*c).score < RECOMMENDATION_THRESHOLD)
        .map(criterion_recommendation)
        .collect();
    if overall >= HIGH_GRADE_THRESHOLD {
        out.push(Recommendation {
            category: "Overall".into(),
            issue: "High-grade potential".into(),
            suggestion: "Card shows excellent condition - consider professional grading".into(),
            impact: RecommendationImpact::Positive,
        });
    }
    out
}

pub fn submission_advice(criteria: &CriterionResults, overall: f64) -> Vec<SubmissionAdvice> {
    let mut advice = Vec::new();
    if overall >= SUBMIT_THRESHOLD {
        advice.push(SubmissionAdvice {
            kind: AdviceKind::Positive,
            message: "This card appears to be in excellent condition and may be worth professional grading."
                .into(),
            priority: Priority::High,
        });
    }
    if overall < WARNING_THRESHOLD {
        advice.push(SubmissionAdvice {
            kind: AdviceKind::Warning,
            message: "This card shows significant wear and may not benefit from professional grading."
                .into(),
            priority: Priority::Medium,
        });
    }
    if criteria.centering.score < CAUTION_THRESHOLD || criteria.corners.score < CAUTION_THRESHOLD {
        advice.push(SubmissionAdvice {
            kind: AdviceKind::Caution,
            message: "Major condition issues detected. Consider if the card is worth grading.".into(),
            priority: Priority::High,
        });
    }
    advice
}
