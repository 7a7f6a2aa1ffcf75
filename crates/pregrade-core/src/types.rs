// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pregrade card grader.

use serde::{Deserialize, Serialize};

use crate::banding::{Bands, Comparison};

// -- Geometry ---------------------------------------------------------------

/// A rectangle in pixel coordinates, always inside the image it was cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Guards `floor`/`ceil` against fractions like `0.9 * 1000` landing a hair
/// above or below the integer they denote.
const SNAP: f64 = 1e-9;

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region spanning `[x0, x1) × [y0, y1)`; inverted spans collapse to empty.
    pub fn from_span(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Region covering the pixel rows/columns touched by the fractional
    /// rectangle `(fx, fy, fw, fh)` of a `width × height` image.
    ///
    /// The start edge is floored, the end edge ceiled, both clamped to the
    /// image, so a fractional strip always covers at least the pixels a
    /// sub-pixel scan would visit.
    pub fn from_fractions(width: u32, height: u32, fx: f64, fy: f64, fw: f64, fh: f64) -> Self {
        let (x0, x1) = fraction_span(width, fx, fx + fw);
        let (y0, y1) = fraction_span(height, fy, fy + fh);
        Self::from_span(x0, y0, x1, y1)
    }

    /// Region from real-valued pixel coordinates, clamped to the image.
    pub fn from_pixels(width: u32, height: u32, x: f64, y: f64, w: f64, h: f64) -> Self {
        let snap = |value: f64, limit: u32| -> u32 { value.clamp(0.0, f64::from(limit)) as u32 };
        let x0 = snap((x + SNAP).floor(), width);
        let y0 = snap((y + SNAP).floor(), height);
        let x1 = snap((x + w - SNAP).ceil(), width);
        let y1 = snap((y + h - SNAP).ceil(), height);
        Self::from_span(x0, y0, x1, y1)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersect with the `width × height` image bounds.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        Self::from_span(x0, y0, self.right().min(width), self.bottom().min(height))
    }
}

fn fraction_span(extent: u32, start: f64, end: f64) -> (u32, u32) {
    let limit = f64::from(extent);
    let lo = ((start * limit) + SNAP).floor().clamp(0.0, limit) as u32;
    let hi = ((end * limit) - SNAP).ceil().clamp(0.0, limit) as u32;
    (lo, hi)
}

/// A region flagged by a detector, with the detector's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocatedRegion {
    #[serde(flatten)]
    pub region: Region,
    pub confidence: f64,
}

impl LocatedRegion {
    pub fn new(region: Region, confidence: f64) -> Self {
        Self { region, confidence }
    }
}

/// Decoded image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        let aspect_ratio = if height == 0 {
            0.0
        } else {
            f64::from(width) / f64::from(height)
        };
        Self {
            width,
            height,
            aspect_ratio,
        }
    }

    pub fn total_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

// -- Grades -----------------------------------------------------------------

/// PSA-style condition grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeLabel {
    #[serde(rename = "Gem Mint")]
    GemMint,
    #[serde(rename = "Mint")]
    Mint,
    #[serde(rename = "Near Mint-Mint")]
    NearMintMint,
    #[serde(rename = "Near Mint")]
    NearMint,
    #[serde(rename = "Excellent-Mint")]
    ExcellentMint,
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Very Good-Excellent")]
    VeryGoodExcellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    #[serde(rename = "Good-Very Good")]
    GoodVeryGood,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Poor")]
    Poor,
    /// Produced only when an analysis stage degraded to neutral defaults.
    #[serde(rename = "Unknown")]
    Unknown,
}

/// Score to grade, highest band whose minimum the score meets.
pub const GRADE_BANDS: Bands<GradeLabel> = Bands::new(
    Comparison::AtLeast,
    &[
        (9.5, GradeLabel::GemMint),
        (9.0, GradeLabel::Mint),
        (8.0, GradeLabel::NearMintMint),
        (7.0, GradeLabel::NearMint),
        (6.0, GradeLabel::ExcellentMint),
        (5.0, GradeLabel::Excellent),
        (4.0, GradeLabel::VeryGoodExcellent),
        (3.0, GradeLabel::VeryGood),
        (2.0, GradeLabel::GoodVeryGood),
        (1.0, GradeLabel::Good),
    ],
    GradeLabel::Poor,
);

/// Published score range of a grade in the grading guidelines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeRange {
    pub min: f64,
    pub max: f64,
}

impl GradeRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl GradeLabel {
    /// Every real grade, best first. `Unknown` is excluded.
    pub const ALL: [GradeLabel; 11] = [
        Self::GemMint,
        Self::Mint,
        Self::NearMintMint,
        Self::NearMint,
        Self::ExcellentMint,
        Self::Excellent,
        Self::VeryGoodExcellent,
        Self::VeryGood,
        Self::GoodVeryGood,
        Self::Good,
        Self::Poor,
    ];

    pub fn from_score(score: f64) -> Self {
        GRADE_BANDS.classify(score)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GemMint => "Gem Mint",
            Self::Mint => "Mint",
            Self::NearMintMint => "Near Mint-Mint",
            Self::NearMint => "Near Mint",
            Self::ExcellentMint => "Excellent-Mint",
            Self::Excellent => "Excellent",
            Self::VeryGoodExcellent => "Very Good-Excellent",
            Self::VeryGood => "Very Good",
            Self::GoodVeryGood => "Good-Very Good",
            Self::Good => "Good",
            Self::Poor => "Poor",
            Self::Unknown => "Unknown",
        }
    }

    /// Guideline range; `None` for `Unknown`.
    pub fn range(&self) -> Option<GradeRange> {
        let (min, max) = match self {
            Self::GemMint => (9.5, 10.0),
            Self::Mint => (9.0, 9.4),
            Self::NearMintMint => (8.0, 8.9),
            Self::NearMint => (7.0, 7.9),
            Self::ExcellentMint => (6.0, 6.9),
            Self::Excellent => (5.0, 5.9),
            Self::VeryGoodExcellent => (4.0, 4.9),
            Self::VeryGood => (3.0, 3.9),
            Self::GoodVeryGood => (2.0, 2.9),
            Self::Good => (1.0, 1.9),
            Self::Poor => (0.0, 0.9),
            Self::Unknown => return None,
        };
        Some(GradeRange { min, max })
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::GemMint => "Perfect card with no visible flaws",
            Self::Mint => "Nearly perfect with only minor flaws",
            Self::NearMintMint => "Excellent condition with minor wear",
            Self::NearMint => "Very good condition with some wear",
            Self::ExcellentMint => "Good condition with noticeable wear",
            Self::Excellent => "Above average condition",
            Self::VeryGoodExcellent => "Average condition",
            Self::VeryGood => "Below average condition",
            Self::GoodVeryGood => "Poor condition",
            Self::Good => "Very poor condition",
            Self::Poor => "Severely damaged",
            Self::Unknown => "Unknown grade",
        }
    }
}

impl std::fmt::Display for GradeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round to one decimal place, the precision every published score uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A 0–10 score and the grade it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub grade: GradeLabel,
}

impl ScoreResult {
    pub fn from_score(score: f64) -> Self {
        Self {
            score,
            grade: GradeLabel::from_score(score),
        }
    }

    /// Neutral result substituted when a scorer fails.
    pub fn degraded() -> Self {
        Self {
            score: 5.0,
            grade: GradeLabel::Unknown,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.grade == GradeLabel::Unknown
    }
}

// -- Criteria ---------------------------------------------------------------

/// The four graded criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    Centering,
    Corners,
    Edges,
    Surface,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Self::Centering,
        Self::Corners,
        Self::Edges,
        Self::Surface,
    ];

    /// Every criterion carries the same weight.
    pub const WEIGHT: f64 = 0.25;

    pub fn label(&self) -> &'static str {
        match self {
            Self::Centering => "Centering",
            Self::Corners => "Corners",
            Self::Edges => "Edges",
            Self::Surface => "Surface",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Centering => "How well the card image is centered within the borders",
            Self::Corners => "Condition of the four corners of the card",
            Self::Edges => "Condition of the card edges",
            Self::Surface => "Surface condition including scratches, print defects, and wear",
        }
    }
}

/// One score per criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionScores {
    pub centering: f64,
    pub corners: f64,
    pub edges: f64,
    pub surface: f64,
}

impl CriterionScores {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::Centering => self.centering,
            Criterion::Corners => self.corners,
            Criterion::Edges => self.edges,
            Criterion::Surface => self.surface,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.centering, self.corners, self.edges, self.surface]
    }

    pub fn weighted_score(&self) -> f64 {
        self.values().iter().map(|s| s * Criterion::WEIGHT).sum()
    }

    /// Population standard deviation across the four criteria.
    pub fn std_dev(&self) -> f64 {
        let values = self.values();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

// -- Defects ----------------------------------------------------------------

/// The eight defect detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    Scratches,
    Dents,
    CornerWear,
    EdgeWear,
    SurfaceDamage,
    Discoloration,
    PrintingDefects,
    WaterDamage,
}

impl DefectKind {
    pub const ALL: [DefectKind; 8] = [
        Self::Scratches,
        Self::Dents,
        Self::CornerWear,
        Self::EdgeWear,
        Self::SurfaceDamage,
        Self::Discoloration,
        Self::PrintingDefects,
        Self::WaterDamage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scratches => "scratches",
            Self::Dents => "dents",
            Self::CornerWear => "corner_wear",
            Self::EdgeWear => "edge_wear",
            Self::SurfaceDamage => "surface_damage",
            Self::Discoloration => "discoloration",
            Self::PrintingDefects => "printing_defects",
            Self::WaterDamage => "water_damage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Scratches => "Linear surface damage detected",
            Self::Dents => "Surface depressions detected",
            Self::CornerWear => "Corner wear and damage detected",
            Self::EdgeWear => "Edge wear and damage detected",
            Self::SurfaceDamage => "Surface texture irregularities detected",
            Self::Discoloration => "Color inconsistencies detected",
            Self::PrintingDefects => "Printing quality issues detected",
            Self::WaterDamage => "Water damage patterns detected",
        }
    }

    /// Tint used when rendering this kind's locations.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Scratches => [255, 0, 0],
            Self::Dents => [255, 165, 0],
            Self::CornerWear => [255, 255, 0],
            Self::EdgeWear => [0, 255, 0],
            Self::SurfaceDamage => [0, 255, 255],
            Self::Discoloration => [128, 0, 255],
            Self::PrintingDefects => [255, 0, 255],
            Self::WaterDamage => [0, 0, 255],
        }
    }
}

impl std::fmt::Display for DefectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a defect's footprint matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Impact {
    None,
    Minimal,
    Minor,
    Moderate,
    Significant,
    Major,
}

/// `(totalArea * totalConfidence) / 10000` to impact.
pub const IMPACT_BANDS: Bands<Impact> = Bands::new(
    Comparison::Below,
    &[
        (0.1, Impact::Minimal),
        (0.3, Impact::Minor),
        (0.5, Impact::Moderate),
        (0.7, Impact::Significant),
    ],
    Impact::Major,
);

impl Impact {
    pub fn from_locations(locations: &[LocatedRegion]) -> Self {
        if locations.is_empty() {
            return Self::None;
        }
        let total_area: f64 = locations.iter().map(|l| l.region.area() as f64).sum();
        let total_confidence: f64 = locations.iter().map(|l| l.confidence).sum();
        IMPACT_BANDS.classify(total_area * total_confidence / 10_000.0)
    }
}

// -- Tiers ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Severity to priority: `> 0.7` High, `> 0.4` Medium.
pub const PRIORITY_BANDS: Bands<Priority> = Bands::new(
    Comparison::Above,
    &[(0.7, Priority::High), (0.4, Priority::Medium)],
    Priority::Low,
);

/// Three-step quality tier used by the quality analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Good,
    Fair,
    Poor,
}

// -- Collaborator contracts -------------------------------------------------

/// Output of the text-extraction collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedText {
    pub text: String,
    /// 0–100.
    pub confidence: f64,
    pub words: Vec<String>,
}

impl ExtractedText {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// How a failure is handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Rejected before analysis starts.
    Input,
    /// A stage failed; neutral defaults stand in and the run continues.
    Degraded,
    /// The run cannot continue.
    Fatal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grade_band_boundaries() {
        let cases = [
            (0.0, GradeLabel::Poor),
            (0.9, GradeLabel::Poor),
            (1.0, GradeLabel::Good),
            (8.9, GradeLabel::NearMintMint),
            (9.0, GradeLabel::Mint),
            (9.4, GradeLabel::Mint),
            (9.5, GradeLabel::GemMint),
            (10.0, GradeLabel::GemMint),
        ];
        for (score, expected) in cases {
            assert_eq!(GradeLabel::from_score(score), expected, "score {score}");
        }
    }

    #[test]
    fn grade_bands_are_exhaustive() {
        // Every tenth from 0 to 10 lands on a real grade.
        for tenth in 0..=100 {
            let grade = GradeLabel::from_score(f64::from(tenth) / 10.0);
            assert_ne!(grade, GradeLabel::Unknown);
            assert!(grade.range().is_some());
        }
    }

    #[test]
    fn band_minimums_match_guideline_ranges() {
        for grade in GradeLabel::ALL {
            let range = grade.range().unwrap();
            assert_eq!(GradeLabel::from_score(range.min), grade);
            assert_eq!(GradeLabel::from_score(range.max), grade);
        }
    }

    #[test]
    fn grade_label_serializes_to_display_name() {
        let json = serde_json::to_string(&GradeLabel::NearMintMint).unwrap();
        assert_eq!(json, "\"Near Mint-Mint\"");
        let back: GradeLabel = serde_json::from_str("\"Gem Mint\"").unwrap();
        assert_eq!(back, GradeLabel::GemMint);
    }

    #[test]
    fn from_fractions_covers_corner_square() {
        let r = Region::from_fractions(1000, 1400, 0.9, 0.9, 0.1, 0.1);
        assert_eq!(r, Region::new(900, 1260, 100, 140));
    }

    #[test]
    fn from_fractions_clamps_to_image() {
        let r = Region::from_fractions(10, 10, 0.95, 0.0, 0.5, 1.0);
        assert_eq!(r.right(), 10);
        assert_eq!(r.height, 10);
    }

    #[test]
    fn clamp_to_handles_regions_past_the_edge() {
        let r = Region::new(95, 95, 10, 10).clamp_to(100, 100);
        assert_eq!(r, Region::new(95, 95, 5, 5));
        assert!(Region::new(120, 0, 5, 5).clamp_to(100, 100).is_empty());
    }

    #[test]
    fn located_region_flattens_in_json() {
        let located = LocatedRegion::new(Region::new(1, 2, 3, 4), 0.5);
        let value = serde_json::to_value(located).unwrap();
        assert_eq!(value["x"], 1);
        assert_eq!(value["height"], 4);
        assert_eq!(value["confidence"], 0.5);
    }

    #[test]
    fn weighted_score_moves_by_quarter_delta() {
        let base = CriterionScores {
            centering: 8.0,
            corners: 7.0,
            edges: 9.0,
            surface: 6.0,
        };
        let bumped = CriterionScores {
            edges: 9.0 - 2.0,
            ..base
        };
        assert_relative_eq!(
            base.weighted_score() - bumped.weighted_score(),
            0.25 * 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn impact_thresholds() {
        let loc = |w, h, c| LocatedRegion::new(Region::new(0, 0, w, h), c);
        assert_eq!(Impact::from_locations(&[]), Impact::None);
        assert_eq!(Impact::from_locations(&[loc(10, 10, 0.5)]), Impact::Minimal);
        assert_eq!(Impact::from_locations(&[loc(40, 50, 1.0)]), Impact::Minor);
        assert_eq!(Impact::from_locations(&[loc(100, 100, 1.0)]), Impact::Major);
    }

    #[test]
    fn image_kind_from_extension() {
        assert_eq!(ImageKind::from_extension("JPG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::from_extension("gif"), None);
    }
}
