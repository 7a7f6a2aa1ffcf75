// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The four graded criteria: centering, corners, edges, and surface.
//
// Corners, edges, and surface share one density scan: count pixels whose
// brightness falls outside a band, turn the share into a percentage, and
// subtract a scaled penalty from 10.

use pregrade_core::error::PregradeError;
use pregrade_core::{round1, round2, GradeLabel, Region};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::border::{measure_border, Side};
use crate::raster::RasterImage;

// -- Centering --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenteringAnalysis {
    pub score: f64,
    pub grade: GradeLabel,
    pub vertical_centering: f64,
    pub horizontal_centering: f64,
    pub top_border: f64,
    pub bottom_border: f64,
    pub left_border: f64,
    pub right_border: f64,
}

impl CenteringAnalysis {
    pub fn degraded() -> Self {
        Self {
            score: 5.0,
            grade: GradeLabel::Unknown,
            vertical_centering: 0.0,
            horizontal_centering: 0.0,
            top_border: 0.0,
            bottom_border: 0.0,
            left_border: 0.0,
            right_border: 0.0,
        }
    }
}

/// `max(0, 10 - (v + h) * 50)` where `v` and `h` are the relative border
/// asymmetries.
pub fn centering_score(top: f64, bottom: f64, left: f64, right: f64, width: u32, height: u32) -> f64 {
    let vertical = (top - bottom).abs() / f64::from(height);
    let horizontal = (left - right).abs() / f64::from(width);
    (10.0 - (vertical + horizontal) * 50.0).max(0.0)
}

#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_centering(image: &RasterImage) -> CenteringAnalysis {
    let (w, h) = (image.width(), image.height());
    let top = measure_border(image, Side::Top);
    let bottom = measure_border(image, Side::Bottom);
    let left = measure_border(image, Side::Left);
    let right = measure_border(image, Side::Right);

    let score = round1(centering_score(top, bottom, left, right, w, h));
    debug!(top, bottom, left, right, score, "centering measured");

    CenteringAnalysis {
        score,
        grade: GradeLabel::from_score(score),
        vertical_centering: round2((top - bottom).abs() / f64::from(h)),
        horizontal_centering: round2((left - right).abs() / f64::from(w)),
        top_border: top,
        bottom_border: bottom,
        left_border: left,
        right_border: right,
    }
}

// -- Damage density ---------------------------------------------------------

/// Brightness band outside which a pixel counts as damage.
#[derive(Debug, Clone, Copy)]
pub struct DamageBand {
    pub dark: f64,
    pub bright: f64,
}

/// Corners and edges.
pub const WEAR_BAND: DamageBand = DamageBand {
    dark: 30.0,
    bright: 200.0,
};

/// Surface interior.
pub const SURFACE_BAND: DamageBand = DamageBand {
    dark: 20.0,
    bright: 220.0,
};

/// Score and damage share of one scanned region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCondition {
    pub score: f64,
    pub damage_percentage: f64,
}

/// Percentage of sampled pixels in `region` outside `band`, sampling every
/// `stride` pixels. Errors when the region samples nothing.
pub fn damage_percentage(
    image: &RasterImage,
    region: Region,
    stride: u32,
    band: DamageBand,
    stage: &'static str,
) -> Result<f64, PregradeError> {
    let safe = region.clamp_to(image.width(), image.height());
    let stride = stride.max(1) as usize;
    let mut damaged = 0u64;
    let mut total = 0u64;

    for y in (safe.y..safe.bottom()).step_by(stride) {
        for x in (safe.x..safe.right()).step_by(stride) {
            let b = image.brightness_in_bounds(x, y);
            if b > band.bright || b < band.dark {
                damaged += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return Err(PregradeError::EmptyRegion { stage });
    }
    Ok(damaged as f64 / total as f64 * 100.0)
}

fn wear_condition(image: &RasterImage, region: Region, stage: &'static str) -> Result<RegionCondition, PregradeError> {
    let pct = damage_percentage(image, region, 1, WEAR_BAND, stage)?;
    Ok(RegionCondition {
        score: round1((10.0 - pct / 10.0).max(0.0)),
        damage_percentage: round2(pct),
    })
}

// -- Corners ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerScores {
    pub top_left: RegionCondition,
    pub top_right: RegionCondition,
    pub bottom_left: RegionCondition,
    pub bottom_right: RegionCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners: Option<CornerScores>,
    pub average_score: f64,
    pub grade: GradeLabel,
}

impl CornerAnalysis {
    pub fn degraded() -> Self {
        Self {
            corners: None,
            average_score: 5.0,
            grade: GradeLabel::Unknown,
        }
    }
}

/// Score the four 10%-of-dimension corner squares.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_corners(image: &RasterImage) -> Result<CornerAnalysis, PregradeError> {
    let (w, h) = (image.width(), image.height());
    let square = |fx, fy| Region::from_fractions(w, h, fx, fy, 0.1, 0.1);

    let corners = CornerScores {
        top_left: wear_condition(image, square(0.0, 0.0), "corners")?,
        top_right: wear_condition(image, square(0.9, 0.0), "corners")?,
        bottom_left: wear_condition(image, square(0.0, 0.9), "corners")?,
        bottom_right: wear_condition(image, square(0.9, 0.9), "corners")?,
    };
    let mean = (corners.top_left.score
        + corners.top_right.score
        + corners.bottom_left.score
        + corners.bottom_right.score)
        / 4.0;
    let average_score = round1(mean);
    debug!(average_score, "corners scored");

    Ok(CornerAnalysis {
        corners: Some(corners),
        average_score,
        grade: GradeLabel::from_score(average_score),
    })
}

// -- Edges ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeScores {
    pub top: RegionCondition,
    pub bottom: RegionCondition,
    pub left: RegionCondition,
    pub right: RegionCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<EdgeScores>,
    pub average_score: f64,
    pub grade: GradeLabel,
}

impl EdgeAnalysis {
    pub fn degraded() -> Self {
        Self {
            edges: None,
            average_score: 5.0,
            grade: GradeLabel::Unknown,
        }
    }
}

/// Score the four 5%-of-dimension strips along the sides.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_edges(image: &RasterImage) -> Result<EdgeAnalysis, PregradeError> {
    let (w, h) = (image.width(), image.height());
    let strip = |fx, fy, fw, fh| Region::from_fractions(w, h, fx, fy, fw, fh);

    let edges = EdgeScores {
        top: wear_condition(image, strip(0.0, 0.0, 1.0, 0.05), "edges")?,
        bottom: wear_condition(image, strip(0.0, 0.95, 1.0, 0.05), "edges")?,
        left: wear_condition(image, strip(0.0, 0.0, 0.05, 1.0), "edges")?,
        right: wear_condition(image, strip(0.95, 0.0, 0.05, 1.0), "edges")?,
    };
    let mean = (edges.top.score + edges.bottom.score + edges.left.score + edges.right.score) / 4.0;
    let average_score = round1(mean);
    debug!(average_score, "edges scored");

    Ok(EdgeAnalysis {
        edges: Some(edges),
        average_score,
        grade: GradeLabel::from_score(average_score),
    })
}

// -- Surface ----------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceAnalysis {
    pub score: f64,
    pub damage_percentage: f64,
    pub grade: GradeLabel,
}

impl SurfaceAnalysis {
    pub fn degraded() -> Self {
        Self {
            score: 5.0,
            damage_percentage: 0.0,
            grade: GradeLabel::Unknown,
        }
    }
}

/// Score the central 80%×80% on a stride of `max(1, width / 100)`.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_surface(image: &RasterImage) -> Result<SurfaceAnalysis, PregradeError> {
    let (w, h) = (image.width(), image.height());
    let interior = Region::from_fractions(w, h, 0.1, 0.1, 0.8, 0.8);
    let stride = (w / 100).max(1);

    let pct = damage_percentage(image, interior, stride, SURFACE_BAND, "surface")?;
    let score = round1((10.0 - pct / 5.0).max(0.0));
    debug!(stride, damage_percentage = pct, score, "surface scored");

    Ok(SurfaceAnalysis {
        score,
        damage_percentage: round2(pct),
        grade: GradeLabel::from_score(score),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgba, RgbaImage};

    fn uniform(width: u32, height: u32, value: u8) -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255])))
            .unwrap()
    }

    fn with_white_block(width: u32, height: u32, block: u32) -> RasterImage {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
        for y in 0..block {
            for x in 0..block {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        RasterImage::from_rgba(img).unwrap()
    }

    #[test]
    fn uniform_gray_is_perfect_everywhere() {
        let img = uniform(1000, 1400, 128);
        let centering = analyze_centering(&img);
        assert_eq!(centering.score, 10.0);
        assert_eq!(centering.grade, GradeLabel::GemMint);
        assert_eq!(analyze_corners(&img).unwrap().average_score, 10.0);
        assert_eq!(analyze_edges(&img).unwrap().average_score, 10.0);
        assert_eq!(analyze_surface(&img).unwrap().score, 10.0);
    }

    #[test]
    fn white_block_only_marks_top_left_corner() {
        let img = with_white_block(1000, 1400, 50);
        let corners = analyze_corners(&img).unwrap().corners.unwrap();
        // 2500 of the 100x140 corner pixels are white: 17.86% damage.
        assert_eq!(corners.top_left.score, 8.2);
        assert_eq!(corners.top_left.damage_percentage, 17.86);
        assert_eq!(corners.bottom_right.score, 10.0);
        assert_eq!(corners.top_right.score, 10.0);
    }

    #[test]
    fn centering_is_swap_symmetric() {
        let a = centering_score(30.0, 10.0, 12.0, 20.0, 400, 600);
        let b = centering_score(10.0, 30.0, 20.0, 12.0, 400, 600);
        assert_relative_eq!(a, b);
    }

    #[test]
    fn off_center_frame_loses_points() {
        // Top border 40, bottom 10 on a 300-high image: v = 0.1, score 5.
        let img = RasterImage::from_rgba(RgbaImage::from_fn(200, 300, |_, y| {
            if (40..290).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([128, 128, 128, 255])
            }
        }))
        .unwrap();
        let centering = analyze_centering(&img);
        assert_eq!(centering.top_border, 40.0);
        assert_eq!(centering.bottom_border, 10.0);
        assert_eq!(centering.score, 5.0);
        assert_eq!(centering.grade, GradeLabel::Excellent);
    }

    #[test]
    fn dark_surface_scores_zero() {
        let img = uniform(200, 200, 5);
        let surface = analyze_surface(&img).unwrap();
        assert_eq!(surface.damage_percentage, 100.0);
        assert_eq!(surface.score, 0.0);
        assert_eq!(surface.grade, GradeLabel::Poor);
    }

    #[test]
    fn tiny_image_still_scores() {
        let img = uniform(3, 3, 128);
        assert_eq!(analyze_corners(&img).unwrap().average_score, 10.0);
        assert_eq!(analyze_surface(&img).unwrap().score, 10.0);
    }

    #[test]
    fn degraded_corner_analysis_omits_regions_in_json() {
        let value = serde_json::to_value(CornerAnalysis::degraded()).unwrap();
        assert!(value.get("corners").is_none());
        assert_eq!(value["averageScore"], 5.0);
        assert_eq!(value["grade"], "Unknown");
    }
}
