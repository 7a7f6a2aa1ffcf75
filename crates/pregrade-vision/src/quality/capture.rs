// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture conditions: focus and lighting.

use pregrade_core::banding::{Bands, Comparison};
use pregrade_core::Level;
use serde::{Deserialize, Serialize};

use crate::plane::BrightnessPlane;

/// Neighbour difference above which a pixel counts as an edge for focus.
pub const FOCUS_EDGE_DIFF: f64 = 20.0;

pub const FOCUS_BANDS: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(50.0, Level::High), (25.0, Level::Medium)],
    Level::Low,
);

pub const UNIFORMITY_BANDS: Bands<Level> = Bands::new(
    Comparison::Below,
    &[(1000.0, Level::High), (2000.0, Level::Medium)],
    Level::Low,
);

pub const OVEREXPOSED_ABOVE: f64 = 200.0;
pub const UNDEREXPOSED_BELOW: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusAnalysis {
    /// Mean max-neighbour difference over edge pixels.
    pub score: f64,
    pub edge_density: f64,
    pub quality: Level,
}

pub fn analyze_focus(plane: &BrightnessPlane) -> FocusAnalysis {
    let (total, edges) = plane
        .interior()
        .map(|s| s.max_diff())
        .filter(|&diff| diff > FOCUS_EDGE_DIFF)
        .fold((0.0, 0u64), |(sum, n), diff| (sum + diff, n + 1));

    let score = if edges == 0 { 0.0 } else { total / edges as f64 };
    let pixels = plane.len().max(1) as f64;
    FocusAnalysis {
        score,
        edge_density: edges as f64 / pixels,
        quality: FOCUS_BANDS.classify(score),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exposure {
    Overexposed,
    Underexposed,
    Good,
}

impl Exposure {
    pub fn from_mean(mean: f64) -> Self {
        if mean > OVEREXPOSED_ABOVE {
            Self::Overexposed
        } else if mean < UNDEREXPOSED_BELOW {
            Self::Underexposed
        } else {
            Self::Good
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingAnalysis {
    pub average_brightness: f64,
    pub variance: f64,
    pub uniformity: Level,
    pub exposure: Exposure,
}

impl LightingAnalysis {
    /// Well exposed and not strongly uneven.
    pub fn is_good(&self) -> bool {
        self.exposure == Exposure::Good && self.uniformity != Level::Low
    }
}

pub fn analyze_lighting(plane: &BrightnessPlane) -> LightingAnalysis {
    let average_brightness = plane.mean();
    let variance = plane.variance();
    LightingAnalysis {
        average_brightness,
        variance,
        uniformity: UNIFORMITY_BANDS.classify(variance),
        exposure: Exposure::from_mean(average_brightness),
    }
}
