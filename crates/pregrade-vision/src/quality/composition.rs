// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Composition: rule-of-thirds brightness grid, left/right balance, and
// horizontal mirror symmetry.

use pregrade_core::banding::{Bands, Comparison};
use pregrade_core::{Level, Rating, Region};
use serde::{Deserialize, Serialize};

use crate::plane::BrightnessPlane;
use crate::raster::RasterImage;

use super::metadata::TEXTURE_EDGE_DIFF;

pub const BALANCE_BANDS: Bands<Rating> = Bands::new(
    Comparison::Above,
    &[(0.8, Rating::Good), (0.6, Rating::Fair)],
    Rating::Poor,
);

pub const SYMMETRY_BANDS: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(0.8, Level::High), (0.6, Level::Medium)],
    Level::Low,
);

const THIRDS_NAMES: [[&str; 3]; 3] = [
    ["topLeft", "topCenter", "topRight"],
    ["centerLeft", "center", "centerRight"],
    ["bottomLeft", "bottomCenter", "bottomRight"],
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdsCell {
    pub name: String,
    pub average_brightness: f64,
    pub edge_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub score: f64,
    pub quality: Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Symmetry {
    pub score: f64,
    pub quality: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionAnalysis {
    /// Row-major, top-left first.
    pub rule_of_thirds: Vec<ThirdsCell>,
    pub balance: Balance,
    pub symmetry: Symmetry,
}

pub fn analyze_composition(image: &RasterImage, plane: &BrightnessPlane) -> CompositionAnalysis {
    let (w, h) = (image.width(), image.height());
    let third = 1.0 / 3.0;

    let mut cells = Vec::with_capacity(9);
    for (row, names) in THIRDS_NAMES.iter().enumerate() {
        for (col, name) in names.iter().enumerate() {
            let region =
                Region::from_fractions(w, h, col as f64 * third, row as f64 * third, third, third);
            let cell = plane.sub_plane(region);
            let edges = cell
                .interior()
                .filter(|s| s.max_diff() > TEXTURE_EDGE_DIFF)
                .count();
            cells.push(ThirdsCell {
                name: (*name).to_string(),
                average_brightness: cell.mean(),
                edge_density: edges as f64 / cell.len().max(1) as f64,
            });
        }
    }

    CompositionAnalysis {
        balance: balance(&cells),
        symmetry: symmetry(image),
        rule_of_thirds: cells,
    }
}

/// `1 - |mean(left column) - mean(right column)| / 255`.
fn balance(cells: &[ThirdsCell]) -> Balance {
    let column_mean = |col: usize| {
        cells
            .iter()
            .skip(col)
            .step_by(3)
            .map(|c| c.average_brightness)
            .sum::<f64>()
            / 3.0
    };
    let score = 1.0 - (column_mean(0) - column_mean(2)).abs() / 255.0;
    Balance {
        score,
        quality: BALANCE_BANDS.classify(score),
    }
}

/// Mean similarity of each pixel in the left half (middle column included)
/// with its mirror on the right, using summed RGB differences.
fn symmetry(image: &RasterImage) -> Symmetry {
    let pixels = image.as_rgba();
    let (w, h) = pixels.dimensions();
    let half = w.div_ceil(2);

    let mut total = 0.0;
    for y in 0..h {
        for x in 0..half {
            let left = pixels.get_pixel(x, y).0;
            let right = pixels.get_pixel(w - 1 - x, y).0;
            let diff: u32 = (0..3)
                .map(|c| u32::from(left[c].abs_diff(right[c])))
                .sum();
            total += 1.0 - f64::from(diff) / 765.0;
        }
    }

    let score = total / (f64::from(half) * f64::from(h));
    Symmetry {
        score,
        quality: SYMMETRY_BANDS.classify(score),
    }
}
