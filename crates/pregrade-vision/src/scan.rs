// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid scanning for the pixel-rule defect detectors.
//
// A `ScanDescriptor` names a preprocessing step, a sampling stride, a pixel
// rule, and a severity model. `scan` samples the (preprocessed) image on the
// stride grid and records a cell for every pixel the rule fires on.

use std::borrow::Cow;

use image::Rgba;
use imageproc::filter::{filter3x3, gaussian_blur_f32};
use pregrade_core::error::PregradeError;
use pregrade_core::{LocatedRegion, Region};
use tracing::debug;

use crate::raster::{brightness, GrayF32, RasterImage};

/// 8-neighbour Laplacian.
const K_LAPLACIAN: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Transform applied to a private copy before scanning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preprocess {
    None,
    /// Luma, then the clamped 8-neighbour Laplacian response.
    Laplacian,
    /// Luma, then a Gaussian blur of the given sigma.
    GaussianBlur(f32),
    /// Luma only.
    Grayscale,
}

impl Preprocess {
    pub fn apply<'a>(&self, image: &'a RasterImage) -> Result<Cow<'a, RasterImage>, PregradeError> {
        let prepared = match self {
            Self::None => return Ok(Cow::Borrowed(image)),
            Self::Laplacian => {
                let gray = image.to_luma_f32();
                let response: GrayF32 = filter3x3(&gray, &K_LAPLACIAN);
                RasterImage::from_gray_f32(&response)?
            }
            Self::GaussianBlur(sigma) => {
                let blurred = gaussian_blur_f32(&image.to_luma(), *sigma);
                RasterImage::from_gray(&blurred)?
            }
            Self::Grayscale => RasterImage::from_gray(&image.to_luma())?,
        };
        Ok(Cow::Owned(prepared))
    }
}

/// Predicate on a single pixel. Returns the rule's confidence when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelRule {
    /// Brightness above the threshold; confidence `b / 255`.
    BrighterThan(f64),
    /// Brightness below the threshold; confidence `(255 - b) / 255`.
    DarkerThan(f64),
    /// Brightness below `low` or above `high`; confidence `|b - 128| / 128`.
    OutsideBand { low: f64, high: f64 },
    /// `|r - g|` or `|g - b|` above the threshold; confidence is the larger
    /// difference over 255.
    ChannelDivergence(i16),
    /// Every colour channel above the threshold; confidence `(r+g+b) / 765`.
    NearWhite(u8),
}

impl PixelRule {
    pub fn evaluate(&self, pixel: Rgba<u8>) -> Option<f64> {
        match *self {
            Self::BrighterThan(t) => {
                let b = brightness(&pixel);
                (b > t).then_some(b / 255.0)
            }
            Self::DarkerThan(t) => {
                let b = brightness(&pixel);
                (b < t).then_some((255.0 - b) / 255.0)
            }
            Self::OutsideBand { low, high } => {
                let b = brightness(&pixel);
                (b < low || b > high).then_some((b - 128.0).abs() / 128.0)
            }
            Self::ChannelDivergence(t) => {
                let [r, g, b, _] = pixel.0.map(i16::from);
                let rg = (r - g).abs();
                let gb = (g - b).abs();
                (rg > t || gb > t).then_some(f64::from(rg.max(gb)) / 255.0)
            }
            Self::NearWhite(t) => {
                let [r, g, b, _] = pixel.0;
                (r > t && g > t && b > t)
                    .then_some((f64::from(r) + f64::from(g) + f64::from(b)) / 765.0)
            }
        }
    }
}

/// How a scan's hits become a 0–1 severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeverityModel {
    /// Mean confidence of the hits.
    MeanConfidence,
    /// `min(hits / (w·h / cell_area), 1)`.
    Density { cell_area: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanDescriptor {
    pub preprocess: Preprocess,
    pub stride: u32,
    /// Side of the square recorded for each hit.
    pub cell: u32,
    pub rule: PixelRule,
    pub severity: SeverityModel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub severity: f64,
    pub locations: Vec<LocatedRegion>,
}

pub fn mean_confidence(locations: &[LocatedRegion]) -> f64 {
    if locations.is_empty() {
        return 0.0;
    }
    locations.iter().map(|l| l.confidence).sum::<f64>() / locations.len() as f64
}

/// Run `descriptor` over `image`.
pub fn scan(image: &RasterImage, descriptor: &ScanDescriptor) -> Result<ScanOutcome, PregradeError> {
    let prepared = descriptor.preprocess.apply(image)?;
    let (w, h) = (prepared.width(), prepared.height());
    let stride = descriptor.stride.max(1) as usize;

    let mut locations = Vec::new();
    for y in (0..h).step_by(stride) {
        for x in (0..w).step_by(stride) {
            if let Some(confidence) = descriptor.rule.evaluate(prepared.pixel_in_bounds(x, y)) {
                let cell = Region::new(x, y, descriptor.cell, descriptor.cell).clamp_to(w, h);
                locations.push(LocatedRegion::new(cell, confidence));
            }
        }
    }

    let severity = match descriptor.severity {
        SeverityModel::MeanConfidence => mean_confidence(&locations),
        SeverityModel::Density { cell_area } => {
            let cells = f64::from(w) * f64::from(h) / cell_area;
            (locations.len() as f64 / cells).min(1.0)
        }
    };
    debug!(hits = locations.len(), severity, "grid scan complete");

    Ok(ScanOutcome {
        severity,
        locations,
    })
}
