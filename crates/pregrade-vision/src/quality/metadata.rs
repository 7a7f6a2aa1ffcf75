// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image metadata: size, colour statistics, texture statistics, and a
// sharpness/noise/blur quality score.

use pregrade_core::Dimensions;
use serde::{Deserialize, Serialize};

use crate::plane::BrightnessPlane;
use crate::raster::RasterImage;

/// A channel value is dominant when more than this share of pixels carry it.
pub const DOMINANT_SHARE: f64 = 0.1;
/// At most this many dominant values are reported.
pub const MAX_DOMINANT: usize = 5;
/// Neighbour difference above which a pixel counts towards edge density.
pub const TEXTURE_EDGE_DIFF: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    R,
    G,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub channel: Channel,
    pub value: u8,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorStats {
    pub average_brightness: f64,
    pub dominant_colors: Vec<DominantColor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureStats {
    pub texture_variance: f64,
    pub edge_density: f64,
    pub smoothness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub sharpness: f64,
    pub noise: f64,
    pub blur: f64,
    pub quality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub dimensions: Dimensions,
    pub total_pixels: u64,
    pub color_stats: ColorStats,
    pub texture_stats: TextureStats,
    pub quality_metrics: QualityMetrics,
}

pub fn extract_metadata(image: &RasterImage, plane: &BrightnessPlane) -> ImageMetadata {
    let dimensions = image.dimensions();
    ImageMetadata {
        dimensions,
        total_pixels: dimensions.total_pixels(),
        color_stats: color_stats(image, plane),
        texture_stats: texture_stats(plane),
        quality_metrics: quality_metrics(plane),
    }
}

pub fn color_stats(image: &RasterImage, plane: &BrightnessPlane) -> ColorStats {
    let mut histogram = [[0u64; 256]; 3];
    for pixel in image.as_rgba().pixels() {
        for (channel, counts) in histogram.iter_mut().enumerate() {
            counts[usize::from(pixel.0[channel])] += 1;
        }
    }
    ColorStats {
        average_brightness: plane.mean(),
        dominant_colors: dominant_colors(&histogram),
    }
}

fn dominant_colors(histogram: &[[u64; 256]; 3]) -> Vec<DominantColor> {
    let channels = [Channel::R, Channel::G, Channel::B];
    let mut dominant: Vec<DominantColor> = Vec::new();

    for (channel, counts) in channels.into_iter().zip(histogram) {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            continue;
        }
        for (value, &count) in counts.iter().enumerate() {
            let percentage = count as f64 / total as f64;
            if percentage > DOMINANT_SHARE {
                dominant.push(DominantColor {
                    channel,
                    value: value as u8,
                    percentage,
                });
            }
        }
    }

    // Stable sort keeps channel order among equal shares.
    dominant.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    dominant.truncate(MAX_DOMINANT);
    dominant
}

pub fn texture_stats(plane: &BrightnessPlane) -> TextureStats {
    TextureStats {
        texture_variance: plane.interior_mean(|s| s.local_variance()).unwrap_or(0.0),
        edge_density: plane
            .interior_mean(|s| f64::from(u8::from(s.max_diff() > TEXTURE_EDGE_DIFF)))
            .unwrap_or(0.0),
        smoothness: plane.interior_mean(|s| s.mean_diff()).unwrap_or(0.0),
    }
}

pub fn quality_metrics(plane: &BrightnessPlane) -> QualityMetrics {
    let sharpness = plane.interior_mean(|s| s.laplacian().abs()).unwrap_or(0.0);
    let noise = plane.interior_mean(|s| s.local_variance()).unwrap_or(0.0);
    let blur = plane.interior_mean(|s| s.mean_diff()).unwrap_or(0.0);
    QualityMetrics {
        sharpness,
        noise,
        blur,
        quality_score: quality_score(sharpness, noise, blur),
    }
}

/// `0.4·min(sharpness/100, 1) + 0.3·max(0, 1 - noise/1000) + 0.3·max(0, 1 - blur/50)`.
pub fn quality_score(sharpness: f64, noise: f64, blur: f64) -> f64 {
    let sharp = (sharpness / 100.0).min(1.0);
    let quiet = (1.0 - noise / 1000.0).max(0.0);
    let crisp = (1.0 - blur / 50.0).max(0.0);
    sharp * 0.4 + quiet * 0.3 + crisp * 0.3
}
