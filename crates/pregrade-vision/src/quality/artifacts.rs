// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture artifacts: flat 8×8 blocks, impulse and gaussian noise, blur, and
// JPEG-style quantisation.

use pregrade_core::banding::{Bands, Comparison};
use pregrade_core::{Level, Region};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::plane::BrightnessPlane;
use crate::raster::RasterImage;

pub const BLOCK_SIZE: u32 = 8;
/// Blocks with brightness variance below this count as compression blocks.
pub const FLAT_BLOCK_VARIANCE: f64 = 100.0;

pub const BLOCK_SEVERITY: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(10.0, Level::High), (5.0, Level::Medium)],
    Level::Low,
);
pub const IMPULSE_SEVERITY: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(100.0, Level::High), (50.0, Level::Medium)],
    Level::Low,
);
pub const BLUR_SEVERITY: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(30.0, Level::High), (15.0, Level::Medium)],
    Level::Low,
);
pub const QUANTIZATION_SEVERITY: Bands<Level> = Bands::new(
    Comparison::Above,
    &[(1000.0, Level::High), (500.0, Level::Medium)],
    Level::Low,
);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionArtifacts {
    /// Flat blocks over the number of 8×8 blocks the image area holds.
    pub block_artifacts: f64,
    pub severity: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoisePatterns {
    pub salt_and_pepper: f64,
    pub gaussian_noise: f64,
    pub severity: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurReading {
    pub score: f64,
    pub severity: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JpegArtifacts {
    pub quantization_artifacts: f64,
    pub severity: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactAnalysis {
    pub compression: CompressionArtifacts,
    pub noise: NoisePatterns,
    pub blur: BlurReading,
    pub jpeg: JpegArtifacts,
}

pub fn detect_artifacts(image: &RasterImage, plane: &BrightnessPlane) -> ArtifactAnalysis {
    ArtifactAnalysis {
        compression: compression_artifacts(plane),
        noise: noise_patterns(plane),
        blur: blur_reading(plane),
        jpeg: jpeg_artifacts(image),
    }
}

/// Full 8×8 blocks on the 8-pixel grid, excluding any that touch the last
/// row or column.
pub fn compression_artifacts(plane: &BrightnessPlane) -> CompressionArtifacts {
    let (w, h) = (plane.width(), plane.height());
    let step = BLOCK_SIZE as usize;
    let mut flat = 0u64;
    for y in (0..h.saturating_sub(BLOCK_SIZE)).step_by(step) {
        for x in (0..w.saturating_sub(BLOCK_SIZE)).step_by(step) {
            let block = plane.sub_plane(Region::new(x, y, BLOCK_SIZE, BLOCK_SIZE));
            if block.variance() < FLAT_BLOCK_VARIANCE {
                flat += 1;
            }
        }
    }
    let capacity = (plane.len() as u64 / u64::from(BLOCK_SIZE * BLOCK_SIZE)).max(1);
    debug!(flat, capacity, "block artifact scan");
    CompressionArtifacts {
        block_artifacts: flat as f64 / capacity as f64,
        severity: BLOCK_SEVERITY.classify(flat as f64),
    }
}

pub fn noise_patterns(plane: &BrightnessPlane) -> NoisePatterns {
    let (mut impulse, mut gaussian) = (0u64, 0u64);
    for stencil in plane.interior() {
        let diff = stencil.mean_diff();
        if diff > 100.0 {
            impulse += 1;
        }
        if diff > 20.0 && diff < 50.0 {
            gaussian += 1;
        }
    }
    let pixels = plane.len().max(1) as f64;
    NoisePatterns {
        salt_and_pepper: impulse as f64 / pixels,
        gaussian_noise: gaussian as f64 / pixels,
        severity: IMPULSE_SEVERITY.classify(impulse as f64),
    }
}

pub fn blur_reading(plane: &BrightnessPlane) -> BlurReading {
    let score = plane.interior_mean(|s| s.mean_diff()).unwrap_or(0.0);
    BlurReading {
        score,
        severity: BLUR_SEVERITY.classify(score),
    }
}

/// Pixels whose three colour channels are all multiples of 8.
pub fn jpeg_artifacts(image: &RasterImage) -> JpegArtifacts {
    let pixels = image.as_rgba();
    let quantized = pixels
        .pixels()
        .filter(|p| p.0[..3].iter().all(|c| c % 8 == 0))
        .count();
    let total = (u64::from(pixels.width()) * u64::from(pixels.height())).max(1);
    JpegArtifacts {
        quantization_artifacts: quantized as f64 / total as f64,
        severity: QUANTIZATION_SEVERITY.classify(quantized as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn raster(img: RgbaImage) -> RasterImage {
        RasterImage::from_rgba(img).unwrap()
    }

    #[test]
    fn flat_image_is_all_blocks() {
        let image = raster(RgbaImage::from_pixel(33, 33, Rgba([128, 128, 128, 255])));
        let compression = compression_artifacts(&image.brightness_plane());
        // 4×4 blocks on the grid, 1089 / 64 = 17 block slots.
        assert_eq!(compression.block_artifacts, 16.0 / 17.0);
        assert_eq!(compression.severity, Level::High);
    }

    #[test]
    fn isolated_impulse_counts_as_salt_and_pepper() {
        let mut pixels = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        pixels.put_pixel(5, 5, Rgba([255, 255, 255, 255]));
        let noise = noise_patterns(&BrightnessPlane::from_rgba(&pixels));
        assert_eq!(noise.salt_and_pepper, 0.01);
        assert_eq!(noise.severity, Level::Low);
        // The four neighbours each see a mean difference of 63.75.
        assert_eq!(noise.gaussian_noise, 0.0);
    }

    #[test]
    fn quantised_colours_are_counted() {
        let image = raster(RgbaImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgba([8, 16, 24, 255])
            } else {
                Rgba([9, 16, 24, 255])
            }
        }));
        let jpeg = jpeg_artifacts(&image);
        assert_eq!(jpeg.quantization_artifacts, 0.5);
        assert_eq!(jpeg.severity, Level::Low);
    }

    #[test]
    fn blur_of_flat_image_is_zero() {
        let image = raster(RgbaImage::from_pixel(5, 5, Rgba([42, 42, 42, 255])));
        let blur = blur_reading(&image.brightness_plane());
        assert_eq!(blur.score, 0.0);
        assert_eq!(blur.severity, Level::Low);
    }
}
