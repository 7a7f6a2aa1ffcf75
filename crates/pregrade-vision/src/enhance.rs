// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement previews. Each variant is computed on a private copy of the
// card image and never feeds back into scoring.

use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::filter::{filter3x3, gaussian_blur_f32};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::raster::{brightness, GrayF32, RasterImage};

/// Contrast factor of the HDR preview (`factor·(c - 128) + 128`).
pub const HDR_CONTRAST: f32 = 1.5;
/// Share of the remaining headroom added by the HDR brightness lift.
pub const HDR_LIFT: f32 = 0.1;
/// Colour distance scale of the edge-preserving denoise weights.
pub const DENOISE_SCALE: f64 = 50.0;
pub const CONTRAST_BLOCK: u32 = 8;
pub const CONTRAST_CLIP_LIMIT: f64 = 3.0;
pub const EDGE_SIGMA: f32 = 1.0;
/// Sobel magnitude above which a pixel is an edge.
pub const EDGE_THRESHOLD: f32 = 50.0;

const K_SHARPEN_WIDE: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];
const K_SHARPEN_FINE: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
const K_SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const K_SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Enhancement {
    Hdr,
    Sharpened,
    Denoised,
    ContrastEnhanced,
    EdgeMap,
    ColorCorrected,
}

impl Enhancement {
    pub const ALL: [Enhancement; 6] = [
        Self::Hdr,
        Self::Sharpened,
        Self::Denoised,
        Self::ContrastEnhanced,
        Self::EdgeMap,
        Self::ColorCorrected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hdr => "hdr",
            Self::Sharpened => "sharpened",
            Self::Denoised => "denoised",
            Self::ContrastEnhanced => "contrastEnhanced",
            Self::EdgeMap => "edgeMap",
            Self::ColorCorrected => "colorCorrected",
        }
    }

    pub fn apply(&self, image: &RasterImage) -> RgbaImage {
        let src = image.as_rgba();
        match self {
            Self::Hdr => hdr(src),
            Self::Sharpened => sharpen(src),
            Self::Denoised => denoise(src),
            Self::ContrastEnhanced => block_contrast(src),
            Self::EdgeMap => edge_map(image),
            Self::ColorCorrected => gray_world(src),
        }
    }
}

/// One preview and a couple of numbers describing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedVariant {
    pub kind: Enhancement,
    pub average_brightness: f64,
    /// Share of pixels whose colour differs from the source.
    pub changed_share: f64,
    /// Always present on a fresh run; `None` once read back from JSON.
    #[serde(skip)]
    pub image: Option<RasterImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enhanced {
    pub variants: Vec<EnhancedVariant>,
}

impl Enhanced {
    pub fn variant(&self, kind: Enhancement) -> Option<&EnhancedVariant> {
        self.variants.iter().find(|v| v.kind == kind)
    }
}

#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn enhance_card(image: &RasterImage, parallel: bool) -> Enhanced {
    info!("enhancement previews starting");

    let build = |kind: &Enhancement| {
        let pixels = kind.apply(image);
        let total = (u64::from(pixels.width()) * u64::from(pixels.height())).max(1) as f64;
        let average_brightness = pixels.pixels().map(brightness).sum::<f64>() / total;
        let changed = pixels
            .pixels()
            .zip(image.as_rgba().pixels())
            .filter(|(a, b)| a.0[..3] != b.0[..3])
            .count();
        debug!(kind = kind.as_str(), average_brightness, "preview rendered");
        EnhancedVariant {
            kind: *kind,
            average_brightness,
            changed_share: changed as f64 / total,
            image: Some(image.with_same_frame(pixels)),
        }
    };

    let variants = if parallel {
        Enhancement::ALL.par_iter().map(build).collect()
    } else {
        Enhancement::ALL.iter().map(build).collect()
    };
    info!("enhancement previews complete");
    Enhanced { variants }
}

// -- Variants ---------------------------------------------------------------

/// Contrast boost, brightness lift, then the Reinhard curve `v / (1 + v/255)`.
fn hdr(src: &RgbaImage) -> RgbaImage {
    ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
        let Rgba([r, g, b, a]) = *src.get_pixel(x, y);
        let map = |channel: u8| -> u8 {
            let contrasted = (HDR_CONTRAST * (f32::from(channel) - 128.0) + 128.0).clamp(0.0, 255.0);
            let lifted = contrasted + (255.0 - contrasted) * HDR_LIFT;
            let mapped = lifted / (1.0 + lifted / 255.0);
            mapped.round().clamp(0.0, 255.0) as u8
        };
        Rgba([map(r), map(g), map(b), a])
    })
}

fn sharpen(src: &RgbaImage) -> RgbaImage {
    let wide: RgbaImage = filter3x3(src, &K_SHARPEN_WIDE);
    let fine: RgbaImage = filter3x3(&wide, &K_SHARPEN_FINE);
    // Restore alpha; the kernels only target colour.
    ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
        let Rgba([r, g, b, _]) = *fine.get_pixel(x, y);
        Rgba([r, g, b, src.get_pixel(x, y).0[3]])
    })
}

/// 3×3 weighted mean with weights `exp(-Σ|Δrgb| / 50)`. Border pixels keep
/// their values.
fn denoise(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut out = src.clone();
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let center = src.get_pixel(x, y).0;
            let mut total_weight = 0.0;
            let mut acc = [0.0f64; 3];
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    let n = src.get_pixel(nx, ny).0;
                    let diff: u32 = (0..3).map(|c| u32::from(center[c].abs_diff(n[c]))).sum();
                    let weight = (-f64::from(diff) / DENOISE_SCALE).exp();
                    total_weight += weight;
                    for c in 0..3 {
                        acc[c] += f64::from(n[c]) * weight;
                    }
                }
            }
            let smoothed = acc.map(|v| (v / total_weight).round().clamp(0.0, 255.0) as u8);
            out.put_pixel(x, y, Rgba([smoothed[0], smoothed[1], smoothed[2], center[3]]));
        }
    }
    out
}

/// Per 8×8 block, map every channel through the block's clipped cumulative
/// brightness histogram.
fn block_contrast(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut out = src.clone();
    for by in (0..h).step_by(CONTRAST_BLOCK as usize) {
        for bx in (0..w).step_by(CONTRAST_BLOCK as usize) {
            let bw = CONTRAST_BLOCK.min(w - bx);
            let bh = CONTRAST_BLOCK.min(h - by);

            let mut histogram = [0u32; 256];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    let level = brightness(src.get_pixel(x, y)).round() as usize;
                    histogram[level.min(255)] += 1;
                }
            }

            let average = f64::from(bw * bh) / 256.0;
            let clip = CONTRAST_CLIP_LIMIT * average;
            let mut lookup = [0u8; 256];
            let mut cumulative = 0.0;
            for (level, &count) in histogram.iter().enumerate() {
                cumulative += f64::from(count).min(clip);
                lookup[level] = (cumulative / (clip * 256.0) * 255.0).round().clamp(0.0, 255.0) as u8;
            }

            for y in by..by + bh {
                for x in bx..bx + bw {
                    let p = out.get_pixel_mut(x, y);
                    for c in 0..3 {
                        p.0[c] = lookup[usize::from(p.0[c])];
                    }
                }
            }
        }
    }
    out
}

/// Gaussian-smoothed luma, Sobel magnitude, thresholded to white on black.
fn edge_map(image: &RasterImage) -> RgbaImage {
    let blurred: GrayF32 = gaussian_blur_f32(&image.to_luma_f32(), EDGE_SIGMA);
    let gx: GrayF32 = filter3x3(&blurred, &K_SOBEL_X);
    let gy: GrayF32 = filter3x3(&blurred, &K_SOBEL_Y);
    ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let (dx, dy) = (gx.get_pixel(x, y).0[0], gy.get_pixel(x, y).0[0]);
        if (dx * dx + dy * dy).sqrt() > EDGE_THRESHOLD {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

/// Gray-world white balance: scale each channel so its mean matches the
/// mean of all three. Channels with zero mean are left alone.
fn gray_world(src: &RgbaImage) -> RgbaImage {
    let total = (u64::from(src.width()) * u64::from(src.height())).max(1) as f64;
    let mut sums = [0.0f64; 3];
    for p in src.pixels() {
        for c in 0..3 {
            sums[c] += f64::from(p.0[c]);
        }
    }
    let means = sums.map(|s| s / total);
    let gray = means.iter().sum::<f64>() / 3.0;
    let factors = means.map(|m| if m > 0.0 { gray / m } else { 1.0 });

    ImageBuffer::from_fn(src.width(), src.height(), |x, y| {
        let Rgba([r, g, b, a]) = *src.get_pixel(x, y);
        let scale = |v: u8, c: usize| (f64::from(v) * factors[c]).round().clamp(0.0, 255.0) as u8;
        Rgba([scale(r, 0), scale(g, 1), scale(b, 2), a])
    })
}
