// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-segment readings and their condition labels.

use pregrade_core::banding::{Bands, Comparison};
use pregrade_core::Rating;
use serde::{Deserialize, Serialize};

use crate::plane::BrightnessPlane;

pub const WEAR_CONDITION: Bands<Rating> = Bands::new(
    Comparison::Above,
    &[(0.7, Rating::Poor), (0.4, Rating::Fair)],
    Rating::Good,
);

pub const TONE_BANDS: Bands<Tone> = Bands::new(
    Comparison::Above,
    &[(200.0, Tone::Bright), (100.0, Tone::Normal)],
    Tone::Dark,
);

pub const TEXTURE_BANDS: Bands<Texture> = Bands::new(
    Comparison::Above,
    &[(1000.0, Texture::Rough), (500.0, Texture::Normal)],
    Texture::Smooth,
);

pub const READABILITY_BANDS: Bands<Rating> = Bands::new(
    Comparison::Above,
    &[(50.0, Rating::Good), (25.0, Rating::Fair)],
    Rating::Poor,
);

pub const SHARPNESS_BANDS: Bands<Sharpness> = Bands::new(
    Comparison::Above,
    &[(100.0, Sharpness::Sharp), (50.0, Sharpness::Normal)],
    Sharpness::Blurry,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Bright,
    Normal,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Texture {
    Rough,
    Normal,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sharpness {
    Sharp,
    Normal,
    Blurry,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WearReading {
    pub severity: f64,
    pub condition: Rating,
}

impl WearReading {
    pub fn new(severity: f64) -> Self {
        Self {
            severity,
            condition: WEAR_CONDITION.classify(severity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterReading {
    pub average_brightness: f64,
    pub condition: Tone,
}

pub fn read_center(plane: &BrightnessPlane) -> CenterReading {
    let average_brightness = plane.mean();
    CenterReading {
        average_brightness,
        condition: TONE_BANDS.classify(average_brightness),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceReading {
    pub texture_variance: f64,
    pub condition: Texture,
}

pub fn read_surface(plane: &BrightnessPlane) -> SurfaceReading {
    let texture_variance = plane.interior_mean(|s| s.local_variance()).unwrap_or(0.0);
    SurfaceReading {
        texture_variance,
        condition: TEXTURE_BANDS.classify(texture_variance),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAreaReading {
    pub average_contrast: f64,
    pub readability: Rating,
}

pub fn read_text_area(plane: &BrightnessPlane) -> TextAreaReading {
    let average_contrast = plane.interior_mean(|s| s.max_diff()).unwrap_or(0.0);
    TextAreaReading {
        average_contrast,
        readability: READABILITY_BANDS.classify(average_contrast),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAreaReading {
    pub average_sharpness: f64,
    pub quality: Sharpness,
}

pub fn read_image_area(plane: &BrightnessPlane) -> ImageAreaReading {
    let average_sharpness = plane.interior_mean(|s| s.laplacian().abs()).unwrap_or(0.0);
    ImageAreaReading {
        average_sharpness,
        quality: SHARPNESS_BANDS.classify(average_sharpness),
    }
}
