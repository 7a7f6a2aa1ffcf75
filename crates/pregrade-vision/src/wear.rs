// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wear severity: mean darkness `(255 - brightness) / 255` over a band of a
// crop. Bands are measured from the crop's own origin, whichever corner of the
// card the crop sits in.

use pregrade_core::error::PregradeError;
use pregrade_core::Region;
use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// Share of a corner crop, from its top and left sides, that counts as its
/// wear band.
pub const WEAR_BAND_FRACTION: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "topLeft",
            Self::TopRight => "topRight",
            Self::BottomLeft => "bottomLeft",
            Self::BottomRight => "bottomRight",
        }
    }
}

/// Which pixels of a crop are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WearBand {
    /// L-shaped band: pixels within the first 30% of the crop's width or
    /// height.
    Corner,
    /// Every pixel of the crop. Edge strips are read this way.
    Whole,
}

impl WearBand {
    fn includes(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        match self {
            Self::Whole => true,
            Self::Corner => {
                f64::from(x) < f64::from(width) * WEAR_BAND_FRACTION
                    || f64::from(y) < f64::from(height) * WEAR_BAND_FRACTION
            }
        }
    }
}

/// Wear severity in `[0, 1]` of `region`, averaged over `band`.
pub fn wear_severity(
    image: &RasterImage,
    region: Region,
    band: WearBand,
) -> Result<f64, PregradeError> {
    let safe = region.clamp_to(image.width(), image.height());
    let mut total = 0.0;
    let mut count = 0u64;

    for ly in 0..safe.height {
        for lx in 0..safe.width {
            if band.includes(lx, ly, safe.width, safe.height) {
                total += 255.0 - image.brightness_in_bounds(safe.x + lx, safe.y + ly);
                count += 1;
            }
        }
    }

    if count == 0 {
        return Err(PregradeError::EmptyRegion { stage: "wear" });
    }
    Ok((total / count as f64 / 255.0).min(1.0))
}
