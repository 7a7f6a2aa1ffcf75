// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Border measurement for centering.
//
// From nine points spread along each side, walk inward until the brightness
// leaves the [50, 200] band; the mean walk length is that side's border
// thickness. A walk that never leaves the band spans the whole image.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::raster::RasterImage;

/// Brightness below this ends a border walk.
pub const EDGE_DARK: f64 = 50.0;
/// Brightness above this ends a border walk.
pub const EDGE_BRIGHT: f64 = 200.0;
/// Sample points per side, at 10%, 20%, … 90% of the perpendicular axis.
pub const BORDER_SAMPLES: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Mean border thickness in pixels on `side`.
pub fn measure_border(image: &RasterImage, side: Side) -> f64 {
    let (w, h) = (image.width(), image.height());
    let along = match side {
        Side::Top | Side::Bottom => w,
        Side::Left | Side::Right => h,
    };

    let total: u64 = (1..=BORDER_SAMPLES)
        .map(|i| {
            let pos = sample_position(along, i);
            let (start, step) = match side {
                Side::Top => ((pos, 0), (0, 1)),
                Side::Bottom => ((pos, h - 1), (0, -1)),
                Side::Left => ((0, pos), (1, 0)),
                Side::Right => ((w - 1, pos), (-1, 0)),
            };
            u64::from(walk_distance(image, start, step))
        })
        .sum();

    let thickness = total as f64 / f64::from(BORDER_SAMPLES);
    debug!(side = side.as_str(), thickness, "border measured");
    thickness
}

/// Pixel index of the `i`-th tenth along an axis of length `len`.
fn sample_position(len: u32, i: u32) -> u32 {
    ((u64::from(len) * u64::from(i) / 10) as u32).min(len.saturating_sub(1))
}

/// Steps taken from `start` in direction `step` before brightness leaves the
/// border band or the walk leaves the image.
pub fn walk_distance(image: &RasterImage, start: (u32, u32), step: (i64, i64)) -> u32 {
    let (w, h) = (i64::from(image.width()), i64::from(image.height()));
    let (mut x, mut y) = (i64::from(start.0), i64::from(start.1));
    let mut distance = 0;

    while (0..w).contains(&x) && (0..h).contains(&y) {
        let b = image.brightness_in_bounds(x as u32, y as u32);
        if !(EDGE_DARK..=EDGE_BRIGHT).contains(&b) {
            break;
        }
        distance += 1;
        x += step.0;
        y += step.1;
    }
    distance
}
