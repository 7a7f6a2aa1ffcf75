// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brightness plane and 4-neighbour stencils.
//
// Focus, noise, blur, texture, and the per-segment readings all walk the
// interior of an image comparing each pixel with its four direct neighbours.
// `BrightnessPlane` precomputes brightness once so those passes stay cheap.

use image::RgbaImage;
use pregrade_core::Region;

use crate::raster::brightness;

/// Row-major brightness values of an image.
#[derive(Debug, Clone)]
pub struct BrightnessPlane {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

/// A pixel and its left, right, up, and down neighbours.
#[derive(Debug, Clone, Copy)]
pub struct Stencil {
    pub center: f64,
    pub neighbours: [f64; 4],
}

impl Stencil {
    /// Largest absolute difference to a neighbour.
    pub fn max_diff(&self) -> f64 {
        self.neighbours
            .iter()
            .map(|n| (n - self.center).abs())
            .fold(0.0, f64::max)
    }

    pub fn neighbour_mean(&self) -> f64 {
        self.neighbours.iter().sum::<f64>() / 4.0
    }

    /// `|center - mean(neighbours)|`.
    pub fn mean_diff(&self) -> f64 {
        (self.center - self.neighbour_mean()).abs()
    }

    /// `4·center - Σ neighbours`.
    pub fn laplacian(&self) -> f64 {
        4.0 * self.center - self.neighbours.iter().sum::<f64>()
    }

    /// Mean squared difference to the neighbours.
    pub fn local_variance(&self) -> f64 {
        self.neighbours
            .iter()
            .map(|n| (n - self.center).powi(2))
            .sum::<f64>()
            / 4.0
    }
}

impl BrightnessPlane {
    pub fn from_rgba(pixels: &RgbaImage) -> Self {
        let values = pixels.pixels().map(brightness).collect();
        Self {
            width: pixels.width(),
            height: pixels.height(),
            values,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Brightness at `(x, y)`; `None` outside the plane.
    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        (x < self.width && y < self.height).then(|| self.values[self.index(x, y)])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Copy of the values inside `region`, clamped to the plane.
    pub fn sub_plane(&self, region: Region) -> Self {
        let safe = region.clamp_to(self.width, self.height);
        let mut values = Vec::with_capacity(safe.area() as usize);
        for y in safe.y..safe.bottom() {
            let row = self.index(safe.x, y);
            values.extend_from_slice(&self.values[row..row + safe.width as usize]);
        }
        Self {
            width: safe.width,
            height: safe.height,
            values,
        }
    }

    /// Stencils for every pixel with all four neighbours inside the plane.
    /// Planes narrower or shorter than 3 pixels have none.
    pub fn interior(&self) -> impl Iterator<Item = Stencil> + '_ {
        let (w, h) = (self.width, self.height);
        (1..h.saturating_sub(1)).flat_map(move |y| {
            (1..w.saturating_sub(1)).map(move |x| Stencil {
                center: self.values[self.index(x, y)],
                neighbours: [
                    self.values[self.index(x - 1, y)],
                    self.values[self.index(x + 1, y)],
                    self.values[self.index(x, y - 1)],
                    self.values[self.index(x, y + 1)],
                ],
            })
        })
    }

    /// Number of interior stencils.
    pub fn interior_len(&self) -> u64 {
        u64::from(self.width.saturating_sub(2)) * u64::from(self.height.saturating_sub(2))
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / self.values.len() as f64
    }

    /// Mean of `f` over the interior stencils; `None` when there are none.
    pub fn interior_mean(&self, f: impl Fn(&Stencil) -> f64) -> Option<f64> {
        let count = self.interior_len();
        if count == 0 {
            return None;
        }
        Some(self.interior().map(|s| f(&s)).sum::<f64>() / count as f64)
    }
}
