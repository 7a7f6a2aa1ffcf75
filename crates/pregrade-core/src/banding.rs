// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold banding shared by every scorer, detector, and quality metric.
//
// A `Bands` table is an ordered list of `(threshold, label)` tiers checked
// top to bottom; the first tier whose comparison holds wins, otherwise the
// fallback label is returned. All grade, impact, priority, and quality-tier
// tables in the workspace are expressed this way.

/// How a value is compared against each tier threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `value >= threshold`
    AtLeast,
    /// `value > threshold`
    Above,
    /// `value < threshold`
    Below,
}

impl Comparison {
    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => value >= threshold,
            Self::Above => value > threshold,
            Self::Below => value < threshold,
        }
    }
}

/// An ordered threshold table mapping a numeric signal onto a label.
#[derive(Debug, Clone, Copy)]
pub struct Bands<T: 'static> {
    comparison: Comparison,
    tiers: &'static [(f64, T)],
    otherwise: T,
}

impl<T: Copy + 'static> Bands<T> {
    pub const fn new(comparison: Comparison, tiers: &'static [(f64, T)], otherwise: T) -> Self {
        Self {
            comparison,
            tiers,
            otherwise,
        }
    }

    /// Label for `value`. NaN never satisfies a tier and falls through.
    pub fn classify(&self, value: f64) -> T {
        self.tiers
            .iter()
            .find(|(threshold, _)| self.comparison.holds(value, *threshold))
            .map(|(_, label)| *label)
            .unwrap_or(self.otherwise)
    }

    pub fn tiers(&self) -> &'static [(f64, T)] {
        self.tiers
    }
}
