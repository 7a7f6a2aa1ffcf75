// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed card layout: where each segment sits for a given image size.

use pregrade_core::Region;
use serde::{Deserialize, Serialize};

use crate::border::Side;
use crate::wear::Corner;

pub const CORNER_SHARE: f64 = 0.15;
pub const EDGE_SHARE: f64 = 0.05;
pub const CENTER_SHARE: f64 = 0.6;
pub const BORDER_INSET_SHARE: f64 = 0.02;

/// Segment families, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Corners,
    Edges,
    Center,
    Surface,
    TextArea,
    ImageArea,
    Border,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 7] = [
        Self::Corners,
        Self::Edges,
        Self::Center,
        Self::Surface,
        Self::TextArea,
        Self::ImageArea,
        Self::Border,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corners => "corners",
            Self::Edges => "edges",
            Self::Center => "center",
            Self::Surface => "surface",
            Self::TextArea => "textArea",
            Self::ImageArea => "imageArea",
            Self::Border => "border",
        }
    }

    /// Highlight tint.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Corners => [255, 0, 0],
            Self::Edges => [0, 255, 0],
            Self::Center => [0, 0, 255],
            Self::Surface => [255, 255, 0],
            Self::TextArea => [255, 0, 255],
            Self::ImageArea => [0, 255, 255],
            Self::Border => [128, 128, 128],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRegion {
    pub name: String,
    #[serde(flatten)]
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLayout {
    pub corners: Vec<NamedRegion>,
    pub edges: Vec<NamedRegion>,
    pub center: Region,
    /// `surface_{row}_{col}`, row-major.
    pub surface: Vec<NamedRegion>,
    pub text_area: Region,
    pub image_area: Region,
    pub border: Region,
}

impl CardLayout {
    pub fn for_size(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let short = w.min(h);
        let px = |x: f64, y: f64, rw: f64, rh: f64| Region::from_pixels(width, height, x, y, rw, rh);

        let c = short * CORNER_SHARE;
        let corners = Corner::ALL
            .into_iter()
            .map(|corner| {
                let (x, y) = match corner {
                    Corner::TopLeft => (0.0, 0.0),
                    Corner::TopRight => (w - c, 0.0),
                    Corner::BottomLeft => (0.0, h - c),
                    Corner::BottomRight => (w - c, h - c),
                };
                NamedRegion {
                    name: corner.as_str().to_string(),
                    region: px(x, y, c, c),
                }
            })
            .collect();

        let t = short * EDGE_SHARE;
        let edges = Side::ALL
            .into_iter()
            .map(|side| {
                let region = match side {
                    Side::Top => px(0.0, 0.0, w, t),
                    Side::Bottom => px(0.0, h - t, w, t),
                    Side::Left => px(0.0, 0.0, t, h),
                    Side::Right => px(w - t, 0.0, t, h),
                };
                NamedRegion {
                    name: side.as_str().to_string(),
                    region,
                }
            })
            .collect();

        let s = short * CENTER_SHARE;
        let center = px((w - s) / 2.0, (h - s) / 2.0, s, s);

        let third = 1.0 / 3.0;
        let surface = (0..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .map(|(row, col)| NamedRegion {
                name: format!("surface_{row}_{col}"),
                region: Region::from_fractions(
                    width,
                    height,
                    f64::from(col) * third,
                    f64::from(row) * third,
                    third,
                    third,
                ),
            })
            .collect();

        let b = short * BORDER_INSET_SHARE;
        Self {
            corners,
            edges,
            center,
            surface,
            text_area: Region::from_fractions(width, height, 0.1, 0.7, 0.8, 0.25),
            image_area: Region::from_fractions(width, height, 0.1, 0.1, 0.8, 0.6),
            border: px(b, b, w - 2.0 * b, h - 2.0 * b),
        }
    }
}
