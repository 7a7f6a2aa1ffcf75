// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The eight detectors as data.
//
// Six are grid scans over a (possibly preprocessed) copy of the image. Corner
// and edge wear crop fixed regions and average their darkness: corners over
// the origin-relative wear band, edge strips over the whole strip.

use pregrade_core::error::PregradeError;
use pregrade_core::{DefectKind, LocatedRegion, Region};
use tracing::{debug, instrument};

use crate::border::Side;
use crate::raster::RasterImage;
use crate::scan::{mean_confidence, scan, PixelRule, Preprocess, ScanDescriptor, SeverityModel};
use crate::wear::{wear_severity, Corner, WearBand};

use super::DefectFinding;

/// A wear crop is reported only above this severity. Mid-gray card stock
/// sits at 127/255 and stays below it.
pub const WEAR_REPORT_THRESHOLD: f64 = 0.5;

/// Corner wear crops are this share of each dimension.
pub const CORNER_FRACTION: f64 = 0.15;
/// Edge wear strips are this share of the perpendicular dimension.
pub const EDGE_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detector {
    Scan(DefectKind, ScanDescriptor),
    CornerWear,
    EdgeWear,
}

pub const DETECTORS: [Detector; 8] = [
    Detector::Scan(
        DefectKind::Scratches,
        ScanDescriptor {
            preprocess: Preprocess::Laplacian,
            stride: 10,
            cell: 10,
            rule: PixelRule::BrighterThan(200.0),
            severity: SeverityModel::MeanConfidence,
        },
    ),
    Detector::Scan(
        DefectKind::Dents,
        ScanDescriptor {
            preprocess: Preprocess::GaussianBlur(1.0),
            stride: 5,
            cell: 5,
            rule: PixelRule::DarkerThan(50.0),
            severity: SeverityModel::MeanConfidence,
        },
    ),
    Detector::CornerWear,
    Detector::EdgeWear,
    Detector::Scan(
        DefectKind::SurfaceDamage,
        ScanDescriptor {
            preprocess: Preprocess::Grayscale,
            stride: 5,
            cell: 5,
            rule: PixelRule::OutsideBand {
                low: 100.0,
                high: 200.0,
            },
            severity: SeverityModel::Density { cell_area: 25.0 },
        },
    ),
    Detector::Scan(
        DefectKind::Discoloration,
        ScanDescriptor {
            preprocess: Preprocess::None,
            stride: 10,
            cell: 10,
            rule: PixelRule::ChannelDivergence(50),
            severity: SeverityModel::MeanConfidence,
        },
    ),
    Detector::Scan(
        DefectKind::PrintingDefects,
        ScanDescriptor {
            preprocess: Preprocess::None,
            stride: 5,
            cell: 5,
            rule: PixelRule::OutsideBand {
                low: 30.0,
                high: 225.0,
            },
            severity: SeverityModel::MeanConfidence,
        },
    ),
    Detector::Scan(
        DefectKind::WaterDamage,
        ScanDescriptor {
            preprocess: Preprocess::None,
            stride: 10,
            cell: 10,
            rule: PixelRule::NearWhite(200),
            severity: SeverityModel::MeanConfidence,
        },
    ),
];

impl Detector {
    pub fn kind(&self) -> DefectKind {
        match self {
            Self::Scan(kind, _) => *kind,
            Self::CornerWear => DefectKind::CornerWear,
            Self::EdgeWear => DefectKind::EdgeWear,
        }
    }

    #[instrument(skip(self, image), fields(kind = %self.kind()))]
    pub fn detect(&self, image: &RasterImage) -> Result<DefectFinding, PregradeError> {
        let (severity, locations) = match self {
            Self::Scan(_, descriptor) => {
                let outcome = scan(image, descriptor)?;
                (outcome.severity, outcome.locations)
            }
            Self::CornerWear => worn_crops(image, corner_crops(image), WearBand::Corner)?,
            Self::EdgeWear => worn_crops(image, edge_crops(image), WearBand::Whole)?,
        };
        debug!(severity, locations = locations.len(), "detector finished");
        Ok(DefectFinding::new(self.kind(), severity, locations))
    }
}

fn corner_crops(image: &RasterImage) -> Vec<Region> {
    let (w, h) = (image.width(), image.height());
    let far = 1.0 - CORNER_FRACTION;
    Corner::ALL
        .into_iter()
        .map(|corner| {
            let (fx, fy) = match corner {
                Corner::TopLeft => (0.0, 0.0),
                Corner::TopRight => (far, 0.0),
                Corner::BottomLeft => (0.0, far),
                Corner::BottomRight => (far, far),
            };
            Region::from_fractions(w, h, fx, fy, CORNER_FRACTION, CORNER_FRACTION)
        })
        .collect()
}

fn edge_crops(image: &RasterImage) -> Vec<Region> {
    let (w, h) = (image.width(), image.height());
    let far = 1.0 - EDGE_FRACTION;
    Side::ALL
        .into_iter()
        .map(|side| match side {
            Side::Top => Region::from_fractions(w, h, 0.0, 0.0, 1.0, EDGE_FRACTION),
            Side::Bottom => Region::from_fractions(w, h, 0.0, far, 1.0, EDGE_FRACTION),
            Side::Left => Region::from_fractions(w, h, 0.0, 0.0, EDGE_FRACTION, 1.0),
            Side::Right => Region::from_fractions(w, h, far, 0.0, EDGE_FRACTION, 1.0),
        })
        .collect()
}

/// Crops whose wear exceeds the report threshold, each located at its whole
/// crop with confidence equal to its severity. Severity is their mean.
fn worn_crops(
    image: &RasterImage,
    crops: Vec<Region>,
    band: WearBand,
) -> Result<(f64, Vec<LocatedRegion>), PregradeError> {
    let mut locations = Vec::new();
    for region in crops {
        let severity = wear_severity(image, region, band)?;
        if severity > WEAR_REPORT_THRESHOLD {
            locations.push(LocatedRegion::new(region, severity));
        }
    }
    Ok((mean_confidence(&locations), locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn raster(img: RgbaImage) -> RasterImage {
        RasterImage::from_rgba(img).unwrap()
    }

    #[test]
    fn every_kind_has_exactly_one_detector() {
        let mut kinds: Vec<_> = DETECTORS.iter().map(Detector::kind).collect();
        kinds.sort();
        assert_eq!(kinds, DefectKind::ALL.to_vec());
    }

    #[test]
    fn uniform_gray_fires_no_detector() {
        let img = raster(RgbaImage::from_pixel(200, 280, Rgba([128, 128, 128, 255])));
        for detector in DETECTORS {
            let finding = detector.detect(&img).unwrap();
            assert!(finding.locations.is_empty(), "{:?} fired", finding.kind);
            assert_eq!(finding.severity, 0.0);
        }
    }

    #[test]
    fn dark_corner_reports_corner_wear() {
        let mut pixels = RgbaImage::from_pixel(200, 200, Rgba([128, 128, 128, 255]));
        for y in 170..200 {
            for x in 170..200 {
                pixels.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let finding = Detector::CornerWear.detect(&raster(pixels)).unwrap();
        assert_eq!(finding.locations.len(), 1);
        assert_eq!(finding.locations[0].region, Region::new(170, 170, 30, 30));
        assert!(finding.severity > 0.9);
    }

    #[test]
    fn corner_wear_reads_the_band_nearest_the_crop_origin() {
        // Bottom-right crop of a 100x100 card is (85, 85, 15, 15). Darken
        // only its first 5 rows and columns.
        let img = raster(RgbaImage::from_fn(100, 100, |x, y| {
            let in_crop = x >= 85 && y >= 85;
            if in_crop && (x < 90 || y < 90) {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        }));
        let finding = Detector::CornerWear.detect(&img).unwrap();
        assert_eq!(finding.locations.len(), 1);
        assert_eq!(finding.locations[0].region, Region::new(85, 85, 15, 15));
        assert!(finding.severity > 0.99);
    }

    #[test]
    fn edge_wear_averages_the_whole_strip() {
        // Bottom strip is 10 rows; 3 black rows read as 0.3 and stay quiet.
        let img = raster(RgbaImage::from_fn(100, 100, |_, y| {
            if y >= 97 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        }));
        let finding = Detector::EdgeWear.detect(&img).unwrap();
        assert!(finding.locations.is_empty());
        assert_eq!(finding.severity, 0.0);

        let bottom = Region::from_fractions(100, 100, 0.0, 0.9, 1.0, EDGE_FRACTION);
        let severity = wear_severity(&img, bottom, WearBand::Whole).unwrap();
        assert!((severity - 0.3).abs() < 1e-9);
    }

    #[test]
    fn red_patch_is_discoloration_not_water_damage() {
        let img = raster(RgbaImage::from_pixel(40, 40, Rgba([220, 60, 60, 255])));
        let discolored = DETECTORS[5].detect(&img).unwrap();
        assert_eq!(discolored.kind, DefectKind::Discoloration);
        assert_eq!(discolored.locations.len(), 16);
        let water = DETECTORS[7].detect(&img).unwrap();
        assert!(water.locations.is_empty());
    }
}
