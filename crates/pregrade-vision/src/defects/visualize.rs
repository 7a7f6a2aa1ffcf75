// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PNG overlays of each finding's located regions, tinted in the kind's colour.

use std::collections::BTreeMap;

use pregrade_core::error::PregradeError;
use pregrade_core::DefectKind;

use crate::raster::{tint_region, RasterImage};

use super::DefectFinding;

/// One PNG per finding that has locations. The source image is not touched.
pub fn render_visualizations(
    image: &RasterImage,
    findings: &[DefectFinding],
) -> Result<BTreeMap<DefectKind, Vec<u8>>, PregradeError> {
    let mut rendered = BTreeMap::new();
    for finding in findings.iter().filter(|f| !f.locations.is_empty()) {
        let mut overlay = image.as_rgba().clone();
        for location in &finding.locations {
            tint_region(&mut overlay, location.region, finding.kind.color());
        }
        let png = RasterImage::from_rgba(overlay)?.to_png_bytes()?;
        rendered.insert(finding.kind, png);
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pregrade_core::{LocatedRegion, Region};

    #[test]
    fn only_findings_with_locations_are_rendered() {
        let image = RasterImage::from_rgba(RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255])))
            .unwrap();
        let findings = vec![
            DefectFinding::new(
                DefectKind::Dents,
                1.0,
                vec![LocatedRegion::new(Region::new(0, 0, 5, 5), 1.0)],
            ),
            DefectFinding::new(DefectKind::Scratches, 0.0, Vec::new()),
        ];
        let rendered = render_visualizations(&image, &findings).unwrap();
        assert_eq!(rendered.keys().copied().collect::<Vec<_>>(), vec![DefectKind::Dents]);

        let decoded = RasterImage::from_bytes(&rendered[&DefectKind::Dents]).unwrap();
        assert_eq!(decoded.pixel_at(2, 2).unwrap(), Rgba([128, 83, 0, 255]));
        assert_eq!(decoded.pixel_at(10, 10).unwrap(), Rgba([0, 0, 0, 255]));
        // Source untouched.
        assert_eq!(image.pixel_at(2, 2).unwrap(), Rgba([0, 0, 0, 255]));
    }
}
