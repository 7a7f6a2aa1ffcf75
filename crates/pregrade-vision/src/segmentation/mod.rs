// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Card segmentation: a fixed layout with per-segment readings and highlights,
// and the critical areas that exceed their wear or texture thresholds.

pub mod layout;
pub mod readings;

use image::Rgba;
use pregrade_core::error::PregradeError;
use pregrade_core::{DefectKind, Dimensions, Region};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::raster::{tint_region, RasterImage};
use crate::wear::{wear_severity, WearBand};

pub use layout::{CardLayout, NamedRegion, SegmentKind};
pub use readings::{
    CenterReading, ImageAreaReading, SurfaceReading, TextAreaReading, WearReading,
};

/// Corner and edge wear above this is a critical area.
pub const CRITICAL_WEAR: f64 = 0.5;
/// Surface texture variance above this is a critical area.
pub const CRITICAL_TEXTURE_VARIANCE: f64 = 1500.0;
/// Surface critical-area severity is `variance / this`, capped at 1.
pub const TEXTURE_SEVERITY_SCALE: f64 = 2000.0;
/// Solid frame drawn around each highlight.
pub const HIGHLIGHT_BORDER: u32 = 3;

// -- Records ----------------------------------------------------------------

/// One segment's region, reading, and optional highlight PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentReading<A> {
    pub name: String,
    pub segment: Region,
    pub analysis: A,
    #[serde(skip)]
    pub highlight: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentReadings {
    pub corners: Vec<SegmentReading<WearReading>>,
    pub edges: Vec<SegmentReading<WearReading>>,
    pub center: SegmentReading<CenterReading>,
    pub surface: Vec<SegmentReading<SurfaceReading>>,
    pub text_area: SegmentReading<TextAreaReading>,
    pub image_area: SegmentReading<ImageAreaReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalArea {
    #[serde(rename = "type")]
    pub kind: DefectKind,
    pub location: String,
    pub segment: Region,
    pub severity: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCounts {
    pub corners: usize,
    pub edges: usize,
    pub surface: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationMetadata {
    pub total_segments: usize,
    pub segment_types: Vec<SegmentKind>,
    pub image_dimensions: Dimensions,
    pub aspect_ratio: f64,
    pub segment_counts: SegmentCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationReport {
    pub dimensions: Dimensions,
    pub segments: CardLayout,
    pub highlights: SegmentReadings,
    pub critical_areas: Vec<CriticalArea>,
    pub metadata: SegmentationMetadata,
}

impl SegmentationReport {
    /// Every highlight PNG that was rendered, keyed `"{family}_{name}"`.
    pub fn highlight_images(&self) -> Vec<(String, &[u8])> {
        fn collect<'a, A>(
            family: SegmentKind,
            readings: impl IntoIterator<Item = &'a SegmentReading<A>>,
            out: &mut Vec<(String, &'a [u8])>,
        ) where
            A: 'a,
        {
            for reading in readings {
                if let Some(png) = &reading.highlight {
                    out.push((format!("{}_{}", family.as_str(), reading.name), png.as_slice()));
                }
            }
        }

        let h = &self.highlights;
        let mut out = Vec::new();
        collect(SegmentKind::Corners, &h.corners, &mut out);
        collect(SegmentKind::Edges, &h.edges, &mut out);
        collect(SegmentKind::Center, [&h.center], &mut out);
        collect(SegmentKind::Surface, &h.surface, &mut out);
        collect(SegmentKind::TextArea, [&h.text_area], &mut out);
        collect(SegmentKind::ImageArea, [&h.image_area], &mut out);
        out
    }
}

// -- Segmentation -----------------------------------------------------------

#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn segment_card(
    image: &RasterImage,
    render_highlights: bool,
) -> Result<SegmentationReport, PregradeError> {
    info!("segmentation starting");
    let (w, h) = (image.width(), image.height());
    let layout = CardLayout::for_size(w, h);
    let plane = image.brightness_plane();

    let reading = Reader {
        image,
        render_highlights,
    };

    let corners = layout
        .corners
        .iter()
        .map(|named| {
            let severity = wear_severity(image, named.region, WearBand::Corner)?;
            reading.read(SegmentKind::Corners, &named.name, named.region, WearReading::new(severity))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let edges = layout
        .edges
        .iter()
        .map(|named| {
            let severity = wear_severity(image, named.region, WearBand::Whole)?;
            reading.read(SegmentKind::Edges, &named.name, named.region, WearReading::new(severity))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let surface = layout
        .surface
        .iter()
        .map(|named| {
            let analysis = readings::read_surface(&plane.sub_plane(named.region));
            reading.read(SegmentKind::Surface, &named.name, named.region, analysis)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let readings = SegmentReadings {
        center: reading.read(
            SegmentKind::Center,
            "main",
            layout.center,
            readings::read_center(&plane.sub_plane(layout.center)),
        )?,
        text_area: reading.read(
            SegmentKind::TextArea,
            "main",
            layout.text_area,
            readings::read_text_area(&plane.sub_plane(layout.text_area)),
        )?,
        image_area: reading.read(
            SegmentKind::ImageArea,
            "main",
            layout.image_area,
            readings::read_image_area(&plane.sub_plane(layout.image_area)),
        )?,
        corners,
        edges,
        surface,
    };

    let critical_areas = critical_areas(&readings);
    debug!(critical = critical_areas.len(), "critical areas identified");

    let dimensions = image.dimensions();
    let metadata = SegmentationMetadata {
        total_segments: SegmentKind::ALL.len(),
        segment_types: SegmentKind::ALL.to_vec(),
        image_dimensions: dimensions,
        aspect_ratio: dimensions.aspect_ratio,
        segment_counts: SegmentCounts {
            corners: layout.corners.len(),
            edges: layout.edges.len(),
            surface: layout.surface.len(),
        },
    };

    info!(critical = critical_areas.len(), "segmentation complete");
    Ok(SegmentationReport {
        dimensions,
        segments: layout,
        highlights: readings,
        critical_areas,
        metadata,
    })
}

struct Reader<'a> {
    image: &'a RasterImage,
    render_highlights: bool,
}

impl Reader<'_> {
    fn read<A>(
        &self,
        kind: SegmentKind,
        name: &str,
        region: Region,
        analysis: A,
    ) -> Result<SegmentReading<A>, PregradeError> {
        let highlight = if self.render_highlights {
            Some(render_highlight(self.image, region, kind.color())?)
        } else {
            None
        };
        Ok(SegmentReading {
            name: name.to_string(),
            segment: region,
            analysis,
            highlight,
        })
    }
}

/// Corners, then edges, then surface cells, each in layout order.
pub fn critical_areas(readings: &SegmentReadings) -> Vec<CriticalArea> {
    let mut areas = Vec::new();

    for corner in readings.corners.iter().filter(|r| r.analysis.severity > CRITICAL_WEAR) {
        areas.push(CriticalArea {
            kind: DefectKind::CornerWear,
            location: corner.name.clone(),
            segment: corner.segment,
            severity: corner.analysis.severity,
            description: format!("Critical wear detected in {} corner", corner.name),
        });
    }

    for edge in readings.edges.iter().filter(|r| r.analysis.severity > CRITICAL_WEAR) {
        areas.push(CriticalArea {
            kind: DefectKind::EdgeWear,
            location: edge.name.clone(),
            segment: edge.segment,
            severity: edge.analysis.severity,
            description: format!("Critical wear detected on {} edge", edge.name),
        });
    }

    for cell in readings
        .surface
        .iter()
        .filter(|r| r.analysis.texture_variance > CRITICAL_TEXTURE_VARIANCE)
    {
        areas.push(CriticalArea {
            kind: DefectKind::SurfaceDamage,
            location: cell.name.clone(),
            segment: cell.segment,
            severity: (cell.analysis.texture_variance / TEXTURE_SEVERITY_SCALE).min(1.0),
            description: format!("Surface damage detected in {}", cell.name),
        });
    }

    areas
}

/// PNG of the crop tinted half-way towards `color` with a solid frame.
pub fn render_highlight(
    image: &RasterImage,
    region: Region,
    color: [u8; 3],
) -> Result<Vec<u8>, PregradeError> {
    let mut pixels = image.crop(region)?.into_rgba();
    let (w, h) = pixels.dimensions();
    tint_region(&mut pixels, Region::new(0, 0, w, h), color);

    let frame = Rgba([color[0], color[1], color[2], 255]);
    for (x, y, pixel) in pixels.enumerate_pixels_mut() {
        let in_frame = x < HIGHLIGHT_BORDER
            || y < HIGHLIGHT_BORDER
            || x + HIGHLIGHT_BORDER >= w
            || y + HIGHLIGHT_BORDER >= h;
        if in_frame {
            *pixel = frame;
        }
    }

    RasterImage::from_rgba(pixels)?.to_png_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn raster(img: RgbaImage) -> RasterImage {
        RasterImage::from_rgba(img).unwrap()
    }

    #[test]
    fn mid_gray_card_has_no_critical_areas() {
        let image = raster(RgbaImage::from_pixel(200, 280, Rgba([128, 128, 128, 255])));
        let report = segment_card(&image, false).unwrap();
        assert!(report.critical_areas.is_empty());
        assert_eq!(report.highlights.corners.len(), 4);
        assert_eq!(report.highlights.surface.len(), 9);
        assert_eq!(report.metadata.total_segments, 7);
        assert!(report.highlight_images().is_empty());
    }

    #[test]
    fn dark_corner_and_edge_become_critical() {
        let image = raster(RgbaImage::from_fn(200, 200, |x, y| {
            if x < 30 && y < 30 || y >= 190 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        }));
        let report = segment_card(&image, false).unwrap();
        let locations: Vec<_> = report.critical_areas.iter().map(|a| a.location.as_str()).collect();
        assert_eq!(locations, vec!["topLeft", "bottom"]);
        assert_eq!(report.critical_areas[0].kind, DefectKind::CornerWear);
        assert_eq!(
            report.critical_areas[0].description,
            "Critical wear detected in topLeft corner"
        );
        assert_eq!(report.critical_areas[1].kind, DefectKind::EdgeWear);

        // Corner bands start at the crop origin, mostly above the dark rows.
        let bottom_left = &report.highlights.corners[2].analysis;
        assert!(bottom_left.severity < CRITICAL_WEAR);
    }

    #[test]
    fn white_block_lowers_wear_instead_of_raising_it() {
        let mut pixels = RgbaImage::from_pixel(1000, 1400, Rgba([128, 128, 128, 255]));
        for y in 0..50 {
            for x in 0..50 {
                pixels.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let report = segment_card(&raster(pixels), false).unwrap();
        assert!(report.critical_areas.is_empty());
        let top_left = &report.highlights.corners[0].analysis;
        assert!(top_left.severity < 127.0 / 255.0);
    }

    #[test]
    fn rough_surface_cell_is_critical_with_capped_severity() {
        let image = raster(RgbaImage::from_fn(90, 90, |x, y| {
            let busy = x >= 30 && x < 60 && y >= 30 && y < 60;
            if busy && (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else if busy {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([128, 128, 128, 255])
            }
        }));
        let report = segment_card(&image, false).unwrap();
        let surface: Vec<_> = report
            .critical_areas
            .iter()
            .filter(|a| a.kind == DefectKind::SurfaceDamage)
            .collect();
        assert_eq!(surface.len(), 1);
        assert_eq!(surface[0].location, "surface_1_1");
        assert_eq!(surface[0].severity, 1.0);
    }

    #[test]
    fn highlights_render_when_requested() {
        let image = raster(RgbaImage::from_pixel(60, 84, Rgba([0, 0, 0, 255])));
        let report = segment_card(&image, true).unwrap();
        let images = report.highlight_images();
        // 4 corners, 4 edges, center, 9 surface cells, text, image.
        assert_eq!(images.len(), 20);
        assert!(images.iter().any(|(key, _)| key == "corners_topLeft"));

        let decoded = RasterImage::from_bytes(images[0].1).unwrap();
        assert_eq!(decoded.pixel_at(0, 0).unwrap(), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn highlights_are_not_serialised() {
        let image = raster(RgbaImage::from_pixel(30, 42, Rgba([90, 90, 90, 255])));
        let json = serde_json::to_value(segment_card(&image, true).unwrap()).unwrap();
        assert!(json["highlights"]["center"].get("highlight").is_none());
        assert_eq!(json["highlights"]["center"]["analysis"]["condition"], "Dark");
        assert_eq!(json["metadata"]["segmentTypes"][4], "textArea");
    }
}
