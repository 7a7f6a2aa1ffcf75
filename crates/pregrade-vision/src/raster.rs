// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image: the decoded RGBA grid every analyzer samples from.
// Decoding, pixel lookup, brightness, cropping, and PNG encoding using the
// `image` crate.

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Rgba, RgbaImage};
use pregrade_core::error::PregradeError;
use pregrade_core::{Dimensions, Region};
use tracing::{debug, info, instrument};

use crate::plane::BrightnessPlane;

/// Single-channel `f32` image, the working format for convolution.
pub type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Mean of the three colour channels, alpha ignored.
pub fn brightness(pixel: &Rgba<u8>) -> f64 {
    let [r, g, b, _] = pixel.0;
    (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0
}

/// A decoded card photo.
///
/// Width and height are always non-zero. Analyzers only read from it;
/// anything that transforms pixels works on a [`Clone`], which is a deep copy.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PregradeError> {
        let img = image::open(path.as_ref()).map_err(|err| match err {
            image::ImageError::IoError(io_err) => PregradeError::Io(io_err),
            other => PregradeError::Decode(format!(
                "failed to decode {}: {}",
                path.as_ref().display(),
                other
            )),
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Self::from_dynamic(img)
    }

    /// Decode raw encoded bytes (JPEG, PNG, WebP).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PregradeError> {
        let img = image::load_from_memory(data)
            .map_err(|err| PregradeError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Self::from_dynamic(img)
    }

    pub fn from_dynamic(image: DynamicImage) -> Result<Self, PregradeError> {
        Self::from_rgba(image.to_rgba8())
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, PregradeError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(PregradeError::InvalidImage(format!(
                "image has no pixels ({}x{})",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    /// A raster holding `pixels`, which must share this image's frame. Used by
    /// filters that never change the frame size, so the non-empty check of
    /// [`from_rgba`](Self::from_rgba) already holds.
    pub(crate) fn with_same_frame(&self, pixels: RgbaImage) -> Self {
        debug_assert_eq!(pixels.dimensions(), self.pixels.dimensions());
        Self { pixels }
    }

    /// Build an RGBA raster from a grey plane, copying each value into
    /// R, G and B so that `brightness` reads it back unchanged.
    pub fn from_gray(gray: &GrayImage) -> Result<Self, PregradeError> {
        let pixels = RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            Rgba([v, v, v, 255])
        });
        Self::from_rgba(pixels)
    }

    /// As [`from_gray`](Self::from_gray), clamping `f32` values into `0..=255`.
    pub fn from_gray_f32(gray: &GrayF32) -> Result<Self, PregradeError> {
        let pixels = RgbaImage::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8;
            Rgba([v, v, v, 255])
        });
        Self::from_rgba(pixels)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width(), self.height())
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `OutOfBounds`.
    pub fn pixel_at(&self, x: u32, y: u32) -> Result<Rgba<u8>, PregradeError> {
        if x >= self.width() || y >= self.height() {
            return Err(PregradeError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(*self.pixels.get_pixel(x, y))
    }

    pub fn brightness_at(&self, x: u32, y: u32) -> Result<f64, PregradeError> {
        self.pixel_at(x, y).map(|p| brightness(&p))
    }

    /// Brightness for callers whose loop bounds already keep `(x, y)` inside
    /// the image.
    pub(crate) fn brightness_in_bounds(&self, x: u32, y: u32) -> f64 {
        brightness(self.pixels.get_pixel(x, y))
    }

    pub(crate) fn pixel_in_bounds(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    // -- Derived images -------------------------------------------------------

    /// Copy out a sub-rectangle. The region is clamped to the image; a region
    /// that clamps to nothing is an error.
    pub fn crop(&self, region: Region) -> Result<Self, PregradeError> {
        let safe = region.clamp_to(self.width(), self.height());
        if safe.is_empty() {
            return Err(PregradeError::EmptyRegion { stage: "crop" });
        }
        let cropped =
            image::imageops::crop_imm(&self.pixels, safe.x, safe.y, safe.width, safe.height)
                .to_image();
        Ok(Self { pixels: cropped })
    }

    /// Luma conversion via the `image` crate's Rec. 709 weights.
    pub fn to_luma(&self) -> GrayImage {
        DynamicImage::ImageRgba8(self.pixels.clone()).to_luma8()
    }

    pub fn to_luma_f32(&self) -> GrayF32 {
        let luma = self.to_luma();
        GrayF32::from_fn(luma.width(), luma.height(), |x, y| {
            Luma([f32::from(luma.get_pixel(x, y).0[0])])
        })
    }

    pub fn brightness_plane(&self) -> BrightnessPlane {
        BrightnessPlane::from_rgba(&self.pixels)
    }

    // -- Output ---------------------------------------------------------------

    pub fn to_png_bytes(&self) -> Result<Vec<u8>, PregradeError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| PregradeError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), PregradeError> {
        self.pixels.save(path.as_ref()).map_err(|err| {
            PregradeError::Encode(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Blend `tint` over every pixel of `region` at 50%, keeping alpha.
pub(crate) fn tint_region(pixels: &mut RgbaImage, region: Region, tint: [u8; 3]) {
    let safe = region.clamp_to(pixels.width(), pixels.height());
    for y in safe.y..safe.bottom() {
        for x in safe.x..safe.right() {
            let p = pixels.get_pixel_mut(x, y);
            for c in 0..3 {
                p.0[c] = ((u16::from(p.0[c]) + u16::from(tint[c]) + 1) / 2) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, value: u8) -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(
            width,
            height,
            Rgba([value, value, value, 255]),
        ))
        .unwrap()
    }

    #[test]
    fn brightness_is_channel_mean() {
        assert_eq!(brightness(&Rgba([30, 60, 90, 0])), 60.0);
    }

    #[test]
    fn pixel_at_rejects_out_of_bounds() {
        let img = gray(4, 3, 10);
        assert!(img.pixel_at(3, 2).is_ok());
        match img.pixel_at(4, 0) {
            Err(PregradeError::OutOfBounds { x: 4, width: 4, .. }) => {}
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn zero_sized_image_is_invalid() {
        assert!(RasterImage::from_rgba(RgbaImage::new(0, 5)).is_err());
    }

    #[test]
    fn same_frame_raster_keeps_the_new_pixels() {
        let img = gray(3, 2, 10);
        let derived = img.with_same_frame(RgbaImage::from_pixel(3, 2, Rgba([40, 40, 40, 255])));
        assert_eq!(derived.dimensions(), img.dimensions());
        assert_eq!(derived.brightness_in_bounds(2, 1), 40.0);
        assert_eq!(img.brightness_in_bounds(2, 1), 10.0);
    }

    #[test]
    fn clone_is_independent() {
        let original = gray(2, 2, 100);
        let mut copy = original.clone().into_rgba();
        copy.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        assert_eq!(original.brightness_at(0, 0).unwrap(), 100.0);
    }

    #[test]
    fn crop_clamps_to_image() {
        let img = gray(10, 10, 50);
        let cropped = img.crop(Region::new(8, 8, 5, 5)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
        assert!(img.crop(Region::new(10, 0, 3, 3)).is_err());
    }

    #[test]
    fn png_round_trip_keeps_dimensions() {
        let img = gray(7, 5, 200);
        let bytes = img.to_png_bytes().unwrap();
        let decoded = RasterImage::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), img.dimensions());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = RasterImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PregradeError::Decode(_)));
    }

    #[test]
    fn tint_blends_half_way() {
        let mut pixels = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        tint_region(&mut pixels, Region::new(0, 0, 1, 1), [200, 0, 100]);
        assert_eq!(pixels.get_pixel(0, 0).0, [150, 50, 100, 255]);
        assert_eq!(pixels.get_pixel(1, 1).0, [100, 100, 100, 255]);
    }
}
