use image::{Rgba, RgbaImage};
use pregrade_core::AnalysisConfig;
use pregrade_grading::{Submission, Upload};
use pregrade_vision::RasterImage;

pub const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A flat card-sized image of one colour.
pub fn uniform(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
    RgbaImage::from_pixel(width, height, pixel)
}

/// Paint a filled `size`x`size` square with its top-left corner at `(x, y)`.
pub fn paint_square(img: &mut RgbaImage, x: u32, y: u32, size: u32, pixel: Rgba<u8>) {
    for py in y..(y + size).min(img.height()) {
        for px in x..(x + size).min(img.width()) {
            img.put_pixel(px, py, pixel);
        }
    }
}

/// Mid-gray border of the given thickness around a white face. The border
/// sits inside the walk band, the face does not.
pub fn framed(width: u32, height: u32, top: u32, bottom: u32, left: u32, right: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = y >= top && y < height - bottom && x >= left && x < width - right;
        if inside { WHITE } else { GRAY }
    })
}

pub fn png(img: &RgbaImage) -> Vec<u8> {
    RasterImage::from_rgba(img.clone())
        .expect("non-empty test image")
        .to_png_bytes()
        .expect("PNG encoding")
}

pub fn upload(name: &str, img: &RgbaImage) -> Upload {
    Upload::from_bytes(name, png(img), Some("image/png"), 10 * 1024 * 1024).expect("valid upload")
}

pub fn submission(img: &RgbaImage) -> Submission {
    Submission::new(upload("front.png", img))
}

/// Defaults with stages evaluated in order, so failures are easy to read.
pub fn sequential_config() -> AnalysisConfig {
    AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    }
}
