/// Render a resolved source rectangle into the final cropped PNG.

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

use super::frame::{ImageDims, TargetSize};
use super::resolver::SourceRect;
use crate::error::{CropError, Result};
use crate::media::thumbnail::{self, Thumbnail};

/// Output of one crop
#[derive(Debug, Clone)]
pub struct RenderedCrop {
    /// PNG bytes
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Small preview for the processed strip
    pub preview: Thumbnail,
}

#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    supersample: u32,
    thumbnail_size: u32,
}

impl Rasterizer {
    pub fn new(supersample: u32, thumbnail_size: u32) -> Self {
        Self {
            supersample: supersample.max(1),
            thumbnail_size,
        }
    }

    pub fn supersample(&self) -> u32 {
        self.supersample
    }

    /// Crop `rect` out of `source` and resample it to target × supersample.
    pub fn render(&self, source: &DynamicImage, rect: SourceRect, target: TargetSize) -> Result<RenderedCrop> {
        let (source_w, source_h) = source.dimensions();
        let px = rect.to_pixels(ImageDims::new(source_w, source_h));
        let (width, height) = target
            .scaled(self.supersample)
            .ok_or_else(|| CropError::Encode(format!("supersample {} is too large", self.supersample)))?;

        let output = source
            .crop_imm(px.x, px.y, px.width, px.height)
            .resize_exact(width, height, FilterType::Lanczos3);

        let png = encode_png(&output)?;
        let preview = thumbnail::make_thumbnail(&output, self.thumbnail_size);

        Ok(RenderedCrop {
            png,
            width,
            height,
            preview,
        })
    }
}

/// Lossless encode
fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| CropError::Encode(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::frame::{CONTENT_TARGET, COVER_TARGET};
    use image::{Rgb, RgbImage};

    /// Left half red, right half blue
    fn split_image(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_output_is_supersampled_png() {
        let raster = Rasterizer::new(2, 64);
        let source = split_image(800, 600);
        let rect = SourceRect { x: 0.0, y: 0.0, width: 800.0, height: 571.4 };

        let out = raster.render(&source, rect, CONTENT_TARGET).unwrap();

        assert_eq!((out.width, out.height), (840, 600));
        assert_eq!(&out.png[1..4], b"PNG");
        let decoded = image::load_from_memory(&out.png).unwrap();
        assert_eq!(decoded.dimensions(), (840, 600));
        assert!(out.preview.width <= 64 && out.preview.height <= 64);
    }

    #[test]
    fn test_samples_the_requested_region() {
        let raster = Rasterizer::new(1, 32);
        let source = split_image(1000, 400);
        // Right quarter only: must come out blue
        let rect = SourceRect { x: 700.0, y: 0.0, width: 300.0, height: 132.0 };

        let out = raster.render(&source, rect, COVER_TARGET).unwrap();
        let decoded = image::load_from_memory(&out.png).unwrap().to_rgb8();

        let center = decoded.get_pixel(out.width / 2, out.height / 2);
        assert!(center[2] > 200 && center[0] < 50, "expected blue, got {center:?}");
    }

    #[test]
    fn test_oversized_supersample_is_an_error() {
        let raster = Rasterizer::new(10_000_000, 32);
        let source = split_image(100, 50);
        let rect = SourceRect { x: 0.0, y: 0.0, width: 100.0, height: 44.0 };

        let result = raster.render(&source, rect, COVER_TARGET);

        assert!(matches!(result, Err(CropError::Encode(_))));
    }

    #[test]
    fn test_zero_supersample_is_promoted() {
        assert_eq!(Rasterizer::new(0, 32).supersample(), 1);
    }
}
