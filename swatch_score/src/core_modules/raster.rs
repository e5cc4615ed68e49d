// THEORY:
// A `Raster` is the only view of a decoded image the sampler ever gets: a width, a
// height, and a way to read one pixel as four 16-bit channels. Decoders produce many
// concrete pixel layouts (8-bit RGBA, 16-bit grayscale, float RGB, ...). Rather than
// teaching the sampler about each of them, every layout is adapted into the same
// 16-bit RGBA sample here, once, at the edge.
//
// Widening rules:
// - 8-bit channels are multiplied by 257, so 0xff becomes exactly 0xffff.
// - 16-bit channels pass through.
// - float channels are clamped to [0, 1] and scaled to 65535.
// Color channels are then premultiplied by alpha (`c * a / 0xffff`, truncating), so a
// half transparent white reads as 0x8080. A layout without alpha reports full opacity.

use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel, Primitive};
use std::ops::Deref;

pub type Sample = u16;

/// One pixel read out of a raster: `[red, green, blue, alpha]`.
pub type Rgba16 = [Sample; 4];

pub const SAMPLE_MAX: Sample = Sample::MAX;

/// Scales straight color channels by their alpha.
#[inline]
pub fn premultiply([red, green, blue, alpha]: Rgba16) -> Rgba16 {
    let scale =
        |channel: Sample| (u32::from(channel) * u32::from(alpha) / u32::from(SAMPLE_MAX)) as Sample;
    [scale(red), scale(green), scale(blue), alpha]
}

/// A read-only, origin-anchored grid of RGBA samples.
pub trait Raster {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Reads the pixel at `(x, y)`. Callers keep coordinates inside `dimensions()`.
    fn sample(&self, x: u32, y: u32) -> Rgba16;
}

/// Widens a decoder subpixel into the 16-bit sample range.
pub trait ToSample: Primitive {
    fn to_sample(self) -> Sample;
}

impl ToSample for u8 {
    #[inline]
    fn to_sample(self) -> Sample {
        Sample::from(self) * 257
    }
}

impl ToSample for u16 {
    #[inline]
    fn to_sample(self) -> Sample {
        self
    }
}

impl ToSample for f32 {
    #[inline]
    fn to_sample(self) -> Sample {
        if self.is_nan() {
            return 0;
        }
        (self.clamp(0.0, 1.0) * f32::from(SAMPLE_MAX)).round() as Sample
    }
}

impl<P, Container> Raster for ImageBuffer<P, Container>
where
    P: Pixel,
    P::Subpixel: ToSample,
    Container: Deref<Target = [P::Subpixel]>,
{
    fn dimensions(&self) -> (u32, u32) {
        ImageBuffer::dimensions(self)
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> Rgba16 {
        let rgba = self.get_pixel(x, y).to_rgba();
        let [red, green, blue, alpha] = rgba.0;
        premultiply([
            red.to_sample(),
            green.to_sample(),
            blue.to_sample(),
            alpha.to_sample(),
        ])
    }
}

impl Raster for DynamicImage {
    fn dimensions(&self) -> (u32, u32) {
        GenericImageView::dimensions(self)
    }

    fn sample(&self, x: u32, y: u32) -> Rgba16 {
        match self {
            DynamicImage::ImageLuma8(buffer) => buffer.sample(x, y),
            DynamicImage::ImageLumaA8(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgb8(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgba8(buffer) => buffer.sample(x, y),
            DynamicImage::ImageLuma16(buffer) => buffer.sample(x, y),
            DynamicImage::ImageLumaA16(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgb16(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgba16(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgb32F(buffer) => buffer.sample(x, y),
            DynamicImage::ImageRgba32F(buffer) => buffer.sample(x, y),
            // Layouts added to `image` later fall back to its own 8-bit conversion.
            other => {
                let [red, green, blue, alpha] = other.get_pixel(x, y).0;
                premultiply([
                    red.to_sample(),
                    green.to_sample(),
                    blue.to_sample(),
                    alpha.to_sample(),
                ])
            }
        }
    }
}
