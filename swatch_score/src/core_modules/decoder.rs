// THEORY:
// The decoder is the bridge between "some bytes somebody uploaded" and a `Raster`.
// It sniffs the container format from the leading bytes, never from a file name or a
// MIME label, and decodes with hard limits so a tiny, hostile file cannot demand
// gigabytes of pixel memory.

use crate::core_modules::raster::Raster;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;
use thiserror::Error;

/// Bounds applied to every decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum width and maximum height, in pixels.
    pub max_image_dim: u32,
    /// Maximum bytes the decoder may allocate.
    pub max_alloc_bytes: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_image_dim: 12_000,
            max_alloc_bytes: 512 * 1024 * 1024, // 512 MiB
        }
    }
}

impl DecodeLimits {
    fn to_image_limits(self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_image_dim);
        limits.max_image_height = Some(self.max_image_dim);
        limits.max_alloc = Some(self.max_alloc_bytes);
        limits
    }
}

/// The bytes are not an image this build can decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("image: unknown format")]
    UnknownFormat,
    #[error("failed to read image data: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// A decoded image plus the format it was sniffed as.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedRaster {
    /// Lowercase format name, e.g. `png`.
    pub fn format_name(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("unknown")
    }
}

impl Raster for DecodedRaster {
    fn dimensions(&self) -> (u32, u32) {
        Raster::dimensions(&self.image)
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> [u16; 4] {
        self.image.sample(x, y)
    }
}

/// Sniffs and decodes `bytes` under `limits`.
pub fn decode_raster(bytes: &[u8], limits: &DecodeLimits) -> Result<DecodedRaster, DecodeError> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format().ok_or(DecodeError::UnknownFormat)?;
    reader.limits(limits.to_image_limits());
    let image = reader.decode()?;
    tracing::debug!(
        format = ?format,
        width = image.width(),
        height = image.height(),
        "decoded raster"
    );
    Ok(DecodedRaster { image, format })
}

const TEXT_SNIFF_LEN: usize = 512;

/// MIME type guessed from the leading bytes alone. Unrecognized bytes are text when
/// the first 512 hold no binary control bytes, octet-stream otherwise.
pub fn guess_mime_type(bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    let is_binary = |byte: &u8| matches!(byte, 0x00..=0x08 | 0x0b | 0x0e..=0x1a | 0x1c..=0x1f);
    if bytes.iter().take(TEXT_SNIFF_LEN).any(is_binary) {
        "application/octet-stream"
    } else {
        "text/plain; charset=utf-8"
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    /// Encodes `image` in memory with `format`.
    pub fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        let dynamic = match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
            _ => DynamicImage::ImageRgba8(image),
        };
        dynamic.write_to(&mut bytes, format).expect("encode fixture");
        bytes.into_inner()
    }

    pub fn png(image: RgbaImage) -> Vec<u8> {
        encode(image, ImageFormat::Png)
    }
}
