//! # Image Preparation
//!
//! Converts cropped page rasters into pixel data the PDF serializer can
//! embed directly. By default pixels are stored as RGB (plus a separate
//! alpha channel for SMask transparency when any pixel is not opaque) and
//! Flate-compressed by the writer. With a JPEG quality set, the RGB pixels
//! are re-encoded as JPEG and embedded with DCTDecode instead, which is much
//! smaller for scanned pages.

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage};

use crate::error::GridError;

/// A fully prepared image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// JPEG bytes — embed directly with DCTDecode.
    Jpeg { data: Vec<u8> },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// How page images are stored in the output PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Lossless RGB, Flate-compressed.
    #[default]
    Flate,
    /// Lossy JPEG at the given quality (1-100).
    Jpeg { quality: u8 },
}

impl LoadedImage {
    /// Prepare `image` for embedding. Returns `None` for zero-area images,
    /// which have nothing to draw.
    pub fn from_dynamic(
        image: &DynamicImage,
        encoding: ImageEncoding,
    ) -> Result<Option<LoadedImage>, GridError> {
        let width = image.width();
        let height = image.height();
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let pixel_data = match encoding {
            ImageEncoding::Flate => split_alpha(image),
            ImageEncoding::Jpeg { quality } => {
                let rgb = image.to_rgb8();
                let mut data = Vec::new();
                JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100)).encode(
                    rgb.as_raw(),
                    width,
                    height,
                    ColorType::Rgb8,
                )?;
                ImagePixelData::Jpeg { data }
            }
        };

        Ok(Some(LoadedImage {
            pixel_data,
            width_px: width,
            height_px: height,
        }))
    }
}

/// Decode to RGBA, split into RGB + alpha.
fn split_alpha(image: &DynamicImage) -> ImagePixelData {
    if !image.color().has_alpha() {
        return ImagePixelData::Decoded {
            rgb: image.to_rgb8().into_raw(),
            alpha: None,
        };
    }

    let rgba = image.to_rgba8();
    let pixel_count = (rgba.width() * rgba.height()) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        let a = pixel[3];
        alpha.push(a);
        if a != 255 {
            has_transparency = true;
        }
    }

    ImagePixelData::Decoded {
        rgb,
        alpha: if has_transparency { Some(alpha) } else { None },
    }
}
