//! # Square Cropping
//!
//! Reduces a page raster to a square window whose side is the image's
//! shorter dimension, anchored at the configured offsets. Offsets past the
//! image edge shrink the window instead of failing, down to a zero-area
//! crop.

use image::DynamicImage;

use crate::config::CropOffsets;

/// Pixel rectangle of a crop, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Compute the crop window for an image of `width` × `height`.
///
/// right = min(left + side, width), bottom = min(top + side, height); the
/// extent saturates at zero when an offset is beyond the edge.
pub fn crop_rect(width: u32, height: u32, offsets: CropOffsets) -> CropRect {
    let side = width.min(height);
    let right = offsets.left.saturating_add(side).min(width);
    let bottom = offsets.top.saturating_add(side).min(height);
    CropRect {
        left: offsets.left,
        top: offsets.top,
        width: right.saturating_sub(offsets.left),
        height: bottom.saturating_sub(offsets.top),
    }
}

/// Crop `image` to its square window. The input is left untouched.
pub fn crop(image: &DynamicImage, offsets: CropOffsets) -> DynamicImage {
    let rect = crop_rect(image.width(), image.height(), offsets);
    if rect.is_empty() {
        tracing::warn!(
            width = image.width(),
            height = image.height(),
            top = offsets.top,
            left = offsets.left,
            "crop offsets leave a zero-area image"
        );
        return DynamicImage::new_rgb8(rect.width, rect.height);
    }
    image.crop_imm(rect.left, rect.top, rect.width, rect.height)
}
