//! Side-by-side composition of images on a filled background.

use image::{imageops, ImageBuffer, Pixel};

use super::{ImageProcError, Result};
use crate::ImageSize;

/// A fixed-size image that smaller images are pasted into.
#[derive(Clone)]
pub struct Canvas<P: Pixel> {
    buffer: ImageBuffer<P, Vec<P::Subpixel>>,
    fill: P,
}

impl<P: Pixel> Canvas<P> {
    /// Canvas of `size` with every pixel set to `fill`.
    pub fn new(size: ImageSize, fill: P) -> Self {
        let (width, height) = size.as_u32();
        Self {
            buffer: ImageBuffer::from_pixel(width, height, fill),
            fill,
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::of_image(&self.buffer)
    }

    /// Reset every pixel to the background fill.
    pub fn clear(&mut self) {
        for pixel in self.buffer.pixels_mut() {
            *pixel = self.fill;
        }
    }

    /// Paste `image` with its top-left corner at `(x, y)`.
    ///
    /// The whole image must fit; nothing is written otherwise.
    pub fn blit(&mut self, x: usize, y: usize, image: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<()> {
        let size = ImageSize::of_image(image);
        let bounds = self.size();
        if x + size.width > bounds.width || y + size.height > bounds.height {
            return Err(ImageProcError::RegionOutOfBounds { x, y, size, bounds });
        }
        imageops::replace(&mut self.buffer, image, x as i64, y as i64);
        Ok(())
    }

    pub fn image(&self) -> &ImageBuffer<P, Vec<P::Subpixel>> {
        &self.buffer
    }

    pub fn into_image(self) -> ImageBuffer<P, Vec<P::Subpixel>> {
        self.buffer
    }
}

/// Largest canvas [`panel_layout`] will lay out, in pixels.
pub const MAX_CANVAS_PIXELS: usize = 1 << 26;

/// Canvas size and top-left panel offsets for `count` equally sized panels
/// laid out in a row, `gap` pixels apart, with `margin` pixels on every side.
///
/// Fails when the canvas would exceed [`MAX_CANVAS_PIXELS`] or the `u32`
/// dimensions of the `image` crate.
pub fn panel_layout(
    panel: ImageSize,
    count: usize,
    gap: usize,
    margin: usize,
) -> Result<(ImageSize, Vec<(usize, usize)>)> {
    let too_large = || {
        ImageProcError::InvalidParameter(format!(
            "{count} panels of {panel} with gap {gap} and margin {margin} exceed the canvas limit"
        ))
    };
    let width = count
        .checked_mul(panel.width)
        .and_then(|w| w.checked_add(count.saturating_sub(1).checked_mul(gap)?))
        .and_then(|w| w.checked_add(margin.checked_mul(2)?))
        .ok_or_else(too_large)?;
    let height = margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(panel.height))
        .ok_or_else(too_large)?;
    let pixels = width.checked_mul(height).ok_or_else(too_large)?;
    if width > u32::MAX as usize || height > u32::MAX as usize || pixels > MAX_CANVAS_PIXELS {
        return Err(too_large());
    }

    let canvas = ImageSize::from_width_height(width, height);
    let offsets = (0..count)
        .map(|i| (margin + i * (panel.width + gap), margin))
        .collect();
    Ok((canvas, offsets))
}
