//! Masked copies.

use image::{GrayImage, Rgb, RgbImage};

use super::{ImageProcError, Result};
use crate::ImageSize;

/// Keep the pixels of `image` where `mask` is non-zero and black out the rest.
///
/// Equivalent to a bitwise AND of the image with itself under the mask.
pub fn masked_copy(image: &RgbImage, mask: &GrayImage) -> Result<RgbImage> {
    let expected = ImageSize::of_image(image);
    let actual = ImageSize::of_image(mask);
    if expected != actual {
        return Err(ImageProcError::SizeMismatch { expected, actual });
    }

    let mut out = RgbImage::new(image.width(), image.height());
    for ((dst, src), m) in out.pixels_mut().zip(image.pixels()).zip(mask.pixels()) {
        if m[0] != 0 {
            *dst = *src;
        } else {
            *dst = Rgb([0, 0, 0]);
        }
    }
    Ok(out)
}
