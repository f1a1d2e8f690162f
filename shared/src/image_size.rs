//! Image dimensions and size utilities

use image::{ImageBuffer, Pixel};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image dimensions structure
///
/// Represents the width and height of a frame or still image.
/// Provides convenience methods for creating arrays and for the scaling
/// arithmetic used when frames are resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl ImageSize {
    /// Create a new ImageSize
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Size of an `image` crate buffer
    pub fn of_image<P, C>(image: &ImageBuffer<P, C>) -> Self
    where
        P: Pixel,
        C: std::ops::Deref<Target = [P::Subpixel]>,
    {
        let (width, height) = image.dimensions();
        Self::from_width_height(width as usize, height as usize)
    }

    /// Size of a single float plane (rows are the height)
    pub fn of_plane<T>(plane: &Array2<T>) -> Self {
        let (height, width) = plane.dim();
        Self { width, height }
    }

    /// Size of a `rows x cols x channels` array
    pub fn of_planes<T>(planes: &Array3<T>) -> Self {
        let (height, width, _) = planes.dim();
        Self { width, height }
    }

    /// Create an empty array with this size
    ///
    /// Returns an ndarray Array2 of zeros with shape (height, width).
    /// Note the row-major ordering convention: rows (height) come first.
    pub fn empty_array<T>(&self) -> Array2<T>
    where
        T: Clone + num_traits::Zero,
    {
        Array2::zeros((self.height, self.width))
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiply both dimensions by `factor`, truncating toward zero.
    ///
    /// This is the arithmetic used for the user supplied scaling factor of
    /// the video program: a 640x480 stream at 0.25 becomes 160x120. Returns
    /// `None` when a dimension would not fit the `u32` range of the `image`
    /// crate.
    pub fn scaled(&self, factor: f64) -> Option<Self> {
        let scale = |len: usize| {
            let value = (len as f64 * factor).trunc();
            (value.is_finite() && value >= 0.0 && value <= u32::MAX as f64).then_some(value as usize)
        };
        Some(Self {
            width: scale(self.width)?,
            height: scale(self.height)?,
        })
    }

    /// Dimensions as `u32`, the type the `image` crate uses
    pub fn as_u32(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_scaled_truncates() {
        let size = ImageSize::from_width_height(641, 479);
        assert_eq!(size.scaled(0.25), Some(ImageSize::from_width_height(160, 119)));
        assert_eq!(size.scaled(1.0), Some(size));
        assert_eq!(size.scaled(0.001), Some(ImageSize::from_width_height(0, 0)));
    }

    #[test]
    fn test_scaled_out_of_range() {
        let size = ImageSize::from_width_height(640, 480);
        assert_eq!(size.scaled(1e20), None);
        assert_eq!(size.scaled(f64::INFINITY), None);
        assert_eq!(size.scaled(-1.0), None);
    }

    #[test]
    fn test_of_image_and_plane_agree() {
        let img = RgbImage::new(7, 3);
        let plane = Array2::<f32>::zeros((3, 7));
        assert_eq!(ImageSize::of_image(&img), ImageSize::of_plane(&plane));
        assert_eq!(ImageSize::of_image(&img).to_string(), "7x3");
    }

    #[test]
    fn test_empty() {
        assert!(ImageSize::from_width_height(0, 10).is_empty());
        assert!(!ImageSize::from_width_height(1, 1).is_empty());
        let arr: Array2<f32> = ImageSize::from_width_height(4, 2).empty_array();
        assert_eq!(arr.dim(), (2, 4));
    }
}
