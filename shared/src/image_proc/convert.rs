//! Conversions between `image` buffers and `ndarray` planes.
//!
//! Array indices `[y, x]` map to pixel coordinates `(x, y)`. Array dimensions
//! are `(height, width)` while image dimensions are `(width, height)`.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use ndarray::{Array2, Array3};

/// Single-channel float image, used to compose float planes side by side.
pub type GreyF32Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Luma weights for red, green and blue (ITU-R BT.601).
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Round and clamp a float sample into the 8-bit range.
#[inline]
pub fn saturate_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Weighted luma of a colour image.
pub fn rgb_to_grey(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        let luma = LUMA_WEIGHTS[0] * r as f32 + LUMA_WEIGHTS[1] * g as f32 + LUMA_WEIGHTS[2] * b as f32;
        Luma([saturate_u8(luma)])
    })
}

/// Replicate a grey image into three identical channels.
pub fn grey_to_rgb(grey: &GrayImage) -> RgbImage {
    let (width, height) = grey.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let v = grey.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// 8-bit grey image to a float plane holding the same sample values.
pub fn grey_to_plane(grey: &GrayImage) -> Array2<f32> {
    let (width, height) = grey.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        grey.get_pixel(x as u32, y as u32)[0] as f32
    })
}

/// Float plane to an 8-bit grey image, rounding and saturating each sample.
pub fn plane_to_grey(plane: &Array2<f32>) -> GrayImage {
    let (height, width) = plane.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([saturate_u8(plane[[y as usize, x as usize]])])
    })
}

/// Float plane in unit range to an 8-bit image for display.
///
/// Samples are multiplied by 255 before saturating, so anything above 1.0
/// shows as white and anything below 0.0 as black.
pub fn plane_to_display(plane: &Array2<f32>) -> GrayImage {
    let (height, width) = plane.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([saturate_u8(plane[[y as usize, x as usize]] * 255.0)])
    })
}

/// Colour image to a `rows x cols x 3` float array.
pub fn rgb_to_planes(rgb: &RgbImage) -> Array3<f32> {
    let (width, height) = rgb.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32
    })
}

/// `rows x cols x 3` float array back to a colour image.
pub fn planes_to_rgb(planes: &Array3<f32>) -> RgbImage {
    let (height, width, _) = planes.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            saturate_u8(planes[[y, x, 0]]),
            saturate_u8(planes[[y, x, 1]]),
            saturate_u8(planes[[y, x, 2]]),
        ])
    })
}

/// Float plane as a single-channel float image.
pub fn plane_to_grey_f32(plane: &Array2<f32>) -> GreyF32Image {
    let (height, width) = plane.dim();
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        Luma([plane[[y as usize, x as usize]]])
    })
}

/// Unit-range float image to 8 bits for display, like [`plane_to_display`].
pub fn grey_f32_to_display(image: &GreyF32Image) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([saturate_u8(image.get_pixel(x, y)[0] * 255.0)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturate() {
        assert_eq!(saturate_u8(-3.0), 0);
        assert_eq!(saturate_u8(254.5), 255);
        assert_eq!(saturate_u8(1000.0), 255);
        assert_eq!(saturate_u8(f32::NAN), 0);
    }

    #[test]
    fn test_rgb_to_grey_weights() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));
        let grey = rgb_to_grey(&img);
        assert_eq!(grey.get_pixel(0, 0)[0], 76);
        assert_eq!(grey.get_pixel(1, 0)[0], 150);
        assert_eq!(grey.get_pixel(2, 0)[0], 29);
    }

    #[test]
    fn test_plane_layout_matches_image() {
        let mut grey = GrayImage::new(4, 2);
        grey.put_pixel(3, 1, Luma([200]));
        let plane = grey_to_plane(&grey);
        assert_eq!(plane.dim(), (2, 4));
        assert_eq!(plane[[1, 3]], 200.0);
        assert_eq!(plane_to_grey(&plane), grey);
    }

    #[test]
    fn test_display_scaling() {
        let plane = Array2::from_shape_vec((1, 3), vec![0.0, 0.5, 2.0]).unwrap();
        let shown = plane_to_display(&plane);
        assert_eq!(shown.as_raw(), &vec![0, 128, 255]);
    }

    #[test]
    fn test_colour_planes_preserve_channels() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([10, 20, 30]));
        let planes = rgb_to_planes(&img);
        assert_eq!(planes[[0, 1, 2]], 30.0);
        assert_eq!(planes_to_rgb(&planes), img);
        assert_eq!(grey_to_rgb(&rgb_to_grey(&img)).get_pixel(1, 0)[0], 18);
    }

    #[test]
    fn test_float_image_round_trip() {
        let plane = Array2::from_shape_vec((2, 2), vec![0.0f32, 0.25, 1.0, 1.5]).unwrap();
        let image = plane_to_grey_f32(&plane);
        assert_eq!(image.get_pixel(1, 0)[0], 0.25);
        assert_eq!(grey_f32_to_display(&image).as_raw(), &vec![0, 64, 255, 255]);
    }
}
