//! Smoothing filters: box (mean), Gaussian and median.

use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut1, Axis, Zip};
use rayon::prelude::*;

use super::convert::{planes_to_rgb, rgb_to_planes};
use super::convolve::{reflect_101, separable_filter};
use super::{ImageProcError, Result};

/// Check that an aperture is odd and non-zero.
pub(crate) fn check_odd_kernel(size: usize) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(ImageProcError::InvalidKernel {
            size,
            reason: "kernel size must be odd and positive",
        });
    }
    Ok(())
}

/// Normalised box filter with a `ksize_x` by `ksize_y` window.
///
/// Rows and then columns are filtered with a running sum, so the cost per
/// pixel does not grow with the window.
pub fn box_blur(plane: &ArrayView2<f32>, ksize_x: usize, ksize_y: usize) -> Result<Array2<f32>> {
    check_odd_kernel(ksize_x)?;
    check_odd_kernel(ksize_y)?;

    let mut horizontal = Array2::<f32>::zeros(plane.dim());
    Zip::from(horizontal.rows_mut())
        .and(plane.rows())
        .par_for_each(|dst, src| box_lane(src, dst, ksize_x));

    let mut result = Array2::<f32>::zeros(plane.dim());
    Zip::from(result.columns_mut())
        .and(horizontal.columns())
        .par_for_each(|dst, src| box_lane(src, dst, ksize_y));

    Ok(result)
}

/// Mean of a sliding `ksize` window along one lane, reflect-101 at the ends.
fn box_lane(src: ArrayView1<f32>, mut dst: ArrayViewMut1<f32>, ksize: usize) {
    let len = src.len();
    if len == 0 {
        return;
    }
    let half = (ksize / 2) as isize;
    let at = |i: isize| src[reflect_101(i, len)] as f64;

    let mut sum: f64 = (-half..=half).map(&at).sum();
    let scale = 1.0 / ksize as f64;
    for i in 0..len as isize {
        dst[i as usize] = (sum * scale) as f32;
        sum += at(i + half + 1) - at(i - half);
    }
}

/// Mean filter of a colour image with a square window of side `2 * radius + 1`.
///
/// Each channel is filtered independently. A radius of zero returns a copy.
pub fn mean_filter(image: &RgbImage, radius: u32) -> Result<RgbImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageProcError::EmptyImage);
    }
    let ksize = (radius as usize) * 2 + 1;
    let planes = rgb_to_planes(image);
    let filtered = map_channels(&planes, |channel| box_blur(&channel, ksize, ksize))?;
    Ok(planes_to_rgb(&filtered))
}

/// 1D Gaussian weights summing to one.
///
/// A non-positive `sigma` is derived from the kernel size as
/// `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`; for the small sizes 1, 3, 5 and 7
/// the usual fixed binomial-like tables are used instead.
pub fn gaussian_kernel(ksize: usize, sigma: f32) -> Result<Vec<f32>> {
    check_odd_kernel(ksize)?;

    if sigma <= 0.0 {
        let fixed: Option<&[f32]> = match ksize {
            1 => Some(&[1.0][..]),
            3 => Some(&[0.25, 0.5, 0.25][..]),
            5 => Some(&[0.0625, 0.25, 0.375, 0.25, 0.0625][..]),
            7 => Some(&[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125][..]),
            _ => None,
        };
        if let Some(table) = fixed {
            return Ok(table.to_vec());
        }
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let centre = (ksize as f32 - 1.0) * 0.5;
    let scale = -0.5 / (sigma * sigma);
    let mut weights: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - centre;
            (scale * d * d).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= total);
    Ok(weights)
}

/// Gaussian blur with a square `ksize` kernel and the same sigma on both axes.
pub fn gaussian_blur(plane: &ArrayView2<f32>, ksize: usize, sigma: f32) -> Result<Array2<f32>> {
    let kernel = gaussian_kernel(ksize, sigma)?;
    Ok(separable_filter(plane, &kernel, &kernel))
}

/// Median of a square `ksize` window (odd, at least 3).
pub fn median_blur(image: &GrayImage, ksize: usize) -> Result<GrayImage> {
    check_odd_kernel(ksize)?;
    if ksize < 3 {
        return Err(ImageProcError::InvalidKernel {
            size: ksize,
            reason: "median aperture must be at least 3",
        });
    }
    let radius = (ksize / 2) as u32;
    Ok(imageproc::filter::median_filter(image, radius, radius))
}

/// Apply a plane operator to every channel of a `rows x cols x channels`
/// array, one rayon task per channel.
pub(crate) fn map_channels<F>(planes: &Array3<f32>, op: F) -> Result<Array3<f32>>
where
    F: Fn(ArrayView2<f32>) -> Result<Array2<f32>> + Sync,
{
    let filtered = (0..planes.len_of(Axis(2)))
        .into_par_iter()
        .map(|c| op(planes.index_axis(Axis(2), c)))
        .collect::<Result<Vec<_>>>()?;

    let mut output = Array3::<f32>::zeros(planes.dim());
    for (mut target, channel) in output.axis_iter_mut(Axis(2)).zip(&filtered) {
        target.assign(channel);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Luma, Rgb};
    use ndarray::Array2;

    #[test]
    fn test_even_kernel_rejected() {
        let plane = Array2::<f32>::zeros((4, 4));
        assert!(matches!(
            box_blur(&plane.view(), 2, 3),
            Err(ImageProcError::InvalidKernel { size: 2, .. })
        ));
        assert!(gaussian_kernel(0, 1.0).is_err());
    }

    #[test]
    fn test_box_blur_preserves_constant() {
        let plane = Array2::from_elem((5, 6), 42.0f32);
        let out = box_blur(&plane.view(), 3, 5).unwrap();
        for v in out.iter() {
            assert_relative_eq!(*v, 42.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_box_blur_matches_uniform_kernel() {
        let plane = Array2::from_shape_fn((7, 9), |(y, x)| ((x * 37 + y * 11) % 23) as f32 * 1.5);
        for (kx, ky) in [(3, 3), (5, 3), (1, 5), (41, 41)] {
            let wx = vec![1.0 / kx as f32; kx];
            let wy = vec![1.0 / ky as f32; ky];
            let expected = separable_filter(&plane.view(), &wx, &wy);
            let out = box_blur(&plane.view(), kx, ky).unwrap();
            for (a, b) in out.iter().zip(expected.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_mean_filter_spreads_impulse() {
        let mut img = RgbImage::new(5, 5);
        img.put_pixel(2, 2, Rgb([90, 180, 9]));
        let out = mean_filter(&img, 1).unwrap();
        assert_eq!(*out.get_pixel(2, 2), Rgb([10, 20, 1]));
        assert_eq!(*out.get_pixel(1, 1), Rgb([10, 20, 1]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_mean_filter_radius_zero_is_identity() {
        let img = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        assert_eq!(mean_filter(&img, 0).unwrap(), img);
    }

    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        for (ksize, sigma) in [(3, 0.5), (5, 1.2), (9, 0.0), (3, 0.0)] {
            let k = gaussian_kernel(ksize, sigma).unwrap();
            assert_eq!(k.len(), ksize);
            assert_relative_eq!(k.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(k[0], k[ksize - 1], epsilon = 1e-7);
        }
    }

    #[test]
    fn test_gaussian_small_sigma_is_peaked() {
        let k = gaussian_kernel(3, 0.5).unwrap();
        // exp(-2) weighting on the sides
        assert_relative_eq!(k[1], 1.0 / (1.0 + 2.0 * (-2.0f32).exp()), epsilon = 1e-5);
    }

    #[test]
    fn test_median_removes_salt() {
        let mut img = GrayImage::from_pixel(7, 7, Luma([50]));
        img.put_pixel(3, 3, Luma([255]));
        let out = median_blur(&img, 3).unwrap();
        assert_eq!(out.get_pixel(3, 3)[0], 50);
        assert!(median_blur(&img, 1).is_err());
    }
}
