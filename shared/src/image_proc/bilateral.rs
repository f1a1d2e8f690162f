//! Bilateral filter
//!
//! Edge-preserving smoothing filter that weights each neighbour by both its
//! spatial distance and its colour distance from the centre pixel.

use image::RgbImage;
use ndarray::{Array3, Zip};

use super::convert::{planes_to_rgb, rgb_to_planes};
use super::convolve::reflect_101;
use super::{ImageProcError, Result};

/// Offsets and spatial weights of the circular neighbourhood.
fn spatial_taps(radius: isize, sigma_space: f32) -> Vec<(isize, isize, f32)> {
    let coeff = -0.5 / (sigma_space * sigma_space);
    let mut taps = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            taps.push((dy, dx, (r2 * coeff).exp()));
        }
    }
    taps
}

/// Bilateral filter of a `rows x cols x channels` float image.
///
/// # Arguments
/// * `planes` - Input samples, any number of channels
/// * `diameter` - Neighbourhood diameter; 0 derives it from `sigma_space`
/// * `sigma_color` - Colour sigma; the colour distance is the sum of absolute
///   channel differences
/// * `sigma_space` - Spatial sigma in pixels
pub fn bilateral_filter(
    planes: &Array3<f32>,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<Array3<f32>> {
    if sigma_color <= 0.0 || sigma_space <= 0.0 {
        return Err(ImageProcError::InvalidParameter(format!(
            "bilateral sigmas must be positive (color {sigma_color}, space {sigma_space})"
        )));
    }
    let (rows, cols, channels) = planes.dim();
    if rows == 0 || cols == 0 {
        return Err(ImageProcError::EmptyImage);
    }

    let radius = if diameter == 0 {
        (sigma_space * 1.5).round().max(1.0) as isize
    } else {
        (diameter / 2).max(1) as isize
    };
    let taps = spatial_taps(radius, sigma_space);
    let color_coeff = -0.5 / (sigma_color * sigma_color);

    let mut output = Array3::<f32>::zeros((rows, cols, channels));
    Zip::indexed(output.lanes_mut(ndarray::Axis(2))).par_for_each(|(y, x), mut out| {
        let centre = planes.slice(ndarray::s![y, x, ..]);
        let mut sums = vec![0.0f32; channels];
        let mut weight_sum = 0.0f32;

        for &(dy, dx, spatial) in &taps {
            let ny = reflect_101(y as isize + dy, rows);
            let nx = reflect_101(x as isize + dx, cols);
            let neighbour = planes.slice(ndarray::s![ny, nx, ..]);

            let distance: f32 = centre
                .iter()
                .zip(neighbour.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            let weight = spatial * (distance * distance * color_coeff).exp();

            for (sum, &v) in sums.iter_mut().zip(neighbour.iter()) {
                *sum += weight * v;
            }
            weight_sum += weight;
        }

        // The centre tap always contributes weight 1, so weight_sum > 0
        for (o, sum) in out.iter_mut().zip(sums) {
            *o = sum / weight_sum;
        }
    });

    Ok(output)
}

/// Bilateral filter of an 8-bit colour image.
pub fn bilateral_rgb(
    image: &RgbImage,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<RgbImage> {
    let planes = rgb_to_planes(image);
    let filtered = bilateral_filter(&planes, diameter, sigma_color, sigma_space)?;
    Ok(planes_to_rgb(&filtered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    #[test]
    fn test_spatial_taps_are_circular() {
        let taps = spatial_taps(2, 7.0);
        // 5x5 square minus the four corners
        assert_eq!(taps.len(), 21);
        assert!(taps.iter().any(|&(dy, dx, w)| dy == 0 && dx == 0 && w == 1.0));
        assert!(!taps.iter().any(|&(dy, dx, _)| dy.abs() == 2 && dx.abs() == 2));
    }

    #[test]
    fn test_constant_image_unchanged() {
        let img = RgbImage::from_pixel(8, 6, Rgb([30, 60, 90]));
        assert_eq!(bilateral_rgb(&img, 5, 5.0, 7.0).unwrap(), img);
    }

    #[test]
    fn test_preserves_strong_edge() {
        let img = RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([10, 10, 10])
            } else {
                Rgb([200, 200, 200])
            }
        });
        let out = bilateral_rgb(&img, 5, 5.0, 7.0).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_smooths_small_noise() {
        let mut planes = Array3::<f32>::from_elem((7, 7, 1), 100.0);
        planes[[3, 3, 0]] = 102.0;
        let out = bilateral_filter(&planes, 5, 5.0, 7.0).unwrap();
        assert!(out[[3, 3, 0]] < 102.0);
        assert!(out[[3, 3, 0]] > 100.0);
        assert_relative_eq!(out[[0, 0, 0]], 100.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rejects_bad_sigma() {
        let planes = Array3::<f32>::zeros((2, 2, 3));
        assert!(bilateral_filter(&planes, 5, 0.0, 7.0).is_err());
    }
}
