//! Derivative operators: Scharr first derivatives and the Laplacian.

use image::GrayImage;
use ndarray::{array, Array2, ArrayView2};

use super::convert::{grey_to_plane, plane_to_grey};
use super::convolve::{filter2d, separable_filter};
use super::{ImageProcError, Result};

const SCHARR_DERIVATIVE: [f32; 3] = [-1.0, 0.0, 1.0];
const SCHARR_SMOOTHING: [f32; 3] = [3.0, 10.0, 3.0];

const SECOND_DERIVATIVE_5: [f32; 5] = [1.0, 0.0, -2.0, 0.0, 1.0];
const BINOMIAL_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

/// First derivative with the 3x3 Scharr kernel.
///
/// Exactly one of `dx` and `dy` must be 1 and the other 0. The result keeps
/// the sign of the derivative.
pub fn scharr(plane: &ArrayView2<f32>, dx: u32, dy: u32) -> Result<Array2<f32>> {
    match (dx, dy) {
        (1, 0) => Ok(separable_filter(plane, &SCHARR_DERIVATIVE, &SCHARR_SMOOTHING)),
        (0, 1) => Ok(separable_filter(plane, &SCHARR_SMOOTHING, &SCHARR_DERIVATIVE)),
        _ => Err(ImageProcError::InvalidParameter(format!(
            "Scharr needs exactly one first-order derivative, got dx={dx} dy={dy}"
        ))),
    }
}

/// Gradient strength as the equally weighted sum of absolute Scharr derivatives.
pub fn scharr_magnitude(plane: &ArrayView2<f32>) -> Result<Array2<f32>> {
    let gx = scharr(plane, 1, 0)?;
    let gy = scharr(plane, 0, 1)?;
    Ok(gx.mapv(f32::abs) * 0.5 + gy.mapv(f32::abs) * 0.5)
}

/// Sum of second derivatives in x and y.
///
/// Supported apertures are 1, 3 and 5. Output is float and signed.
pub fn laplacian(plane: &ArrayView2<f32>, ksize: usize) -> Result<Array2<f32>> {
    match ksize {
        1 => {
            let kernel = array![[0.0f32, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];
            Ok(filter2d(plane, &kernel.view()))
        }
        3 => {
            let kernel = array![[2.0f32, 0.0, 2.0], [0.0, -8.0, 0.0], [2.0, 0.0, 2.0]];
            Ok(filter2d(plane, &kernel.view()))
        }
        5 => {
            let d2x = separable_filter(plane, &SECOND_DERIVATIVE_5, &BINOMIAL_5);
            let d2y = separable_filter(plane, &BINOMIAL_5, &SECOND_DERIVATIVE_5);
            Ok(d2x + d2y)
        }
        _ => Err(ImageProcError::InvalidKernel {
            size: ksize,
            reason: "Laplacian aperture must be 1, 3 or 5",
        }),
    }
}

/// Laplacian of an 8-bit image, saturated back to 8 bits.
///
/// Negative responses clip to 0, so only one side of each edge survives.
pub fn laplacian_u8(image: &GrayImage, ksize: usize) -> Result<GrayImage> {
    let plane = grey_to_plane(image);
    let response = laplacian(&plane.view(), ksize)?;
    Ok(plane_to_grey(&response))
}
