//! Correlation of float planes with small kernels.
//!
//! Kernels are applied as correlations (not flipped), anchored at their
//! centre, with reflect-101 borders. Rows of the output are computed in
//! parallel through ndarray's rayon integration.

use ndarray::{Array2, ArrayView2, Zip};

/// Map an out-of-range index back into `0..len` by reflecting about the
/// edge sample without repeating it.
#[inline]
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = index;
    while i < 0 || i > last {
        i = if i < 0 { -i } else { 2 * last - i };
    }
    i as usize
}

/// Apply a separable kernel: `kernel_x` along rows, then `kernel_y` along columns.
///
/// Both kernels must have odd length.
pub fn separable_filter(plane: &ArrayView2<f32>, kernel_x: &[f32], kernel_y: &[f32]) -> Array2<f32> {
    debug_assert!(kernel_x.len() % 2 == 1 && kernel_y.len() % 2 == 1);
    let (rows, cols) = plane.dim();
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    let mut horizontal = Array2::<f32>::zeros((rows, cols));
    Zip::indexed(&mut horizontal).par_for_each(|(y, x), out| {
        let mut acc = 0.0f32;
        for (k, &w) in kernel_x.iter().enumerate() {
            let sx = reflect_101(x as isize + k as isize - half_x, cols);
            acc += w * plane[[y, sx]];
        }
        *out = acc;
    });

    let mut result = Array2::<f32>::zeros((rows, cols));
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut acc = 0.0f32;
        for (k, &w) in kernel_y.iter().enumerate() {
            let sy = reflect_101(y as isize + k as isize - half_y, rows);
            acc += w * horizontal[[sy, x]];
        }
        *out = acc;
    });

    result
}

/// Correlate a plane with a full 2D kernel (odd width and height).
pub fn filter2d(plane: &ArrayView2<f32>, kernel: &ArrayView2<f32>) -> Array2<f32> {
    let (rows, cols) = plane.dim();
    let (k_rows, k_cols) = kernel.dim();
    debug_assert!(k_rows % 2 == 1 && k_cols % 2 == 1);
    let half_y = (k_rows / 2) as isize;
    let half_x = (k_cols / 2) as isize;

    let mut result = Array2::<f32>::zeros((rows, cols));
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut acc = 0.0f32;
        for ky in 0..k_rows {
            let sy = reflect_101(y as isize + ky as isize - half_y, rows);
            for kx in 0..k_cols {
                let w = kernel[[ky, kx]];
                if w != 0.0 {
                    let sx = reflect_101(x as isize + kx as isize - half_x, cols);
                    acc += w * plane[[sy, sx]];
                }
            }
        }
        *out = acc;
    });

    result
}
