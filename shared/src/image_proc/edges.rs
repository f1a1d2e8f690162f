//! Canny edge detection.
//!
//! 3x3 Sobel gradients with the L1 magnitude `|gx| + |gy|`, non-maximum
//! suppression across four direction sectors, then hysteresis: samples above
//! `high` seed edges which grow through 8-connected samples above `low`.
//! The input is not smoothed first; callers blur beforehand if they want to.

use image::{GrayImage, Luma};
use ndarray::{Array2, Zip};

use super::convert::grey_to_plane;
use super::convolve::separable_filter;

const SOBEL_DERIVATIVE: [f32; 3] = [-1.0, 0.0, 1.0];
const SOBEL_SMOOTHING: [f32; 3] = [1.0, 2.0, 1.0];

/// tan(22.5 degrees)
const TAN_22_5: f32 = 0.414_213_57;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Sector {
    Horizontal,
    Rising,
    Vertical,
    Falling,
}

/// Edge map of an 8-bit image: 255 on edges, 0 elsewhere.
///
/// The thresholds are swapped if given in the wrong order.
pub fn canny(image: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }

    let plane = grey_to_plane(image);
    let gx = separable_filter(&plane.view(), &SOBEL_DERIVATIVE, &SOBEL_SMOOTHING);
    let gy = separable_filter(&plane.view(), &SOBEL_SMOOTHING, &SOBEL_DERIVATIVE);

    let magnitude = Zip::from(&gx).and(&gy).map_collect(|&x, &y| x.abs() + y.abs());
    let sectors = Zip::from(&gx).and(&gy).map_collect(|&x, &y| {
        let (ax, ay) = (x.abs(), y.abs());
        if ay <= ax * TAN_22_5 {
            Sector::Horizontal
        } else if ax <= ay * TAN_22_5 {
            Sector::Vertical
        } else if x * y > 0.0 {
            Sector::Rising
        } else {
            Sector::Falling
        }
    });

    let suppressed = non_max_suppression(&magnitude, &sectors);
    hysteresis(&suppressed, low, high)
}

fn non_max_suppression(magnitude: &Array2<f32>, sectors: &Array2<Sector>) -> Array2<f32> {
    let (rows, cols) = magnitude.dim();
    let at = |y: isize, x: isize| -> f32 {
        if y < 0 || x < 0 || y >= rows as isize || x >= cols as isize {
            0.0
        } else {
            magnitude[[y as usize, x as usize]]
        }
    };

    let mut out = Array2::<f32>::zeros((rows, cols));
    Zip::indexed(&mut out).par_for_each(|(y, x), value| {
        let m = magnitude[[y, x]];
        let (yi, xi) = (y as isize, x as isize);
        // Image rows grow downwards, so a "rising" gradient (gx and gy with
        // the same sign) points towards the lower right.
        let (before, after) = match sectors[[y, x]] {
            Sector::Horizontal => (at(yi, xi - 1), at(yi, xi + 1)),
            Sector::Vertical => (at(yi - 1, xi), at(yi + 1, xi)),
            Sector::Rising => (at(yi - 1, xi - 1), at(yi + 1, xi + 1)),
            Sector::Falling => (at(yi - 1, xi + 1), at(yi + 1, xi - 1)),
        };
        if m > before && m >= after {
            *value = m;
        }
    });
    out
}

fn hysteresis(suppressed: &Array2<f32>, low: f32, high: f32) -> GrayImage {
    let (rows, cols) = suppressed.dim();
    let mut edges = Array2::from_elem((rows, cols), false);
    let mut stack = Vec::new();

    for ((y, x), &m) in suppressed.indexed_iter() {
        if m > high {
            edges[[y, x]] = true;
            stack.push((y, x));
        }
    }

    while let Some((y, x)) = stack.pop() {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(rows - 1);
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(cols - 1);
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                if !edges[[ny, nx]] && suppressed[[ny, nx]] > low {
                    edges[[ny, nx]] = true;
                    stack.push((ny, nx));
                }
            }
        }
    }

    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if edges[[y as usize, x as usize]] {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
