//! Resampling of images to a new size.
//!
//! Both interpolation modes are separable, so each axis gets a table of
//! `(source index, weight)` taps per output index and the image is
//! resampled one axis at a time.

use image::RgbImage;
use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use super::convert::{planes_to_rgb, rgb_to_planes};
use super::{ImageProcError, Result};
use crate::ImageSize;

/// Resampling method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Average of the exact source footprint of each output pixel; the
    /// right choice when shrinking.
    Area,
    /// Bilinear with pixel centres at half-integer coordinates and clamped edges.
    Linear,
}

/// Size after scaling by `fx` and `fy`, rounded to the nearest pixel and at least 1.
pub fn scaled_size(size: ImageSize, fx: f64, fy: f64) -> ImageSize {
    let scale = |len: usize, f: f64| ((len as f64 * f).round() as usize).max(1);
    ImageSize::from_width_height(scale(size.width, fx), scale(size.height, fy))
}

type Taps = Vec<Vec<(usize, f32)>>;

fn linear_taps(src_len: usize, dst_len: usize) -> Taps {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let pos = (i as f64 + 0.5) * scale - 0.5;
            if pos <= 0.0 {
                return vec![(0, 1.0)];
            }
            let i0 = pos.floor() as usize;
            if i0 + 1 >= src_len {
                return vec![(src_len - 1, 1.0)];
            }
            let frac = (pos - i0 as f64) as f32;
            vec![(i0, 1.0 - frac), (i0 + 1, frac)]
        })
        .collect()
}

fn area_taps(src_len: usize, dst_len: usize) -> Taps {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len).max(first + 1);
            let mut taps: Vec<(usize, f32)> = (first..last)
                .filter_map(|s| {
                    let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (overlap > 1e-9).then_some((s, overlap as f32))
                })
                .collect();
            let total: f32 = taps.iter().map(|&(_, w)| w).sum();
            if taps.is_empty() || total <= 0.0 {
                taps = vec![(first.min(src_len - 1), 1.0)];
            } else {
                taps.iter_mut().for_each(|(_, w)| *w /= total);
            }
            taps
        })
        .collect()
}

fn taps_for(src_len: usize, dst_len: usize, method: Interpolation) -> Taps {
    match method {
        Interpolation::Area => area_taps(src_len, dst_len),
        Interpolation::Linear => linear_taps(src_len, dst_len),
    }
}

/// Resample a `rows x cols x channels` array to `target`.
pub fn resize(planes: &Array3<f32>, target: ImageSize, method: Interpolation) -> Result<Array3<f32>> {
    let (rows, cols, channels) = planes.dim();
    if rows == 0 || cols == 0 {
        return Err(ImageProcError::EmptyImage);
    }
    if target.is_empty() {
        return Err(ImageProcError::InvalidParameter(format!(
            "cannot resize to {target}"
        )));
    }
    if target == ImageSize::of_planes(planes) {
        return Ok(planes.clone());
    }

    let x_taps = taps_for(cols, target.width, method);
    let y_taps = taps_for(rows, target.height, method);

    let mut horizontal = Array3::<f32>::zeros((rows, target.width, channels));
    Zip::indexed(&mut horizontal).par_for_each(|(y, x, c), out| {
        *out = x_taps[x].iter().map(|&(sx, w)| w * planes[[y, sx, c]]).sum();
    });

    let mut output = Array3::<f32>::zeros((target.height, target.width, channels));
    Zip::indexed(&mut output).par_for_each(|(y, x, c), out| {
        *out = y_taps[y].iter().map(|&(sy, w)| w * horizontal[[sy, x, c]]).sum();
    });

    Ok(output)
}

/// Resample an 8-bit colour image to `target`.
pub fn resize_rgb(image: &RgbImage, target: ImageSize, method: Interpolation) -> Result<RgbImage> {
    if ImageSize::of_image(image) == target {
        return Ok(image.clone());
    }
    let planes = rgb_to_planes(image);
    Ok(planes_to_rgb(&resize(&planes, target, method)?))
}
