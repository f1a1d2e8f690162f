//! Fixed-level thresholding, min/max normalisation and log scaling.

use image::GrayImage;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// How a sample compares against the threshold.
///
/// All comparisons are strict: a sample equal to the threshold counts as
/// "not above".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    /// `max_value` above the threshold, 0 otherwise
    Binary,
    /// 0 above the threshold, `max_value` otherwise
    BinaryInv,
    /// Clamp to the threshold from above
    Trunc,
    /// Keep samples above the threshold, 0 otherwise
    ToZero,
    /// 0 above the threshold, keep otherwise
    ToZeroInv,
}

impl ThresholdKind {
    #[inline]
    fn apply(self, value: f32, thresh: f32, max_value: f32) -> f32 {
        let above = value > thresh;
        match self {
            ThresholdKind::Binary => {
                if above {
                    max_value
                } else {
                    0.0
                }
            }
            ThresholdKind::BinaryInv => {
                if above {
                    0.0
                } else {
                    max_value
                }
            }
            ThresholdKind::Trunc => {
                if above {
                    thresh
                } else {
                    value
                }
            }
            ThresholdKind::ToZero => {
                if above {
                    value
                } else {
                    0.0
                }
            }
            ThresholdKind::ToZeroInv => {
                if above {
                    0.0
                } else {
                    value
                }
            }
        }
    }
}

/// Threshold every sample of a float plane.
pub fn threshold(
    plane: &ArrayView2<f32>,
    thresh: f32,
    max_value: f32,
    kind: ThresholdKind,
) -> Array2<f32> {
    plane.mapv(|v| kind.apply(v, thresh, max_value))
}

/// Threshold an 8-bit image.
pub fn threshold_u8(image: &GrayImage, thresh: u8, max_value: u8, kind: ThresholdKind) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = kind.apply(pixel[0] as f32, thresh as f32, max_value as f32) as u8;
    }
    out
}

/// Smallest and largest sample, or `None` for an empty plane.
pub fn min_max(plane: &ArrayView2<f32>) -> Option<(f32, f32)> {
    plane.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Affinely map the plane's `[min, max]` onto `[lo, hi]`.
///
/// A constant plane has no range to stretch and maps entirely to `lo`.
pub fn normalize_min_max(plane: &ArrayView2<f32>, lo: f32, hi: f32) -> Array2<f32> {
    let Some((min, max)) = min_max(plane) else {
        return plane.to_owned();
    };
    let range = max - min;
    let scale = if range > f32::EPSILON {
        (hi - lo) / range
    } else {
        0.0
    };
    let shift = lo - min * scale;
    plane.mapv(|v| v * scale + shift)
}

/// Natural log of `v + 1`, stretched to `0..=255`.
///
/// Compresses the dynamic range so dark detail becomes visible next to
/// bright regions.
pub fn log_scale(plane: &ArrayView2<f32>) -> Array2<f32> {
    let logged = plane.mapv(|v| (v + 1.0).ln());
    normalize_min_max(&logged.view(), 0.0, 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Luma;
    use ndarray::array;

    #[test]
    fn test_threshold_kinds() {
        let plane = array![[10.0f32, 100.0, 101.0, 200.0]];
        let v = plane.view();
        assert_eq!(
            threshold(&v, 100.0, 255.0, ThresholdKind::Binary),
            array![[0.0, 0.0, 255.0, 255.0]]
        );
        assert_eq!(
            threshold(&v, 100.0, 255.0, ThresholdKind::BinaryInv),
            array![[255.0, 255.0, 0.0, 0.0]]
        );
        assert_eq!(
            threshold(&v, 100.0, 255.0, ThresholdKind::Trunc),
            array![[10.0, 100.0, 100.0, 100.0]]
        );
        assert_eq!(
            threshold(&v, 100.0, 255.0, ThresholdKind::ToZero),
            array![[0.0, 0.0, 101.0, 200.0]]
        );
        assert_eq!(
            threshold(&v, 100.0, 255.0, ThresholdKind::ToZeroInv),
            array![[10.0, 100.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn test_threshold_u8_binary_inv() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([100]));
        img.put_pixel(1, 0, Luma([101]));
        let mask = threshold_u8(&img, 100, 255, ThresholdKind::BinaryInv);
        assert_eq!(mask.as_raw(), &vec![255, 0]);
    }

    #[test]
    fn test_min_max() {
        let plane = array![[3.0f32, -1.0], [7.5, 0.0]];
        assert_eq!(min_max(&plane.view()), Some((-1.0, 7.5)));
        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(min_max(&empty.view()), None);
    }

    #[test]
    fn test_normalize_min_max() {
        let plane = array![[2.0f32, 4.0, 6.0]];
        let out = normalize_min_max(&plane.view(), 0.0, 1.0);
        assert_relative_eq!(out[[0, 0]], 0.0);
        assert_relative_eq!(out[[0, 1]], 0.5);
        assert_relative_eq!(out[[0, 2]], 1.0);

        let flat = Array2::from_elem((2, 2), 9.0f32);
        let out = normalize_min_max(&flat.view(), 0.0, 255.0);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_log_scale_spans_full_range() {
        let plane = array![[0.0f32, 15.0, 255.0]];
        let out = log_scale(&plane.view());
        assert_relative_eq!(out[[0, 0]], 0.0);
        assert_relative_eq!(out[[0, 2]], 255.0, epsilon = 1e-3);
        // ln(16) / ln(256) = 0.5
        assert_relative_eq!(out[[0, 1]], 127.5, epsilon = 1e-3);
    }
}
