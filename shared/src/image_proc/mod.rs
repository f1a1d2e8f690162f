//! Image operators used by the lab programs
//!
//! Float work happens on `ndarray` planes (`rows x cols`) and stacks of planes
//! (`rows x cols x channels`); 8-bit buffers are `image::GrayImage` and
//! `image::RgbImage`. Unless stated otherwise, operators sample outside the
//! image by reflecting about the edge pixel without repeating it
//! (`gfedcb|abcdefgh|gfedcba`).

pub mod bilateral;
pub mod canvas;
pub mod cartoon;
pub mod convert;
pub mod convolve;
pub mod edges;
pub mod filters;
pub mod gradient;
pub mod mask;
pub mod resize;
pub mod threshold;

use thiserror::Error;

use crate::ImageSize;

// Re-export key functionality for easier access
pub use bilateral::{bilateral_filter, bilateral_rgb};
pub use canvas::{panel_layout, Canvas, MAX_CANVAS_PIXELS};
pub use cartoon::{cartoonise, CartoonCanvas, CartoonParams};
pub use convert::{
    grey_f32_to_display, grey_to_plane, grey_to_rgb, plane_to_display, plane_to_grey,
    plane_to_grey_f32, planes_to_rgb, rgb_to_grey, rgb_to_planes, GreyF32Image,
};
pub use edges::canny;
pub use filters::{box_blur, gaussian_blur, gaussian_kernel, mean_filter, median_blur};
pub use gradient::{laplacian, laplacian_u8, scharr, scharr_magnitude};
pub use mask::masked_copy;
pub use resize::{resize, resize_rgb, scaled_size, Interpolation};
pub use threshold::{log_scale, min_max, normalize_min_max, threshold, threshold_u8, ThresholdKind};

/// Errors raised by the image operators.
#[derive(Debug, Error, PartialEq)]
pub enum ImageProcError {
    /// Kernel/aperture size the operator cannot use (even, zero, unsupported).
    #[error("Invalid kernel size {size}: {reason}")]
    InvalidKernel { size: usize, reason: &'static str },

    /// Two buffers that must share dimensions do not.
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        expected: ImageSize,
        actual: ImageSize,
    },

    /// A sub-region does not fit inside its destination.
    #[error("Region {size} at ({x}, {y}) does not fit inside {bounds}")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        size: ImageSize,
        bounds: ImageSize,
    },

    /// The operator was handed a buffer with no pixels.
    #[error("Empty image")]
    EmptyImage,

    /// Any other parameter outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for image operators.
pub type Result<T> = std::result::Result<T, ImageProcError>;
