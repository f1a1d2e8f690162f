//! Cartoon rendering of video frames.
//!
//! Dark outlines come from a thresholded Laplacian of the median-filtered
//! grey frame; flat colour regions come from repeated bilateral smoothing at
//! reduced resolution. The outlines are applied as a mask over the smoothed
//! colours.

use image::{Rgb, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use super::bilateral::bilateral_rgb;
use super::canvas::{panel_layout, Canvas};
use super::convert::rgb_to_grey;
use super::filters::median_blur;
use super::gradient::laplacian_u8;
use super::mask::masked_copy;
use super::resize::{resize_rgb, scaled_size, Interpolation};
use super::threshold::{threshold_u8, ThresholdKind};
use super::{ImageProcError, Result};
use crate::ImageSize;

/// Parameters of the cartoon pipeline and its side-by-side display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartoonParams {
    /// Median aperture applied to the grey frame before edge detection
    pub median_ksize: usize,
    /// Laplacian aperture (1, 3 or 5)
    pub laplacian_ksize: usize,
    /// Laplacian responses above this level become outline pixels
    pub edge_threshold: u8,
    /// Colour smoothing runs on a frame shrunk by this factor
    pub downsample: u32,
    pub bilateral_iterations: usize,
    pub bilateral_diameter: usize,
    pub sigma_color: f32,
    pub sigma_space: f32,
    /// Gap in pixels around and between the two panels of the composite
    pub border: usize,
    /// Grey level of the composite background
    pub background: u8,
}

impl Default for CartoonParams {
    fn default() -> Self {
        Self {
            median_ksize: 7,
            laplacian_ksize: 5,
            edge_threshold: 100,
            downsample: 4,
            bilateral_iterations: 10,
            bilateral_diameter: 5,
            sigma_color: 5.0,
            sigma_space: 7.0,
            border: 5,
            background: 128,
        }
    }
}

impl CartoonParams {
    pub fn validate(&self) -> Result<()> {
        if self.downsample == 0 {
            return Err(ImageProcError::InvalidParameter(
                "downsample factor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Render one frame as a cartoon of the same size.
pub fn cartoonise(frame: &RgbImage, params: &CartoonParams) -> Result<RgbImage> {
    params.validate()?;
    let frame_size = ImageSize::of_image(frame);
    if frame_size.is_empty() {
        return Err(ImageProcError::EmptyImage);
    }

    let grey = rgb_to_grey(frame);
    let median = median_blur(&grey, params.median_ksize)?;
    let edges = laplacian_u8(&median, params.laplacian_ksize)?;
    let mask = threshold_u8(&edges, params.edge_threshold, 255, ThresholdKind::BinaryInv);

    let factor = 1.0 / params.downsample as f64;
    let small_size = scaled_size(frame_size, factor, factor);
    let mut small = resize_rgb(frame, small_size, Interpolation::Area)?;
    for _ in 0..params.bilateral_iterations {
        small = bilateral_rgb(
            &small,
            params.bilateral_diameter,
            params.sigma_color,
            params.sigma_space,
        )?;
    }

    // Rounding in the shrink can leave the restored frame a few pixels off,
    // so resample straight to the frame size.
    let smooth = resize_rgb(&small, frame_size, Interpolation::Linear)?;
    debug!("Cartoonised {frame_size} frame via {small_size}");
    masked_copy(&smooth, &mask)
}

/// Composite showing each frame next to its cartoon.
pub struct CartoonCanvas {
    canvas: Canvas<Rgb<u8>>,
    frame_size: ImageSize,
    offsets: Vec<(usize, usize)>,
    params: CartoonParams,
}

impl CartoonCanvas {
    /// Fails when the composite for `frame_size` would be too large to allocate.
    pub fn new(frame_size: ImageSize, params: &CartoonParams) -> Result<Self> {
        let (size, offsets) = panel_layout(frame_size, 2, params.border, params.border)?;
        let fill = Rgb([params.background; 3]);
        Ok(Self {
            canvas: Canvas::new(size, fill),
            frame_size,
            offsets,
            params: params.clone(),
        })
    }

    /// Size of the composite image.
    pub fn size(&self) -> ImageSize {
        self.canvas.size()
    }

    pub fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    /// Draw `frame` in the left panel and its cartoon in the right panel.
    pub fn render(&mut self, frame: &RgbImage) -> Result<&RgbImage> {
        let actual = ImageSize::of_image(frame);
        if actual != self.frame_size {
            return Err(ImageProcError::SizeMismatch {
                expected: self.frame_size,
                actual,
            });
        }
        let cartoon = cartoonise(frame, &self.params)?;
        let (fx, fy) = self.offsets[0];
        let (cx, cy) = self.offsets[1];
        self.canvas.blit(fx, fy, frame)?;
        self.canvas.blit(cx, cy, &cartoon)?;
        Ok(self.canvas.image())
    }

    pub fn image(&self) -> &RgbImage {
        self.canvas.image()
    }
}
