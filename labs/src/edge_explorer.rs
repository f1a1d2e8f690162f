//! Interactive Canny threshold explorer.
//!
//! Holds every buffer the display needs between key presses: the normalised
//! grey image, its Gaussian-smoothed copy, the Scharr gradient magnitude and
//! the current edge map, composed side by side on a float canvas.

use image::{GrayImage, Luma, RgbImage};
use log::info;
use ndarray::Array2;
use shared::image_proc::{
    canny, gaussian_blur, grey_f32_to_display, grey_to_plane, normalize_min_max, panel_layout,
    plane_to_display, plane_to_grey, plane_to_grey_f32, rgb_to_grey, scharr_magnitude, Canvas,
    ImageProcError,
};
use shared::ImageSize;

use crate::config::EdgeParams;
use crate::display::Key;

/// Positions of the low and high threshold sliders.
///
/// The sliders move independently; the smaller position always drives the
/// low threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderState {
    low: u32,
    high: u32,
    count: u32,
}

impl SliderState {
    /// Sliders over `0..=count`, clamping the initial positions.
    pub fn new(low: u32, high: u32, count: u32) -> Self {
        let count = count.max(1);
        Self {
            low: low.min(count),
            high: high.min(count),
            count,
        }
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// Canny thresholds on the 8-bit scale: `255 * position / count`.
    pub fn thresholds(&self) -> (f32, f32) {
        let scale = |p: u32| 255.0 * p as f32 / self.count as f32;
        (scale(self.low.min(self.high)), scale(self.low.max(self.high)))
    }

    fn step(position: u32, delta: i64, count: u32) -> u32 {
        (position as i64 + delta).clamp(0, count as i64) as u32
    }

    /// Left/Right move the low slider, Down/Up the high one.
    /// Returns true when a position changed.
    pub fn apply_key(&mut self, key: Key, step: u32) -> bool {
        let step = step as i64;
        let before = *self;
        match key {
            Key::Left => self.low = Self::step(self.low, -step, self.count),
            Key::Right => self.low = Self::step(self.low, step, self.count),
            Key::Down => self.high = Self::step(self.high, -step, self.count),
            Key::Up => self.high = Self::step(self.high, step, self.count),
            _ => {}
        }
        *self != before
    }
}

pub struct EdgeExplorer {
    gaussian_u8: GrayImage,
    edges: Array2<f32>,
    canvas: Canvas<Luma<f32>>,
    offsets: Vec<(usize, usize)>,
    sliders: SliderState,
    key_step: u32,
}

impl EdgeExplorer {
    /// Prepare the grey and gradient panels and run Canny at the initial
    /// slider positions.
    pub fn new(image: &RgbImage, params: &EdgeParams) -> Result<Self, ImageProcError> {
        let size = ImageSize::of_image(image);
        if size.is_empty() {
            return Err(ImageProcError::EmptyImage);
        }

        let grey = normalize_min_max(&grey_to_plane(&rgb_to_grey(image)).view(), 0.0, 1.0);
        let gaussian = gaussian_blur(&grey.view(), params.blur_ksize, params.blur_sigma)?;
        let gradient = scharr_magnitude(&gaussian.view())?;

        let (canvas_size, offsets) = panel_layout(size, 3, params.panel_gap, 0)?;
        let mut canvas = Canvas::new(canvas_size, Luma([params.background]));
        let (x, y) = offsets[0];
        canvas.blit(x, y, &plane_to_grey_f32(&grey))?;
        let (x, y) = offsets[1];
        canvas.blit(x, y, &plane_to_grey_f32(&gradient))?;

        let mut explorer = Self {
            gaussian_u8: plane_to_display(&gaussian),
            edges: size.empty_array(),
            canvas,
            offsets,
            sliders: SliderState::new(params.low, params.high, params.slider_count),
            key_step: params.key_step.max(1),
        };
        explorer.refresh()?;
        Ok(explorer)
    }

    /// Rerun Canny at the current slider positions and redraw the third panel.
    pub fn refresh(&mut self) -> Result<(), ImageProcError> {
        let (low, high) = self.sliders.thresholds();
        let edges = canny(&self.gaussian_u8, low, high);
        self.edges = grey_to_plane(&edges) / 255.0;
        let (x, y) = self.offsets[2];
        self.canvas.blit(x, y, &plane_to_grey_f32(&self.edges))?;
        info!(
            "Canny thresholds {:.1}/{:.1} (sliders {}/{})",
            low,
            high,
            self.sliders.low(),
            self.sliders.high()
        );
        Ok(())
    }

    /// Move a slider for an arrow key and refresh; returns true if the
    /// display changed.
    pub fn handle_key(&mut self, key: Key) -> Result<bool, ImageProcError> {
        if !self.sliders.apply_key(key, self.key_step) {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    pub fn sliders(&self) -> SliderState {
        self.sliders
    }

    /// Edge map with 1.0 on edges and 0.0 elsewhere.
    pub fn edges(&self) -> &Array2<f32> {
        &self.edges
    }

    /// The three panels as an 8-bit image.
    pub fn display_image(&self) -> GrayImage {
        grey_f32_to_display(self.canvas.image())
    }

    /// Edge map stretched to `0..=255` for writing to disk.
    pub fn output_image(&self) -> GrayImage {
        plane_to_grey(&normalize_min_max(&self.edges.view(), 0.0, 255.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;

    fn step_image() -> RgbImage {
        RgbImage::from_fn(24, 16, |x, _| if x < 12 { Rgb([30, 30, 30]) } else { Rgb([220, 220, 220]) })
    }

    #[test]
    fn test_slider_thresholds() {
        let sliders = SliderState::new(64, 128, 256);
        let (low, high) = sliders.thresholds();
        assert_relative_eq!(low, 63.75);
        assert_relative_eq!(high, 127.5);
        // Crossed sliders swap roles
        let (low, high) = SliderState::new(200, 100, 256).thresholds();
        assert_relative_eq!(low, 255.0 * 100.0 / 256.0, epsilon = 1e-4);
        assert_relative_eq!(high, 255.0 * 200.0 / 256.0, epsilon = 1e-4);
    }

    #[test]
    fn test_slider_keys_clamp() {
        let mut sliders = SliderState::new(4, 250, 256);
        assert!(sliders.apply_key(Key::Left, 8));
        assert_eq!(sliders.low(), 0);
        assert!(!sliders.apply_key(Key::Left, 8));
        assert!(sliders.apply_key(Key::Up, 8));
        assert_eq!(sliders.high(), 256);
        assert!(!sliders.apply_key(Key::Char('x'), 8));
    }

    #[test]
    fn test_canvas_layout() {
        let explorer = EdgeExplorer::new(&step_image(), &EdgeParams::default()).unwrap();
        let shown = explorer.display_image();
        assert_eq!(shown.dimensions(), (3 * 24 + 2 * 10, 16));
        // Gap between panels shows the background
        assert_eq!(shown.get_pixel(30, 5)[0], 128);
        // Normalised grey panel spans black to white
        assert_eq!(shown.get_pixel(0, 5)[0], 0);
        assert_eq!(shown.get_pixel(23, 5)[0], 255);
    }

    #[test]
    fn test_step_produces_edges() {
        let explorer = EdgeExplorer::new(&step_image(), &EdgeParams::default()).unwrap();
        assert!(explorer.edges().iter().any(|&v| v == 1.0));
        assert!(explorer.edges().iter().all(|&v| v == 0.0 || v == 1.0));
        let out = explorer.output_image();
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        // The third panel mirrors the edge map
        let shown = explorer.display_image();
        let column = (0..24u32).find(|&x| explorer.edges()[[8, x as usize]] == 1.0).unwrap();
        assert_eq!(shown.get_pixel(2 * 34 + column, 8)[0], 255);
    }

    #[test]
    fn test_high_thresholds_remove_edges() {
        let mut explorer = EdgeExplorer::new(&step_image(), &EdgeParams::default()).unwrap();
        for _ in 0..40 {
            explorer.handle_key(Key::Right).unwrap();
            explorer.handle_key(Key::Up).unwrap();
        }
        assert_eq!(explorer.sliders().low(), 256);
        // The blurred step still gives a Sobel response far above 255
        assert!(explorer.edges().iter().any(|&v| v == 1.0));
        assert!(!explorer.handle_key(Key::Up).unwrap());
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let flat = RgbImage::from_pixel(10, 10, Rgb([90, 90, 90]));
        let explorer = EdgeExplorer::new(&flat, &EdgeParams::default()).unwrap();
        assert!(explorer.edges().iter().all(|&v| v == 0.0));
        assert!(explorer.output_image().pixels().all(|p| p[0] == 0));
    }
}
