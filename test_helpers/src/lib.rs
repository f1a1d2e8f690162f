//! Test infrastructure shared by the workspace crates.
//!
//! Provides workspace root discovery, a persistent `test_output/` directory
//! for artifacts worth inspecting by eye, and small synthetic images with
//! known structure (steps, ramps, checkerboards, colour blocks) so operator
//! tests do not depend on sample files.
//!
//! # Usage
//! ```rust,no_run
//! use test_helpers::{output_path, step_edge};
//!
//! let image = step_edge(32, 16, 16, 20, 220);
//! image.save(output_path("step_edge.png")).unwrap();
//! ```

use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array2;
use once_cell::sync::Lazy;
use std::env;
use std::path::{Path, PathBuf};

/// Errors raised by the test infrastructure.
#[derive(thiserror::Error, Debug)]
pub enum TestHelperError {
    /// Project root directory could not be located or accessed.
    ///
    /// Occurs when tests run outside the workspace or no parent directory
    /// holds a `Cargo.toml` with a `[workspace]` table.
    #[error("Failed to find project root: {0}")]
    ProjectRootNotFound(String),
}

/// Locate the workspace root by walking up from the current directory.
///
/// Returns the first ancestor whose `Cargo.toml` contains a `[workspace]`
/// section, so it works from any member crate's test binary.
pub fn find_project_root() -> Result<PathBuf, TestHelperError> {
    let mut current_dir = env::current_dir().map_err(|e| {
        TestHelperError::ProjectRootNotFound(format!("Failed to get current directory: {}", e))
    })?;

    loop {
        let cargo_toml = current_dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml).map_err(|e| {
                TestHelperError::ProjectRootNotFound(format!("Failed to read Cargo.toml: {}", e))
            })?;

            if content.contains("[workspace]") {
                return Ok(current_dir);
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Err(TestHelperError::ProjectRootNotFound(
        "Workspace root not found".to_string(),
    ))
}

static PROJECT_ROOT: Lazy<PathBuf> =
    Lazy::new(|| find_project_root().expect("Failed to find project root directory"));

/// `test_output/` under the workspace root, created on first use.
///
/// Files written here are kept between runs for manual inspection; use
/// `tempfile` for scratch files that should disappear.
pub fn get_output_dir() -> PathBuf {
    let output_dir = PROJECT_ROOT.join("test_output");

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
    }

    output_dir
}

/// Path of an artifact inside [`get_output_dir`].
pub fn output_path<P: AsRef<Path>>(path: P) -> PathBuf {
    get_output_dir().join(path)
}

/// Grey image dark (`low`) left of column `step_at` and bright (`high`) from it on.
pub fn step_edge(width: u32, height: u32, step_at: u32, low: u8, high: u8) -> GrayImage {
    GrayImage::from_fn(width, height, |x, _| {
        if x < step_at {
            Luma([low])
        } else {
            Luma([high])
        }
    })
}

/// Grey checkerboard with square cells of side `cell`.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> GrayImage {
    let cell = cell.max(1);
    GrayImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Float plane increasing by one per column.
pub fn horizontal_ramp(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(_, x)| x as f32)
}

/// Colour image split into four flat quadrants (red, green, blue, white).
pub fn colour_quadrants(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgb([220, 30, 30]),
            (false, true) => Rgb([30, 200, 40]),
            (true, false) => Rgb([40, 50, 210]),
            (false, false) => Rgb([240, 240, 240]),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_root_exists() {
        let root = find_project_root().expect("Failed to find project root");
        assert!(root.exists());
        assert!(root.join("Cargo.toml").exists());
    }

    #[test]
    fn test_output_dir_created() {
        let output = get_output_dir();
        assert!(output.exists());
        assert!(output.is_dir());
    }

    #[test]
    fn test_output_path() {
        let path = output_path("test.png");
        assert_eq!(path, get_output_dir().join("test.png"));
    }

    #[test]
    fn test_synthetic_images() {
        let step = step_edge(10, 2, 4, 5, 250);
        assert_eq!(step.get_pixel(3, 1)[0], 5);
        assert_eq!(step.get_pixel(4, 0)[0], 250);

        let board = checkerboard(4, 4, 2);
        assert_eq!(board.get_pixel(0, 0)[0], 0);
        assert_eq!(board.get_pixel(2, 0)[0], 255);
        assert_eq!(board.get_pixel(2, 2)[0], 0);

        assert_eq!(horizontal_ramp(2, 3)[[1, 2]], 2.0);

        let quads = colour_quadrants(4, 4);
        assert_eq!(*quads.get_pixel(3, 3), Rgb([240, 240, 240]));
    }
}
