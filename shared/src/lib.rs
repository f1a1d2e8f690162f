//! Shared components for the lab programs.
//!
//! - [`image_proc`]: the image operators (colour conversion, blurs, gradients,
//!   thresholds, Canny, bilateral filter, resizing, masks and composite canvases)
//! - [`io`]: loading and saving still images
//! - [`video`]: frame sources and sinks for animated GIF, MJPEG and image sequences
//! - [`image_size`]: width/height pairs used across all of the above

pub mod image_proc;
pub mod image_size;
pub mod io;
pub mod video;

pub use image_size::ImageSize;
