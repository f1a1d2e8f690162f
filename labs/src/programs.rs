//! Bodies of the lab programs.
//!
//! Each function performs one program's work against any [`Viewer`]. Errors
//! carry the user-facing messages; the binaries print them and still exit 0.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use log::info;
use shared::image_proc::{
    gaussian_blur, grey_to_plane, log_scale as log_scale_plane, mean_filter as mean_filter_rgb,
    min_max, normalize_min_max, plane_to_display, plane_to_grey, resize_rgb, rgb_to_grey,
    scharr_magnitude, threshold, CartoonCanvas, CartoonParams, ImageProcError, Interpolation,
    ThresholdKind,
};
use shared::io::{load_color_image, save_image};
use shared::video::{open_sink, open_source, DEFAULT_FPS};

use crate::config::EdgeParams;
use crate::display::{wait_for_quit, Viewer};
use crate::edge_explorer::EdgeExplorer;

pub const ORIGINAL_WINDOW: &str = "Original data";
pub const FILTERED_WINDOW: &str = "Filtered data";
pub const EDGE_DATA_WINDOW: &str = "Edge data";
pub const EDGE_WINDOW: &str = "Edge detection";
pub const VIDEO_WINDOW: &str = "Video";

/// Window title for an image file: `Display "<path>"`.
pub fn window_title(path: &Path) -> String {
    format!("Display \"{}\"", path.display())
}

/// Show a colour image until a key is pressed.
pub fn display_image(viewer: &mut dyn Viewer, input: &Path) -> Result<()> {
    let image = load_color_image(input)?;
    viewer.show(&window_title(input), &image)?;
    viewer.wait_key(None)?;
    Ok(())
}

/// Convert to grey, show both versions and write the grey one.
pub fn rgb2grey(viewer: &mut dyn Viewer, input: &Path, output: &Path) -> Result<()> {
    let image = load_color_image(input)?;
    let grey = rgb_to_grey(&image);
    viewer.show(&window_title(input), &image)?;
    viewer.show_grey(&window_title(output), &grey)?;
    save_image(output, &grey)?;
    viewer.wait_key(None)?;
    Ok(())
}

/// Log-scale the grey levels to bring out dark detail.
pub fn log_scale(viewer: &mut dyn Viewer, input: &Path, output: &Path) -> Result<()> {
    let image = load_color_image(input)?;
    let grey = rgb_to_grey(&image);
    let scaled = plane_to_grey(&log_scale_plane(&grey_to_plane(&grey).view()));
    viewer.show_grey(&window_title(input), &scaled)?;
    viewer.show_grey(&window_title(output), &grey)?;
    save_image(output, &scaled)?;
    viewer.wait_key(None)?;
    Ok(())
}

/// Box-filter a colour image with a `2 * radius + 1` square window.
pub fn mean_filter(viewer: &mut dyn Viewer, input: &Path, output: &Path, radius: u32) -> Result<()> {
    let image = load_color_image(input)?;
    let filtered = mean_filter_rgb(&image, radius)?;
    viewer.show(&window_title(output), &filtered)?;
    save_image(output, &filtered)?;
    viewer.wait_key(None)?;
    Ok(())
}

/// Edges as the Scharr gradient magnitude thresholded at half its range.
///
/// The edge map is written after the quit key.
pub fn edge_detection1(viewer: &mut dyn Viewer, input: &Path, output: &Path) -> Result<()> {
    let image = load_color_image(input)?;
    let grey = normalize_min_max(&grey_to_plane(&rgb_to_grey(&image)).view(), 0.0, 1.0);
    viewer.show_grey(ORIGINAL_WINDOW, &plane_to_display(&grey))?;

    let gaussian = gaussian_blur(&grey.view(), 3, 0.5)?;
    let gradient = scharr_magnitude(&gaussian.view())?;
    viewer.show_grey(FILTERED_WINDOW, &plane_to_display(&gradient))?;

    let (min, max) = min_max(&gradient.view()).ok_or(ImageProcError::EmptyImage)?;
    let edges = threshold(&gradient.view(), (max - min) / 2.0, 255.0, ThresholdKind::Binary);
    viewer.show_grey(EDGE_DATA_WINDOW, &plane_to_display(&edges))?;

    wait_for_quit(viewer)?;
    save_image(output, &plane_to_grey(&normalize_min_max(&edges.view(), 0.0, 255.0)))?;
    Ok(())
}

/// Canny edges with thresholds adjusted from the keyboard.
///
/// Left/Right move the low slider and Down/Up the high one; the edge map at
/// the final positions is written after the quit key.
pub fn edge_detection3(
    viewer: &mut dyn Viewer,
    input: &Path,
    output: &Path,
    params: &EdgeParams,
) -> Result<()> {
    let image = load_color_image(input)?;
    let mut explorer = EdgeExplorer::new(&image, params)?;
    viewer.show_grey(EDGE_WINDOW, &explorer.display_image())?;

    loop {
        match viewer.wait_key(None)? {
            Some(key) if key.is_quit() => break,
            Some(key) => {
                if explorer.handle_key(key)? {
                    viewer.show_grey(EDGE_WINDOW, &explorer.display_image())?;
                }
            }
            None => {}
        }
    }

    save_image(output, &explorer.output_image())?;
    Ok(())
}

/// Options of the video cartoonisation program.
#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub input: PathBuf,
    pub scaling_factor: f64,
    pub output: Option<PathBuf>,
    /// Frame rate for containers that do not record one
    pub fallback_fps: f64,
    pub params: CartoonParams,
    /// Draw a progress bar on the terminal
    pub progress: bool,
}

impl VideoOptions {
    pub fn new(input: impl Into<PathBuf>, scaling_factor: f64) -> Self {
        Self {
            input: input.into(),
            scaling_factor,
            output: None,
            fallback_fps: DEFAULT_FPS,
            params: CartoonParams::default(),
            progress: false,
        }
    }
}

/// Delay between frames for a stream at `fps`, rounded to whole milliseconds.
pub fn frame_wait(fps: f64) -> Duration {
    Duration::from_millis((1000.0 / fps).round() as u64)
}

/// Play a video next to its cartoon, optionally writing the composite.
///
/// Stops at the end of the stream or on `q`/Escape. Returns the number of
/// frames processed.
pub fn video_from_file(viewer: &mut dyn Viewer, options: &VideoOptions) -> Result<usize> {
    options.params.validate()?;
    let (format, mut source) = open_source(&options.input, options.fallback_fps)?;

    let fps = source.fps();
    println!("Frames per second: {fps}");
    let wait = frame_wait(fps);

    let input_size = source.frame_size();
    let scaled_size = match input_size.scaled(options.scaling_factor) {
        Some(size) if !size.is_empty() => size,
        _ => bail!(
            "Scaling factor {} cannot be applied to {} frames",
            options.scaling_factor,
            input_size
        ),
    };

    let mut canvas = CartoonCanvas::new(scaled_size, &options.params)
        .with_context(|| format!("Scaling factor {} is too large", options.scaling_factor))?;
    let mut sink = options
        .output
        .as_ref()
        .and_then(|path| open_sink(path, format, fps, canvas.size()));

    let progress = match (options.progress, source.frame_count()) {
        (true, Some(count)) => ProgressBar::new(count as u64),
        _ => ProgressBar::hidden(),
    };

    let mut frames = 0usize;
    while let Some(frame) = source.next_frame()? {
        let frame = if scaled_size != input_size {
            resize_rgb(&frame, scaled_size, Interpolation::Linear)?
        } else {
            frame
        };

        let composite = canvas
            .render(&frame)
            .with_context(|| format!("Failed to cartoonise frame {frames}"))?;
        if let Some(sink) = sink.as_mut() {
            sink.write_frame(composite)?;
        }
        viewer.show(VIDEO_WINDOW, composite)?;
        frames += 1;
        progress.inc(1);

        if viewer.wait_key(Some(wait))?.is_some_and(|key| key.is_quit()) {
            info!("Stopped by user after {frames} frames");
            break;
        }
    }
    progress.finish();

    if let Some(mut sink) = sink {
        sink.finish()?;
    }
    info!(
        "Processed {} frames of {} (shown at {})",
        frames,
        options.input.display(),
        canvas.size()
    );
    Ok(frames)
}
