//! Frame sources and sinks for the video programs.
//!
//! Three container formats are handled with the codecs of the `image` crate:
//! animated GIF, MJPEG (a plain concatenation of JPEG images) and image
//! sequences (a directory of numbered still frames). Sources hand out 8-bit
//! RGB frames one at a time; sinks accept frames of one fixed size.

pub mod gif;
pub mod mjpeg;
pub mod sequence;

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, info, warn};
use thiserror::Error;

use crate::ImageSize;

pub use self::gif::{GifSink, GifSource};
pub use self::mjpeg::{MjpegSink, MjpegSource};
pub use self::sequence::{SequenceSink, SequenceSource};

/// Frame rate assumed when a stream does not report a usable one.
pub const DEFAULT_FPS: f64 = 25.0;

/// Errors raised while reading or writing video streams.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Could not open or find the video \"{}\".", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Box<VideoError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] image::ImageError),

    #[error("Unsupported video format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Stream contains no frames")]
    NoFrames,

    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    FrameSize {
        expected: ImageSize,
        actual: ImageSize,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, VideoError>;

/// Container formats understood by [`open_source`] and [`open_sink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Gif,
    Mjpeg,
    ImageSequence,
}

impl VideoFormat {
    /// Guess the format from a path: `.gif`, `.mjpeg`/`.mjpg`, or a
    /// directory (existing, or a path without extension) for image sequences.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Some(VideoFormat::ImageSequence);
        }
        match path.extension() {
            None => Some(VideoFormat::ImageSequence),
            Some(ext) => match ext.to_string_lossy().to_ascii_lowercase().as_str() {
                "gif" => Some(VideoFormat::Gif),
                "mjpeg" | "mjpg" => Some(VideoFormat::Mjpeg),
                _ => None,
            },
        }
    }
}

/// A stream of decoded frames.
pub trait VideoSource {
    /// Frames per second, always positive.
    fn fps(&self) -> f64;

    /// Size shared by every frame of the stream.
    fn frame_size(&self) -> ImageSize;

    /// Number of frames when the container records it.
    fn frame_count(&self) -> Option<usize>;

    /// Next frame, or `None` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// A writer of fixed-size frames.
pub trait VideoSink {
    fn format(&self) -> VideoFormat;

    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush buffered output and close the stream.
    fn finish(&mut self) -> Result<()>;
}

/// Replace a missing or nonsensical frame rate with [`DEFAULT_FPS`].
pub fn sanitize_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        warn!("Frame rate {fps} is unusable, assuming {DEFAULT_FPS} fps");
        DEFAULT_FPS
    }
}

pub(crate) fn check_frame_size(expected: ImageSize, frame: &RgbImage) -> Result<()> {
    let actual = ImageSize::of_image(frame);
    if actual != expected {
        return Err(VideoError::FrameSize { expected, actual });
    }
    Ok(())
}

fn open_format(path: &Path, fallback_fps: f64) -> Result<(VideoFormat, Box<dyn VideoSource>)> {
    let format = VideoFormat::from_path(path).ok_or_else(|| VideoError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let source: Box<dyn VideoSource> = match format {
        VideoFormat::Gif => Box::new(GifSource::open(path, fallback_fps)?),
        VideoFormat::Mjpeg => Box::new(MjpegSource::open(path, fallback_fps)?),
        VideoFormat::ImageSequence => Box::new(SequenceSource::open(path, fallback_fps)?),
    };
    Ok((format, source))
}

/// Open a video file or frame directory for reading.
///
/// `fallback_fps` is used by containers that do not record a frame rate.
/// Any failure is reported as [`VideoError::Open`] with the cause attached.
pub fn open_source(
    path: impl AsRef<Path>,
    fallback_fps: f64,
) -> Result<(VideoFormat, Box<dyn VideoSource>)> {
    let path = path.as_ref();
    let (format, source) = open_format(path, fallback_fps).map_err(|e| VideoError::Open {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    info!(
        "Opened {} as {:?}: {} at {:.2} fps",
        path.display(),
        format,
        source.frame_size(),
        source.fps()
    );
    Ok((format, source))
}

/// Create a sink of a specific format.
pub fn create_sink(
    format: VideoFormat,
    path: impl AsRef<Path>,
    fps: f64,
    size: ImageSize,
) -> Result<Box<dyn VideoSink>> {
    let path = path.as_ref();
    if size.is_empty() {
        return Err(VideoError::InvalidParameters(format!(
            "cannot write {size} frames"
        )));
    }
    let fps = sanitize_fps(fps);
    Ok(match format {
        VideoFormat::Gif => Box::new(GifSink::create(path, fps, size)?),
        VideoFormat::Mjpeg => Box::new(MjpegSink::create(path, size)?),
        VideoFormat::ImageSequence => Box::new(SequenceSink::create(path, size)?),
    })
}

/// Open an output stream, trying in turn the format implied by the output
/// path, the `preferred` format (normally the input's), then MJPEG.
///
/// Returns `None` with a warning when no writer can be created; callers
/// carry on without saving.
pub fn open_sink(
    path: impl AsRef<Path>,
    preferred: VideoFormat,
    fps: f64,
    size: ImageSize,
) -> Option<Box<dyn VideoSink>> {
    let path = path.as_ref();
    let mut candidates = Vec::with_capacity(3);
    for format in [VideoFormat::from_path(path), Some(preferred), Some(VideoFormat::Mjpeg)]
        .into_iter()
        .flatten()
    {
        if !candidates.contains(&format) {
            candidates.push(format);
        }
    }

    for format in candidates {
        match create_sink(format, path, fps, size) {
            Ok(sink) => {
                info!("Writing {:?} output to {}", format, path.display());
                return Some(sink);
            }
            Err(e) => debug!("Could not create {:?} writer for {}: {}", format, path.display(), e),
        }
    }

    warn!("Cannot create output video.");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;
    use std::error::Error as _;
    use tempfile::TempDir;

    fn frame(size: ImageSize, shade: u8) -> RgbImage {
        let (w, h) = size.as_u32();
        RgbImage::from_fn(w, h, |x, y| Rgb([shade, (x * 10) as u8, (y * 10) as u8]))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(VideoFormat::from_path("clip.GIF"), Some(VideoFormat::Gif));
        assert_eq!(VideoFormat::from_path("clip.mjpg"), Some(VideoFormat::Mjpeg));
        assert_eq!(VideoFormat::from_path("clip.mjpeg"), Some(VideoFormat::Mjpeg));
        assert_eq!(VideoFormat::from_path("frames"), Some(VideoFormat::ImageSequence));
        assert_eq!(VideoFormat::from_path("clip.avi"), None);

        let dir = TempDir::new().unwrap();
        let with_dot = dir.path().join("frames.d");
        std::fs::create_dir(&with_dot).unwrap();
        assert_eq!(VideoFormat::from_path(&with_dot), Some(VideoFormat::ImageSequence));
    }

    #[test]
    fn test_sanitize_fps() {
        assert_eq!(sanitize_fps(30.0), 30.0);
        assert_eq!(sanitize_fps(0.0), DEFAULT_FPS);
        assert_eq!(sanitize_fps(f64::NAN), DEFAULT_FPS);
    }

    #[test]
    fn test_open_missing_source() {
        let err = open_source("/nonexistent/SAMPLING.mjpeg", 25.0).err().unwrap();
        assert_eq!(
            err.to_string(),
            "Could not open or find the video \"/nonexistent/SAMPLING.mjpeg\"."
        );
    }

    #[test]
    fn test_error_chain_has_no_repeated_cause() {
        let err = open_source("/nonexistent/SAMPLING.mjpeg", 25.0).err().unwrap();
        let mut messages = vec![err.to_string()];
        let mut cause = err.source();
        while let Some(e) = cause {
            messages.push(e.to_string());
            cause = e.source();
        }
        // Open, then the io error; the transparent Io variant adds no layer
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(!messages[0].contains(&messages[1]), "{messages:?}");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_preferred() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.avi");
        let size = ImageSize::from_width_height(8, 6);
        let mut sink = open_sink(&path, VideoFormat::Gif, 10.0, size).unwrap();
        assert_eq!(sink.format(), VideoFormat::Gif);
        sink.write_frame(&frame(size, 1)).unwrap();
        sink.finish().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_sink_returns_none() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A regular file cannot be a parent directory
        let path = blocker.join("out.mjpeg");
        let size = ImageSize::from_width_height(4, 4);
        assert!(open_sink(&path, VideoFormat::Mjpeg, 25.0, size).is_none());
    }

    #[test]
    fn test_sink_rejects_wrong_frame_size() {
        let dir = TempDir::new().unwrap();
        let size = ImageSize::from_width_height(8, 6);
        let mut sink = create_sink(VideoFormat::Mjpeg, dir.path().join("o.mjpeg"), 25.0, size).unwrap();
        let err = sink
            .write_frame(&frame(ImageSize::from_width_height(6, 8), 0))
            .unwrap_err();
        assert!(matches!(err, VideoError::FrameSize { .. }));
    }

    #[test]
    fn test_round_trip_every_format() {
        let dir = TempDir::new().unwrap();
        let size = ImageSize::from_width_height(16, 12);
        for (name, format) in [
            ("clip.gif", VideoFormat::Gif),
            ("clip.mjpeg", VideoFormat::Mjpeg),
            ("clip_frames", VideoFormat::ImageSequence),
        ] {
            let path = dir.path().join(name);
            let mut sink = create_sink(format, &path, 20.0, size).unwrap();
            for shade in [0u8, 120, 240] {
                sink.write_frame(&frame(size, shade)).unwrap();
            }
            sink.finish().unwrap();

            let (opened, mut source) = open_source(&path, 20.0).unwrap();
            assert_eq!(opened, format);
            assert_eq!(source.frame_size(), size, "{name}");
            assert_relative_eq!(source.fps(), 20.0, epsilon = 1e-9);
            let expected_count = match format {
                VideoFormat::Gif => None,
                _ => Some(3),
            };
            assert_eq!(source.frame_count(), expected_count, "{name}");
            let mut count = 0;
            while let Some(f) = source.next_frame().unwrap() {
                assert_eq!(ImageSize::of_image(&f), size);
                count += 1;
            }
            assert_eq!(count, 3, "{name}");
        }
    }
}
