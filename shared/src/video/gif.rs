//! Animated GIF backend.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, DynamicImage, Frame, Frames, RgbImage};
use log::debug;

use super::{check_frame_size, sanitize_fps, Result, VideoError, VideoFormat, VideoSink, VideoSource};
use crate::ImageSize;

/// GIF animation decoded one frame at a time.
///
/// Only the first frame is decoded up front, for the frame size and delay.
/// The decoder composites each frame onto the full logical screen. The
/// number of frames is not known without decoding them all, so
/// `frame_count` is `None`.
pub struct GifSource {
    frames: Frames<'static>,
    first: Option<RgbImage>,
    size: ImageSize,
    fps: f64,
}

fn to_rgb(frame: Frame) -> RgbImage {
    DynamicImage::ImageRgba8(frame.into_buffer()).into_rgb8()
}

impl GifSource {
    pub fn open(path: &Path, fallback_fps: f64) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut frames = GifDecoder::new(reader)?.into_frames();
        let first = frames.next().ok_or(VideoError::NoFrames)??;

        let size = ImageSize::of_image(first.buffer());
        let (numer, denom) = first.delay().numer_denom_ms();
        let fps = if numer == 0 {
            debug!("GIF frame delay is zero, using {fallback_fps} fps");
            sanitize_fps(fallback_fps)
        } else {
            sanitize_fps(1000.0 * denom as f64 / numer as f64)
        };

        Ok(Self {
            frames,
            first: Some(to_rgb(first)),
            size,
            fps,
        })
    }
}

impl VideoSource for GifSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> ImageSize {
        self.size
    }

    fn frame_count(&self) -> Option<usize> {
        None
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if let Some(first) = self.first.take() {
            return Ok(Some(first));
        }
        let Some(frame) = self.frames.next() else {
            return Ok(None);
        };
        let frame = to_rgb(frame?);
        check_frame_size(self.size, &frame)?;
        Ok(Some(frame))
    }
}

/// Looping GIF writer.
pub struct GifSink {
    encoder: Option<GifEncoder<BufWriter<File>>>,
    delay: Delay,
    size: ImageSize,
}

impl GifSink {
    pub fn create(path: &Path, fps: f64, size: ImageSize) -> Result<Self> {
        let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            encoder: Some(encoder),
            delay: Delay::from_saturating_duration(Duration::from_secs_f64(1.0 / fps)),
            size,
        })
    }
}

impl VideoSink for GifSink {
    fn format(&self) -> VideoFormat {
        VideoFormat::Gif
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        check_frame_size(self.size, frame)?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| VideoError::InvalidParameters("GIF writer already finished".to_string()))?;
        let rgba = DynamicImage::ImageRgb8(frame.clone()).into_rgba8();
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, self.delay))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // Dropping the encoder writes the trailer
        self.encoder.take();
        Ok(())
    }
}
