//! Motion JPEG backend.
//!
//! An MJPEG file here is a bare concatenation of baseline JPEG images with no
//! container around them. Frame boundaries are found by walking the JPEG
//! marker structure rather than searching for the end-of-image bytes, since
//! embedded thumbnails carry markers of their own.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};

use super::{check_frame_size, sanitize_fps, Result, VideoError, VideoFormat, VideoSink, VideoSource};
use crate::ImageSize;

/// JPEG quality used for written frames.
pub const MJPEG_QUALITY: u8 = 90;

const MARKER: u8 = 0xFF;
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

/// Markers that stand alone without a length field.
fn is_standalone(marker: u8) -> bool {
    matches!(marker, 0x01 | 0xD0..=0xD7 | SOI | EOI)
}

/// End (exclusive) of the JPEG image starting with SOI at `start`.
fn jpeg_end(data: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 2;
    loop {
        // Skip fill bytes before the marker code
        while *data.get(pos)? == MARKER && *data.get(pos + 1)? == MARKER {
            pos += 1;
        }
        if *data.get(pos)? != MARKER {
            return None;
        }
        let marker = *data.get(pos + 1)?;
        pos += 2;
        if marker == EOI {
            return Some(pos);
        }
        if is_standalone(marker) {
            continue;
        }
        let length = u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]) as usize;
        pos += length;
        if marker == SOS {
            // Entropy-coded data runs until a marker other than a stuffed
            // zero or a restart marker.
            loop {
                if *data.get(pos)? == MARKER {
                    let next = *data.get(pos + 1)?;
                    if next == 0x00 || (0xD0..=0xD7).contains(&next) {
                        pos += 2;
                        continue;
                    }
                    break;
                }
                pos += 1;
            }
        }
    }
}

/// Byte ranges of the JPEG images in an MJPEG stream.
///
/// Bytes between images are skipped; a truncated final image is dropped.
pub fn split_frames(data: &[u8]) -> Vec<Range<usize>> {
    let mut frames = Vec::new();
    let mut pos = 0;
    while pos + 1 < data.len() {
        if data[pos] == MARKER && data[pos + 1] == SOI {
            match jpeg_end(data, pos) {
                Some(end) => {
                    frames.push(pos..end);
                    pos = end;
                }
                None => break,
            }
        } else {
            pos += 1;
        }
    }
    frames
}

pub struct MjpegSource {
    data: Vec<u8>,
    frames: Vec<Range<usize>>,
    next: usize,
    size: ImageSize,
    fps: f64,
}

impl MjpegSource {
    /// MJPEG carries no timing, so the stream plays at `fps`.
    pub fn open(path: &Path, fps: f64) -> Result<Self> {
        let data = std::fs::read(path)?;
        let frames = split_frames(&data);
        let first = frames.first().ok_or(VideoError::NoFrames)?;
        let size = ImageSize::of_image(&decode(&data[first.clone()])?);
        Ok(Self {
            data,
            frames,
            next: 0,
            size,
            fps: sanitize_fps(fps),
        })
    }
}

fn decode(jpeg: &[u8]) -> Result<RgbImage> {
    Ok(image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg)?.into_rgb8())
}

impl VideoSource for MjpegSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> ImageSize {
        self.size
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.frames.len())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(range) = self.frames.get(self.next).cloned() else {
            return Ok(None);
        };
        self.next += 1;
        let frame = decode(&self.data[range])?;
        check_frame_size(self.size, &frame)?;
        Ok(Some(frame))
    }
}

pub struct MjpegSink {
    writer: BufWriter<File>,
    size: ImageSize,
}

impl MjpegSink {
    pub fn create(path: &Path, size: ImageSize) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            size,
        })
    }
}

impl VideoSink for MjpegSink {
    fn format(&self) -> VideoFormat {
        VideoFormat::Mjpeg
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        check_frame_size(self.size, frame)?;
        let mut encoder = JpegEncoder::new_with_quality(&mut self.writer, MJPEG_QUALITY);
        encoder.encode_image(frame)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
