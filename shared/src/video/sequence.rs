//! Image sequence backend: one still image per frame in a directory.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use log::debug;

use super::{check_frame_size, sanitize_fps, Result, VideoError, VideoFormat, VideoSink, VideoSource};
use crate::ImageSize;

/// Frames read in file name order from a directory.
///
/// Files whose extension is not a known image format are ignored.
pub struct SequenceSource {
    files: Vec<PathBuf>,
    next: usize,
    size: ImageSize,
    fps: f64,
}

impl SequenceSource {
    pub fn open(directory: &Path, fps: f64) -> Result<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                files.push(path);
            }
        }
        files.sort();
        debug!("Found {} frames in {}", files.len(), directory.display());

        let first = files.first().ok_or(VideoError::NoFrames)?;
        let size = ImageSize::of_image(&image::open(first)?.into_rgb8());
        Ok(Self {
            files,
            next: 0,
            size,
            fps: sanitize_fps(fps),
        })
    }
}

impl VideoSource for SequenceSource {
    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> ImageSize {
        self.size
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.files.len())
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let frame = image::open(path)?.into_rgb8();
        check_frame_size(self.size, &frame)?;
        Ok(Some(frame))
    }
}

/// Writes `frame_000000.png`, `frame_000001.png`, ... into a directory,
/// creating it if needed.
pub struct SequenceSink {
    directory: PathBuf,
    written: usize,
    size: ImageSize,
}

impl SequenceSink {
    pub fn create(directory: &Path, size: ImageSize) -> Result<Self> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            written: 0,
            size,
        })
    }

    fn frame_path(&self, index: usize) -> PathBuf {
        self.directory.join(format!("frame_{index:06}.png"))
    }
}

impl VideoSink for SequenceSink {
    fn format(&self) -> VideoFormat {
        VideoFormat::ImageSequence
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        check_frame_size(self.size, frame)?;
        frame.save(self.frame_path(self.written))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        debug!("Wrote {} frames to {}", self.written, self.directory.display());
        Ok(())
    }
}
