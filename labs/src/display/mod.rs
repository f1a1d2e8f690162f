//! Windows and keyboard input.
//!
//! Programs talk to a [`Viewer`], which either opens native windows (cargo
//! feature `sdl2`) or runs headless, logging what would have been shown. The
//! headless viewer answers an untimed key wait with Escape so every program
//! runs to completion without a display.

mod headless;
#[cfg(feature = "sdl2")]
mod sdl;

use std::time::Duration;

use image::{GrayImage, RgbImage};
use shared::image_proc::grey_to_rgb;
use thiserror::Error;

pub use headless::HeadlessViewer;
#[cfg(feature = "sdl2")]
pub use sdl::SdlViewer;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("{context}: {message}")]
    Backend { context: String, message: String },
}

pub type Result<T> = std::result::Result<T, DisplayError>;

/// A key press, reduced to what the programs react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Up,
    Down,
    Left,
    Right,
    Other,
}

impl Key {
    /// `q` or Escape.
    pub fn is_quit(self) -> bool {
        matches!(self, Key::Char('q') | Key::Escape)
    }
}

/// Somewhere to show images and read keys from.
pub trait Viewer {
    /// Show `image` in the window called `title`, creating it if needed.
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<()>;

    fn show_grey(&mut self, title: &str, image: &GrayImage) -> Result<()> {
        self.show(title, &grey_to_rgb(image))
    }

    /// Wait for a key press. `None` waits forever; a timed wait returns
    /// `Ok(None)` when nothing was pressed in time.
    fn wait_key(&mut self, timeout: Option<Duration>) -> Result<Option<Key>>;
}

/// Native windows unless `headless` is set or SDL2 support is compiled out.
#[cfg(feature = "sdl2")]
pub fn open_viewer(headless: bool) -> Result<Box<dyn Viewer>> {
    if headless {
        return Ok(Box::new(HeadlessViewer::new()));
    }
    Ok(Box::new(SdlViewer::new()?))
}

/// Native windows unless `headless` is set or SDL2 support is compiled out.
#[cfg(not(feature = "sdl2"))]
pub fn open_viewer(headless: bool) -> Result<Box<dyn Viewer>> {
    if !headless {
        log::warn!("Built without the sdl2 feature, running headless");
    }
    Ok(Box::new(HeadlessViewer::new()))
}

/// Block until `q` or Escape is pressed.
pub fn wait_for_quit(viewer: &mut dyn Viewer) -> Result<()> {
    loop {
        if let Some(key) = viewer.wait_key(None)? {
            if key.is_quit() {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        assert!(Key::Char('q').is_quit());
        assert!(Key::Escape.is_quit());
        assert!(!Key::Char('x').is_quit());
        assert!(!Key::Up.is_quit());
    }

    #[test]
    fn test_wait_for_quit_skips_other_keys() {
        let mut viewer = HeadlessViewer::with_keys([Key::Left, Key::Char('a'), Key::Char('q'), Key::Up]);
        wait_for_quit(&mut viewer).unwrap();
        // The key after the quit key is still queued
        assert_eq!(viewer.wait_key(None).unwrap(), Some(Key::Up));
    }

    #[test]
    fn test_open_headless() {
        let mut viewer = open_viewer(true).unwrap();
        viewer.show_grey("grey", &GrayImage::new(2, 2)).unwrap();
        assert_eq!(viewer.wait_key(None).unwrap(), Some(Key::Escape));
    }
}
