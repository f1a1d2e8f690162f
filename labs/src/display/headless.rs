use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use image::RgbImage;
use log::debug;

use super::{Key, Result, Viewer};

/// Viewer without windows.
///
/// Keys queued with [`HeadlessViewer::with_keys`] are returned first, one per
/// wait. Once they run out an untimed wait returns Escape and a timed wait
/// times out immediately.
#[derive(Debug, Default)]
pub struct HeadlessViewer {
    keys: VecDeque<Key>,
    latest: HashMap<String, RgbImage>,
    show_count: usize,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Number of `show` calls so far.
    pub fn show_count(&self) -> usize {
        self.show_count
    }

    /// The image most recently shown under `title`.
    pub fn last_shown(&self, title: &str) -> Option<&RgbImage> {
        self.latest.get(title)
    }
}

impl Viewer for HeadlessViewer {
    fn show(&mut self, title: &str, image: &RgbImage) -> Result<()> {
        debug!("[{}] {}x{}", title, image.width(), image.height());
        self.latest.insert(title.to_string(), image.clone());
        self.show_count += 1;
        Ok(())
    }

    fn wait_key(&mut self, timeout: Option<Duration>) -> Result<Option<Key>> {
        if let Some(key) = self.keys.pop_front() {
            return Ok(Some(key));
        }
        Ok(match timeout {
            None => Some(Key::Escape),
            Some(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_shown_images() {
        let mut viewer = HeadlessViewer::new();
        viewer.show("a", &RgbImage::new(2, 1)).unwrap();
        viewer.show("b", &RgbImage::new(3, 1)).unwrap();
        viewer.show("a", &RgbImage::new(4, 1)).unwrap();
        assert_eq!(viewer.show_count(), 3);
        assert_eq!(viewer.last_shown("a").unwrap().width(), 4);
        assert!(viewer.last_shown("c").is_none());
    }

    #[test]
    fn test_waits() {
        let mut viewer = HeadlessViewer::with_keys([Key::Down]);
        assert_eq!(viewer.wait_key(Some(Duration::from_millis(40))).unwrap(), Some(Key::Down));
        assert_eq!(viewer.wait_key(Some(Duration::from_millis(40))).unwrap(), None);
        assert_eq!(viewer.wait_key(None).unwrap(), Some(Key::Escape));
    }
}
