//! Reading and writing still images.
//!
//! The file format is picked by the `image` crate from the file contents on
//! read and from the extension on write.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use image::{EncodableLayout, ImageBuffer, PixelWithColorType, RgbImage};
use log::debug;
use thiserror::Error;

/// Failures reading or writing image files.
#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("Could not open or find the image \"{}\".", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: Option<image::ImageError>,
    },

    #[error("Could not write the image \"{}\".", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, ImageIoError>;

/// Load any supported image as 8-bit RGB.
///
/// An image that decodes to zero pixels is reported like a missing file.
pub fn load_color_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|e| ImageIoError::Open {
        path: path.to_path_buf(),
        source: Some(e),
    })?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(ImageIoError::Open {
            path: path.to_path_buf(),
            source: None,
        });
    }
    debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    Ok(decoded.into_rgb8())
}

/// Write an 8-bit grey or colour image.
pub fn save_image<P, C>(path: impl AsRef<Path>, image: &ImageBuffer<P, C>) -> Result<()>
where
    P: PixelWithColorType,
    [P::Subpixel]: EncodableLayout,
    C: Deref<Target = [P::Subpixel]>,
{
    let path = path.as_ref();
    image.save(path).map_err(|e| ImageIoError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} ({}x{})", path.display(), image.width(), image.height());
    Ok(())
}
