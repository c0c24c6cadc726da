//! Conversions between `image` buffers and core frames.

use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage};
use thresh_racer_core::{FrameError, FrameView};

/// Errors produced while reading a frame from disk.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Read any supported image file as 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage, LoadError> {
    let path = path.as_ref();
    let reader = ImageReader::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let img = reader.decode().map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Borrow an `image::RgbImage` as a core frame.
pub fn rgb_view(img: &RgbImage) -> Result<FrameView<'_>, FrameError> {
    FrameView::new(img.width() as usize, img.height() as usize, 3, img.as_raw())
}

/// Copy the first three channels of a frame (typically the diff mask) into an
/// `RgbImage`.
pub fn to_rgb_image(frame: FrameView<'_>) -> RgbImage {
    let channels = frame.channels();
    let data: Vec<u8> = frame
        .data()
        .chunks_exact(channels)
        .flat_map(|px| px[..3].iter().copied())
        .collect();
    RgbImage::from_raw(frame.width() as u32, frame.height() as u32, data)
        .unwrap_or_else(|| RgbImage::new(frame.width() as u32, frame.height() as u32))
}
