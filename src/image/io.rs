//! I/O helpers for grayscale page rasters and JSON reports.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/TIFF page into an owned 8-bit gray buffer.
//! - `save_grayscale_u8`: write any 8-bit view (page crop, ink mask) to disk,
//!   format chosen from the file extension.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{GrayImageU8, ImageView};
use crate::error::{PageError, SegmentError};
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, PageError> {
    let img = image::open(path)
        .map_err(|e| PageError::Load {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    if width == 0 || height == 0 {
        return Err(PageError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Save an 8-bit grayscale view, creating parent directories.
pub fn save_grayscale_u8<V: ImageView>(image: &V, path: &Path) -> Result<(), PageError> {
    let save_err = |detail: String| PageError::Save {
        path: path.to_path_buf(),
        detail,
    };
    ensure_parent_dir(path).map_err(|e| save_err(e.to_string()))?;
    let mut data = Vec::with_capacity(image.width() * image.height());
    for row in image.rows() {
        data.extend_from_slice(row);
    }
    let out: GrayImage =
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(image.width() as u32, image.height() as u32, data)
            .ok_or_else(|| save_err("buffer does not match image dimensions".to_string()))?;
    out.save(path).map_err(|e| save_err(e.to_string()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), SegmentError> {
    ensure_parent_dir(path).map_err(|source| SegmentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json = serde_json::to_string_pretty(value).map_err(|e| SegmentError::Report {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    fs::write(path, json).map_err(|source| SegmentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
