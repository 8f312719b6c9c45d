//! Book image storage and thumbnails.
//!
//! Images live under the media root, served at `/media`. Every stored image
//! gets a JPEG thumbnail that fits inside [`THUMBNAIL_SIZE`] square, kept
//! next to it in [`THUMBNAIL_DIR`].

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Media root served at `/media`, relative to the workspace.
pub const DEFAULT_MEDIA_ROOT: &str = "crates/storefront/media";

/// Thumbnails fit inside a square of this many pixels.
pub const THUMBNAIL_SIZE: u32 = 300;

/// Media subdirectory for full-size images.
pub const IMAGE_DIR: &str = "book-images";

/// Media subdirectory for thumbnails.
pub const THUMBNAIL_DIR: &str = "book-thumbnails";

/// Errors from storing a book image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid image file name: {0:?}")]
    FileName(String),

    #[error("could not write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Media-relative paths of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub image: String,
    pub thumbnail: String,
}

/// Scale an image down to fit [`THUMBNAIL_SIZE`] and encode it as JPEG.
///
/// The aspect ratio is kept and small images are never enlarged. Alpha is
/// dropped, since JPEG has none.
///
/// # Errors
///
/// Returns `ImageError::Image` if `bytes` is not a PNG or JPEG image.
pub fn make_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let source = image::load_from_memory(bytes)?;
    let fitted = if source.width() <= THUMBNAIL_SIZE && source.height() <= THUMBNAIL_SIZE {
        source
    } else {
        source.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
    };

    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(fitted.to_rgb8()).write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}

/// Where an upload called `file_name` is stored. Directories in the name
/// are dropped.
///
/// # Errors
///
/// Returns `ImageError::FileName` for an empty or hidden name.
pub fn media_paths(file_name: &str) -> Result<StoredImage, ImageError> {
    let invalid = || ImageError::FileName(file_name.to_string());
    let path = Path::new(file_name);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.starts_with('.'))
        .ok_or_else(invalid)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(invalid)?;

    Ok(StoredImage {
        image: format!("{IMAGE_DIR}/{name}"),
        thumbnail: format!("{THUMBNAIL_DIR}/{stem}.jpg"),
    })
}

/// Write an image and its thumbnail under `media_root`.
///
/// The thumbnail is generated first, so an unreadable image leaves no file
/// behind.
///
/// # Errors
///
/// Returns an error if the name or image is invalid, or a file cannot be
/// written.
pub async fn store(
    media_root: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<StoredImage, ImageError> {
    let paths = media_paths(file_name)?;
    let thumbnail = make_thumbnail(bytes)?;

    write(&media_root.join(&paths.image), bytes).await?;
    write(&media_root.join(&paths.thumbnail), &thumbnail).await?;

    tracing::info!(image = %paths.image, thumbnail = %paths.thumbnail, "Generated thumbnail");
    Ok(paths)
}

async fn write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await
}
