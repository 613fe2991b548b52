//! Image import/export.
//! Moves FrameBuffers in and out of PNG (and other `image`-supported) files.

use std::path::Path;

use smear_core::{FrameBuffer, SmearError, SmearResult};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> SmearResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        SmearError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut fb = FrameBuffer::new(width, height);
    fb.data = rgba.into_raw();

    Ok(fb)
}

/// Copy a FrameBuffer into an `image` RGBA buffer.
pub fn to_rgba_image(fb: &FrameBuffer) -> image::RgbaImage {
    image::RgbaImage::from_raw(fb.width, fb.height, fb.data.clone())
        .unwrap_or_else(|| image::RgbaImage::new(fb.width, fb.height))
}

/// Write a FrameBuffer to disk as a PNG, whatever the file extension.
pub fn save_png(fb: &FrameBuffer, path: &Path) -> SmearResult<()> {
    to_rgba_image(fb)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| {
            SmearError::asset(
                format!("failed to save PNG '{}': {}", path.display(), e),
                path,
            )
        })
}
