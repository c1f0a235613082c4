//! Image helpers for post attachments.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageResizeError {
    #[error("unrecognised image format")]
    UnknownFormat,
    #[error("image processing error: {0}")]
    Processing(#[from] image::ImageError),
}

/// Shrink an encoded image so it fits within `max_width` x `max_height`.
///
/// Aspect ratio is preserved and smaller images are never upscaled. The result
/// is re-encoded in the source format when the encoder supports it, PNG otherwise.
pub fn resize_to_fit(
    bytes: &[u8],
    max_width: u32,
    max_height: u32,
) -> Result<Vec<u8>, ImageResizeError> {
    let format = image::guess_format(bytes).map_err(|_| ImageResizeError::UnknownFormat)?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    let resized = fit_within(&img, max_width, max_height);

    let output_format = match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif => format,
        _ => ImageFormat::Png,
    };

    let resized = match output_format {
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
        _ => resized,
    };

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, output_format)?;
    Ok(out.into_inner())
}

fn fit_within(img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_width && height <= max_height {
        return img.clone();
    }

    // `resize` keeps the aspect ratio and picks the largest size inside the bounds.
    img.resize(max_width, max_height, FilterType::Lanczos3)
}
