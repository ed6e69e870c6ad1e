//! Raster encoding: `DynamicImage` → PNG bytes.
//!
//! PNG is chosen over JPEG because it is lossless — line art and text in
//! rendered pages stay crisp, and the reader's image decoder reproduces the
//! raster exactly. The raster buffer is dropped by the caller immediately
//! after encoding, so peak memory stays bounded to one page.

use crate::error::PageSourceError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page raster as PNG bytes.
pub fn encode_page(index: usize, img: &DynamicImage) -> Result<Vec<u8>, PageSourceError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|source| PageSourceError::EncodeFailed { index, source })?;

    debug!(
        "Encoded page {} ({}x{} px) → {} bytes PNG",
        index,
        img.width(),
        img.height(),
        buf.len()
    );

    Ok(buf)
}
