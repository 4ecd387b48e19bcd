//! JPEG encoding of rendered pages.
//!
//! JPEG at quality 95 keeps page archives a fraction of the rendered pixel
//! size, which is what comic readers expect from a CBZ. pdfium hands back
//! RGBA bitmaps; JPEG cannot carry alpha, so pages are flattened to RGB
//! before encoding.

use crate::error::Error;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Entry name for a page: the 1-based index zero-padded to the digit width
/// of the total page count, e.g. `007.jpg` in a 120-page document.
pub fn page_file_name(index: usize, digits: usize) -> String {
    format!("{index:0digits$}.jpg")
}

/// Encode one rendered page as a JPEG file at the given quality.
pub fn write_jpeg(
    image: &DynamicImage,
    path: &Path,
    quality: u8,
    page: usize,
) -> Result<(), Error> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality);

    let flat = DynamicImage::ImageRgb8(image.to_rgb8());
    flat.write_with_encoder(encoder)
        .map_err(|e| Error::EncodeFailed {
            page,
            detail: e.to_string(),
        })?;

    debug!("Encoded page {} → {}", page, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn page_names_are_zero_padded_to_width() {
        assert_eq!(page_file_name(1, 1), "1.jpg");
        assert_eq!(page_file_name(7, 3), "007.jpg");
        assert_eq!(page_file_name(120, 3), "120.jpg");
    }

    #[test]
    fn writes_a_decodable_jpeg_from_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.jpg");
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 12, Rgba([10, 200, 30, 255])));

        write_jpeg(&img, &path, 95, 1).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker expected");
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 12));
    }
}
