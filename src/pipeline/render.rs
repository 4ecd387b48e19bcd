//! PDF rasterisation: render every page to a JPEG sequence via pdfium.
//!
//! The scale factor is derived from the configured DPI against PDF's
//! native 72 points-per-inch, with a pixel cap on either dimension so a
//! poster-sized page cannot exhaust memory regardless of its physical
//! size. Pages land in the caller's scratch directory named by zero-padded
//! 1-based index, which is also the order the archive stage preserves.

use crate::config::ConvertConfig;
use crate::error::Error;
use crate::pipeline::encode;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bind to the system pdfium library.
///
/// Binding failures surface as a typed error with a remediation hint
/// rather than a panic; the converter cannot do anything without pdfium.
fn bind_pdfium() -> Result<Pdfium, Error> {
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| Error::PdfiumBindingFailed(format!("{e:?}")))
}

/// Rasterise every page of `pdf_path` into JPEG files under `scratch_dir`.
///
/// Returns the ordered image paths. An empty vector means the document
/// opened but had no pages; the caller decides whether that is an error.
pub fn rasterize_to_jpegs(
    pdf_path: &Path,
    scratch_dir: &Path,
    config: &ConvertConfig,
) -> Result<Vec<PathBuf>, Error> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Error::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages at {} DPI", total, config.dpi);

    if let Some(ref progress) = config.progress {
        progress.on_document_start(pdf_path, total);
    }

    let digits = total.to_string().len();
    // The config field is public; saturate rather than wrap negative if a
    // caller bypassed the builder's clamp.
    let pixel_cap = i32::try_from(config.max_rendered_pixels).unwrap_or(i32::MAX);
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(config.dpi as f32 / 72.0)
        .set_maximum_width(pixel_cap)
        .set_maximum_height(pixel_cap);

    let mut images = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| Error::RenderFailed {
                page: page_num,
                detail: format!("{e:?}"),
            })?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        let path = scratch_dir.join(encode::page_file_name(page_num, digits));
        encode::write_jpeg(&image, &path, config.jpeg_quality, page_num)?;
        images.push(path);

        if let Some(ref progress) = config.progress {
            progress.on_page_done(page_num, total);
        }
    }

    Ok(images)
}
