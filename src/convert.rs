//! PDF-to-CBZ conversion entry points.
//!
//! `convert_pdf` handles one document end to end: validate the input,
//! resolve the archive path and overwrite policy, render the page sequence
//! into a scratch directory, bundle it, and clean up. `convert_dir` is the
//! folder-mode driver: each PDF is converted independently and a failure
//! is counted, never escalated.

use crate::config::{ConvertConfig, OverwritePolicy};
use crate::error::Error;
use crate::pipeline::{archive, discover, render};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbzOutput {
    /// Path of the written archive.
    pub archive: PathBuf,
    /// Number of page images bundled.
    pub pages: usize,
    /// Archive size in bytes.
    pub archive_bytes: u64,
    /// Scratch directory retained because `keep_images` was set.
    pub kept_images: Option<PathBuf>,
}

/// Accumulated outcomes of a folder-mode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Convert one PDF into a CBZ named after it.
///
/// The archive lands in `config.output_dir` when set (created if needed),
/// otherwise next to the source PDF. An existing archive is resolved
/// through the overwrite policy; a refusal is reported as
/// [`Error::OutputExists`].
pub fn convert_pdf(pdf_path: &Path, config: &ConvertConfig) -> Result<CbzOutput, Error> {
    validate_input(pdf_path)?;

    let archive_path = archive_path(pdf_path, config)?;
    if archive_path.exists() && !may_overwrite(&archive_path, config) {
        return Err(Error::OutputExists { path: archive_path });
    }

    let scratch = tempfile::Builder::new()
        .prefix("pdf2cbz_")
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    // keep_images disarms cleanup up front: the rendered pages survive
    // whether or not the archive gets written.
    let (scratch_dir, _cleanup) = if config.keep_images {
        (scratch.keep(), None)
    } else {
        (scratch.path().to_path_buf(), Some(scratch))
    };

    let images = render::rasterize_to_jpegs(pdf_path, &scratch_dir, config)?;
    if images.is_empty() {
        return Err(Error::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    let pages = images.len();
    let archive_bytes = archive::write_cbz(&images, &archive_path)?;
    if let Some(ref progress) = config.progress {
        progress.on_archive_written(&archive_path, archive_bytes);
    }
    info!(
        "Wrote {} ({} pages, {} bytes)",
        archive_path.display(),
        pages,
        archive_bytes
    );

    Ok(CbzOutput {
        archive: archive_path,
        pages,
        archive_bytes,
        kept_images: config.keep_images.then(|| scratch_dir.clone()),
    })
}

/// Convert every PDF under `dir`, optionally recursively.
///
/// Finding no PDFs at all is a batch-level error; individual conversion
/// failures are counted and the batch continues.
pub fn convert_dir(
    dir: &Path,
    recursive: bool,
    config: &ConvertConfig,
) -> Result<ConvertReport, Error> {
    let pdfs = discover::discover_pdfs(dir, recursive)?;
    if pdfs.is_empty() {
        return Err(Error::NoPdfsFound {
            dir: dir.to_path_buf(),
        });
    }

    info!("Converting {} PDFs under {}", pdfs.len(), dir.display());
    let mut report = ConvertReport::default();
    for pdf in &pdfs {
        match convert_pdf(pdf, config) {
            Ok(output) => {
                report.succeeded += 1;
                info!("{} → {}", pdf.display(), output.archive.display());
            }
            Err(e) => {
                report.failed += 1;
                warn!("{} failed: {}", pdf.display(), e);
            }
        }
    }
    Ok(report)
}

/// Validate that the input exists, carries a `.pdf` extension, and starts
/// with the PDF magic bytes, so pdfium gets a meaningful file and the
/// caller gets a meaningful error otherwise.
fn validate_input(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let has_pdf_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let mut magic = [0u8; 4];
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let read_ok = file.read_exact(&mut magic).is_ok();

    if !has_pdf_ext || !read_ok || &magic != b"%PDF" {
        return Err(Error::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Archive destination: configured output dir (created if needed) or the
/// PDF's own directory, with the extension swapped for `.cbz`.
fn archive_path(pdf_path: &Path, config: &ConvertConfig) -> Result<PathBuf, Error> {
    let stem = pdf_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::NotAPdf {
            path: pdf_path.to_path_buf(),
            magic: [0; 4],
        })?;

    let dir = match config.output_dir {
        Some(ref out) => {
            fs::create_dir_all(out).map_err(|e| Error::io(out, e))?;
            out.clone()
        }
        None => pdf_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
    };
    Ok(dir.join(format!("{stem}.cbz")))
}

/// Resolve the overwrite policy for an existing archive. `Ask` with no
/// prompt configured behaves as `Never` so headless callers cannot hang.
fn may_overwrite(archive: &Path, config: &ConvertConfig) -> bool {
    match config.overwrite {
        OverwritePolicy::Always => true,
        OverwritePolicy::Never => false,
        OverwritePolicy::Ask => config
            .prompt
            .as_ref()
            .map(|p| p.confirm(&format!("Overwrite existing archive {}?", archive.display())))
            .unwrap_or(false),
    }
}
