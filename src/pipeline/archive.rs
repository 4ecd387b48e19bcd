//! CBZ writing: bundle an ordered image sequence into one deflate zip.
//!
//! A CBZ is a conventional zip whose entries are page images; readers show
//! entries in name order, which the zero-padded page names guarantee.

use crate::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write `images` (in order) into the archive at `cbz_path`, returning the
/// archive size in bytes.
pub fn write_cbz(images: &[PathBuf], cbz_path: &Path) -> Result<u64, Error> {
    let file = File::create(cbz_path).map_err(|e| Error::io(cbz_path, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for image in images {
        let name = image
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::ArchiveWrite {
                path: cbz_path.to_path_buf(),
                detail: format!("unrepresentable entry name: {}", image.display()),
            })?;
        writer
            .start_file(name, options)
            .map_err(|e| Error::ArchiveWrite {
                path: cbz_path.to_path_buf(),
                detail: e.to_string(),
            })?;
        let mut src = File::open(image).map_err(|e| Error::io(image, e))?;
        io::copy(&mut src, &mut writer).map_err(|e| Error::io(cbz_path, e))?;
        debug!("Archived {}", name);
    }

    let file = writer.finish().map_err(|e| Error::ArchiveWrite {
        path: cbz_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok(bytes)
}
