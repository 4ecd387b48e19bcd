//! PDF discovery for folder-mode conversion.

use crate::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Find every `.pdf` file under `dir`, optionally descending into
/// subdirectories. The result is sorted by path so batch runs are
/// deterministic regardless of directory-entry order.
pub fn discover_pdfs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut found = Vec::new();
    collect(dir, recursive, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect(dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> Result<(), Error> {
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                collect(&path, recursive, out)?;
            }
        } else if is_pdf(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn finds_only_pdfs_in_flat_mode() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.PDF"));
        touch(&dir.path().join("notes.txt"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("nested.pdf"));

        let found = discover_pdfs(dir.path(), false).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn recursive_mode_descends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("x/y")).unwrap();
        touch(&dir.path().join("top.pdf"));
        touch(&dir.path().join("x/y/deep.pdf"));

        let found = discover_pdfs(dir.path(), true).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn missing_directory_errors() {
        let err = discover_pdfs(Path::new("/no/such/dir"), false).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
