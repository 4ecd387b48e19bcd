//! End-to-end conversion tests against a real PDF via pdfium.
//!
//! These need a system pdfium library and a sample document, so they are
//! gated behind environment variables and skip cleanly otherwise.
//!
//! Run with:
//!   E2E_ENABLED=1 NOVELGRAB_TEST_PDF=/path/to/sample.pdf \
//!     cargo test --test convert_e2e -- --nocapture

use novelgrab::{convert_dir, convert_pdf, ConvertConfig, OverwritePolicy};
use std::fs::File;
use std::path::PathBuf;

/// Skip this test unless E2E_ENABLED is set and the sample PDF exists.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p = match std::env::var("NOVELGRAB_TEST_PDF") {
            Ok(p) => PathBuf::from(p),
            Err(_) => {
                println!("SKIP — set NOVELGRAB_TEST_PDF to a sample document");
                return;
            }
        };
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

#[test]
fn converts_a_document_to_a_readable_archive() {
    let pdf = e2e_skip_unless_ready!();
    let out = tempfile::tempdir().unwrap();
    let config = ConvertConfig::builder()
        .output_dir(out.path())
        .build()
        .unwrap();

    let output = convert_pdf(&pdf, &config).unwrap();
    assert!(output.pages > 0);
    assert!(output.archive_bytes > 0);
    assert_eq!(output.archive.extension().unwrap(), "cbz");

    // Entries are zero-padded to the digit width of the page count and
    // therefore already in page order under a lexicographic sort.
    let mut archive = zip::ZipArchive::new(File::open(&output.archive).unwrap()).unwrap();
    assert_eq!(archive.len(), output.pages);
    let width = output.pages.to_string().len();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "entry order must match name order");
    names.sort();
    assert_eq!(names[0], format!("{:0width$}.jpg", 1));
}

#[test]
fn keep_images_retains_the_page_sequence() {
    let pdf = e2e_skip_unless_ready!();
    let out = tempfile::tempdir().unwrap();
    let config = ConvertConfig::builder()
        .output_dir(out.path())
        .keep_images(true)
        .build()
        .unwrap();

    let output = convert_pdf(&pdf, &config).unwrap();
    let kept = output.kept_images.expect("scratch dir should be retained");
    let jpegs = std::fs::read_dir(&kept)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "jpg"))
        .count();
    assert_eq!(jpegs, output.pages);
    std::fs::remove_dir_all(kept).ok();
}

#[test]
fn folder_mode_counts_good_and_bad_inputs() {
    let pdf = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(&pdf, dir.path().join("good.pdf")).unwrap();
    // Right magic, unparseable body: fails at the pdfium stage.
    std::fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4 garbage").unwrap();

    let out = tempfile::tempdir().unwrap();
    let config = ConvertConfig::builder()
        .output_dir(out.path())
        .overwrite(OverwritePolicy::Always)
        .build()
        .unwrap();

    let report = convert_dir(dir.path(), false, &config).unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert!(out.path().join("good.cbz").exists());
    assert!(!out.path().join("broken.cbz").exists());
}
