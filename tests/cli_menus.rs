//! Menu-level tests for the pdf2cbz binary, driven over stdin.
//!
//! Both scenarios stop before any rendering happens (a declined batch, a
//! declined overwrite), so they run without a pdfium library.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn folder_conversion_asks_before_starting() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.pdf"), b"%PDF-1.4 x").unwrap();
    std::fs::write(dir.path().join("b.pdf"), b"%PDF-1.4 x").unwrap();

    // Choice 2, folder path, decline the batch, exit.
    let input = format!("2\n{}\nn\n5\n", dir.path().display());
    Command::cargo_bin("pdf2cbz")
        .unwrap()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 PDFs"))
        .stdout(predicate::str::contains("Cancelled"));

    assert!(!dir.path().join("a.cbz").exists());
    assert!(!dir.path().join("b.cbz").exists());
}

#[test]
fn single_file_conversion_honours_the_output_folder_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("cap.pdf");
    std::fs::write(&pdf, b"%PDF-1.4 x").unwrap();
    // An archive already sits in the chosen output folder; declining the
    // overwrite prompt proves the prompt's folder was the one resolved.
    std::fs::write(out.path().join("cap.cbz"), b"old").unwrap();

    // Choice 1, PDF path, output folder, decline the overwrite, exit.
    let input = format!("1\n{}\n{}\nn\n5\n", pdf.display(), out.path().display());
    Command::cargo_bin("pdf2cbz")
        .unwrap()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive already exists"))
        .stdout(predicate::str::contains(out.path().display().to_string()));

    assert_eq!(std::fs::read(out.path().join("cap.cbz")).unwrap(), b"old");
    assert!(!dir.path().join("cap.cbz").exists(), "default folder must stay untouched");
}
